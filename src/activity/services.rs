use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};
use uuid::Uuid;

use super::calculator::{calculate_carbon, Activity};
use super::repo_types::{ActivityTotals, NewLogEntry};
use crate::auth::claims::Role;
use crate::db::{Store, StoreError};

/// `YYYY-MM-DD` (midnight UTC, what `<input type="date">` sends) or RFC 3339.
pub fn parse_log_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date.midnight().assume_utc());
    }
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogOutcome {
    pub carbon_emission: f64,
    pub persisted: bool,
}

/// Computes the emission for every caller; only `user` sessions get a stored row.
pub async fn record_activity(
    store: &dyn Store,
    role: Role,
    user_id: Option<Uuid>,
    date: OffsetDateTime,
    activity: &str,
    amount: f64,
) -> Result<LogOutcome, StoreError> {
    let carbon_emission = calculate_carbon(activity, amount);

    let owner = match (role, user_id) {
        (Role::User, Some(id)) => id,
        _ => {
            return Ok(LogOutcome {
                carbon_emission,
                persisted: false,
            })
        }
    };

    store
        .insert_entry(NewLogEntry {
            user_id: owner,
            date,
            activity: activity.to_string(),
            amount,
            carbon_emission,
        })
        .await?;

    Ok(LogOutcome {
        carbon_emission,
        persisted: true,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub activity: Activity,
    pub total_amount: f64,
    pub total_carbon_emission: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub activities: Vec<ActivitySummary>,
    pub total_carbon_emission: f64,
}

/// Folds grouped sums into one row per known activity (zero when absent).
/// Labels outside the known set are left out of the table and the grand total.
pub fn summarize(totals: &[ActivityTotals]) -> DashboardSummary {
    let activities: Vec<ActivitySummary> = Activity::ALL
        .iter()
        .map(|&activity| {
            let row = totals.iter().find(|t| t.activity == activity.label());
            ActivitySummary {
                activity,
                total_amount: row.map_or(0.0, |r| r.total_amount),
                total_carbon_emission: row.map_or(0.0, |r| r.total_carbon_emission),
            }
        })
        .collect();
    let total_carbon_emission = activities.iter().map(|a| a.total_carbon_emission).sum();
    DashboardSummary {
        activities,
        total_carbon_emission,
    }
}
