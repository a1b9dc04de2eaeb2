use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One logged activity, owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: OffsetDateTime,
    pub activity: String,
    pub amount: f64,
    pub carbon_emission: f64, // factor * amount at write time
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub user_id: Uuid,
    pub date: OffsetDateTime,
    pub activity: String,
    pub amount: f64,
    pub carbon_emission: f64,
}

/// Grouped sums over every user's entries for one activity label.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ActivityTotals {
    pub activity: String,
    pub total_amount: f64,
    pub total_carbon_emission: f64,
}
