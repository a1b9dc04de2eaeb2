use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use time::macros::format_description;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{LogRequest, LogResponse},
    services::{parse_amount, parse_log_date, record_activity, summarize},
};
use crate::{
    auth::{claims::Role, extractors::Session},
    error::{internal_json, json_error, JsonError},
    pages::{
        render, server_error,
        templates::{
            two_places, DashboardRow, DashboardTemplate, HistoryRow, HistoryTemplate, Viewer,
        },
    },
    state::AppState,
};

pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/log", post(log_activity))
        .route("/history", get(history))
        .route("/dashboard", get(dashboard))
}

#[instrument(skip(state, session, body))]
pub async fn log_activity(
    State(state): State<AppState>,
    session: Session,
    LogRequest(body): LogRequest,
) -> Result<Json<LogResponse>, JsonError> {
    let Some((date, activity, amount)) = body.required() else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "Missing required parameters: activity, amount, or date.",
        ));
    };

    let Some(role) = session.role() else {
        return Err(json_error(
            StatusCode::UNAUTHORIZED,
            "Unauthorized. Please log in to continue.",
        ));
    };

    let Some(amount) = parse_amount(&amount) else {
        return Err(json_error(StatusCode::BAD_REQUEST, "Amount must be a number."));
    };
    let Some(date) = parse_log_date(&date) else {
        return Err(json_error(StatusCode::BAD_REQUEST, "Invalid date."));
    };

    let outcome = record_activity(
        state.store.as_ref(),
        role,
        session.user_id(),
        date,
        &activity,
        amount,
    )
    .await
    .map_err(internal_json)?;

    let message = if outcome.persisted {
        info!(user_id = ?session.user_id(), %activity, amount, "activity logged");
        "Data logged successfully."
    } else {
        info!(role = role.as_str(), %activity, amount, "emission calculated without saving");
        "Carbon emission calculated only, data not saved."
    };

    Ok(Json(LogResponse {
        activity,
        amount,
        carbon_emission: outcome.carbon_emission,
        message,
    }))
}

#[instrument(skip(state, session))]
pub async fn history(State(state): State<AppState>, session: Session) -> Response {
    match session.role() {
        None => return Redirect::to("/login").into_response(),
        Some(Role::Guest) => return Redirect::to("/access-denied").into_response(),
        Some(_) => {}
    }

    // admin sessions carry no identity and therefore own no entries
    let entries = match session.user_id() {
        Some(user_id) => match state.store.entries_for_user(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, %user_id, "fetching history failed");
                return server_error();
            }
        },
        None => Vec::new(),
    };

    let date_format = format_description!("[year]-[month]-[day]");
    let rows = entries
        .into_iter()
        .map(|e| HistoryRow {
            date: e
                .date
                .format(date_format)
                .unwrap_or_else(|_| e.date.to_string()),
            activity: e.activity,
            amount: two_places(e.amount),
            carbon_emission: two_places(e.carbon_emission),
        })
        .collect();

    render(HistoryTemplate {
        title: "History - EcoTrack",
        viewer: Viewer::from_session(&session),
        rows,
    })
}

#[instrument(skip(state, session))]
pub async fn dashboard(State(state): State<AppState>, session: Session) -> Response {
    if !session.is_admin() {
        if session.is_authenticated() {
            warn!(role = ?session.role(), "non-admin tried the dashboard");
        }
        return Redirect::to("/admin").into_response();
    }

    let total_users = match state.store.count_users().await {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "counting users failed");
            return server_error();
        }
    };
    let totals = match state.store.summarize_by_activity().await {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "aggregating log entries failed");
            return server_error();
        }
    };

    let summary = summarize(&totals);
    render(DashboardTemplate {
        title: "Admin Dashboard - EcoTrack",
        viewer: Viewer::from_session(&session),
        total_users,
        rows: summary
            .activities
            .iter()
            .map(|a| DashboardRow {
                activity: a.activity.label(),
                total_amount: two_places(a.total_amount),
                total_carbon_emission: two_places(a.total_carbon_emission),
            })
            .collect(),
        total_carbon_emission: two_places(summary.total_carbon_emission),
    })
}
