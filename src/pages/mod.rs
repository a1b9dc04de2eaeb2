//! Server-rendered pages that are not tied to auth or activity logging.

pub mod handlers;
pub mod templates;

use crate::state::AppState;
use axum::Router;

pub use handlers::{not_found, render, server_error};

pub fn router() -> Router<AppState> {
    handlers::page_routes()
}
