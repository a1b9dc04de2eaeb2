use std::any::Any;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{error, instrument, warn};

use super::templates::{
    AboutTemplate, AccessDeniedTemplate, FactorRow, IndexTemplate, NewsTemplate,
    NotFoundTemplate, ServerErrorTemplate, Viewer,
};
use crate::{
    activity::calculator::Activity,
    auth::{claims::Role, extractors::Session},
    state::AppState,
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/access-denied", get(access_denied))
        .route("/news", get(news))
}

/// Renders with status 200, or the 500 page when the template fails.
pub fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "template render failed");
            server_error()
        }
    }
}

pub fn server_error() -> Response {
    let page = ServerErrorTemplate {
        title: "500 - Internal Server Error",
        viewer: None,
    };
    match page.render() {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
    }
}

pub async fn not_found() -> Response {
    let page = NotFoundTemplate {
        title: "404 - Page Not Found",
        viewer: None,
    };
    match page.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Panic hook for `CatchPanicLayer`: log and serve the 500 page.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    server_error()
}

#[instrument(skip_all)]
pub async fn index(session: Session) -> Response {
    if !session.is_authenticated() {
        return Redirect::to("/login").into_response();
    }
    render(IndexTemplate::new(Viewer::from_session(&session)))
}

#[instrument(skip_all)]
pub async fn about(session: Session) -> Response {
    render(AboutTemplate {
        title: "About - EcoTrack",
        viewer: Viewer::from_session(&session),
        factors: Activity::ALL
            .iter()
            .map(|a| FactorRow {
                label: a.label(),
                factor: a.factor(),
            })
            .collect(),
    })
}

#[instrument(skip_all)]
pub async fn access_denied(session: Session) -> Response {
    render(AccessDeniedTemplate {
        title: "403 - Forbidden",
        viewer: Viewer::from_session(&session),
    })
}

#[instrument(skip(state, session))]
pub async fn news(State(state): State<AppState>, session: Session) -> Response {
    match session.role() {
        None => return Redirect::to("/login").into_response(),
        Some(Role::Guest) => return Redirect::to("/access-denied").into_response(),
        Some(_) => {}
    }

    let articles = match state.news.carbon_headlines().await {
        Ok(articles) => articles,
        Err(e) => {
            warn!(error = %e, "news fetch failed; rendering empty list");
            Vec::new()
        }
    };

    render(NewsTemplate {
        title: "News - EcoTrack",
        viewer: Viewer::from_session(&session),
        articles,
    })
}
