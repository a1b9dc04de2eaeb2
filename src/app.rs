use std::net::SocketAddr;

use axum::{
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware,
    response::Response,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::pages::{handlers::panic_response, not_found};
use crate::state::{AppState, UPLOADS_PREFIX};
use crate::{activity, auth, pages};

pub fn build_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());
    // Anything no route claims is looked up in the public dir, then 404s.
    let public = ServeDir::new(&state.config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .merge(auth::router())
        .merge(activity::router())
        .merge(pages::router())
        .nest_service(UPLOADS_PREFIX, uploads)
        .fallback_service(public)
        .with_state(state)
        .layer(middleware::map_response(method_mismatch_as_not_found))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

/// A known path hit with the wrong method gets the same 404 page as an unknown path.
async fn method_mismatch_as_not_found(res: Response) -> Response {
    if res.status() == StatusCode::METHOD_NOT_ALLOWED {
        return not_found().await;
    }
    res
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
