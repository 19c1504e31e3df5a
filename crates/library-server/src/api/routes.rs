use super::handlers;
use crate::state::AppState;
use crate::ui;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{any, delete, get, post},
    Router,
};
use std::time::Instant;

/// Build the full application router: JSON API, HTML pages, static assets
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // JSON API
        .route("/api/health", get(handlers::health))
        .route("/api/search", get(handlers::search))
        .route("/api/manga/:id", get(handlers::manga_details))
        .route(
            "/api/library",
            get(handlers::get_library).post(handlers::save_manga),
        )
        .route("/api/library/:id", delete(handlers::delete_manga))
        .route("/api/*rest", any(handlers::not_found))
        // Pages
        .route("/", get(ui::handlers::home))
        .route("/liked", get(ui::handlers::liked))
        .route("/read", get(ui::handlers::read))
        .route("/search", get(ui::handlers::search))
        .route("/save", post(ui::handlers::save))
        .route("/remove/:id", post(ui::handlers::remove))
        .route("/static/style.css", get(ui::handlers::stylesheet))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Log method, path, status, and latency of every request
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(%method, path = %path, status = status.as_u16(), latency_ms, "Request failed");
    } else {
        tracing::info!(%method, path = %path, status = status.as_u16(), latency_ms, "Request handled");
    }

    response
}
