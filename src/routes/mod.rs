pub mod ingest;

use std::path::Path;

use axum::handler::HandlerWithoutStateExt;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::state::SharedState;
use crate::views::pages;

/// Pages, static passthrough and form intake. Any path accepts a POST.
pub fn site_routes(static_dir: &Path) -> Router<SharedState> {
    let static_files = ServeDir::new(static_dir).not_found_service(pages::not_found.into_service());

    Router::new()
        .route("/health", get(health).post(ingest::submit))
        .route("/", get(pages::index).post(ingest::submit))
        .route("/message", get(pages::message).post(ingest::submit))
        .route(
            "/{*path}",
            post(ingest::submit).fallback_service(static_files),
        )
}

async fn health() -> &'static str {
    "ok"
}
