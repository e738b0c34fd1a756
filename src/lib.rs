pub mod config;
pub mod error;
pub mod journal;
pub mod models;
pub mod relay;
pub mod routes;
pub mod state;
pub mod submission;
pub mod views;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::journal::JournalStore;
use crate::relay::RelaySender;
use crate::state::{AppState, SharedState};

pub fn build_app(
    config: Config,
    journal: Arc<JournalStore>,
    relay: RelaySender,
) -> (Router, SharedState) {
    let static_dir = config.static_dir.clone();
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        config,
        journal,
        relay,
    });

    let app = routes::site_routes(&static_dir)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}
