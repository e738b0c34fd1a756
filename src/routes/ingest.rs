use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::state::SharedState;

/// Hand the raw form body to the relay without parsing it, then send the
/// client to the confirmation page. The redirect does not depend on whether
/// the relay accepted the datagram.
pub async fn submit(State(state): State<SharedState>, body: Bytes) -> Response {
    let capacity = state.config.relay.buffer_size;
    if body.len() > capacity {
        tracing::warn!(
            "Form body of {} bytes exceeds the {capacity} byte relay buffer and will be truncated",
            body.len()
        );
    }

    match state.relay.send(&body).await {
        Ok(sent) => tracing::debug!("Relayed {sent} bytes to {}", state.relay.destination()),
        Err(e) => tracing::warn!("Relay send to {} failed: {e}", state.relay.destination()),
    }

    (StatusCode::FOUND, [(header::LOCATION, "/message")]).into_response()
}
