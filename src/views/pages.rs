use askama::Template;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{Html, IntoResponse};

use crate::error::AppError;
use crate::models::Journal;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

#[derive(Template)]
#[template(path = "message.html")]
struct MessageTemplate {
    entries: Vec<EntryView>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate;

struct EntryView {
    timestamp: String,
    fields: Vec<FieldView>,
}

struct FieldView {
    name: String,
    value: String,
}

pub async fn index() -> impl IntoResponse {
    Html(IndexTemplate.render().unwrap_or_default())
}

/// Confirmation page listing every journal entry, newest first.
pub async fn message(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let journal = state.journal.load().await.unwrap_or_else(|e| {
        tracing::warn!("Could not read journal, rendering it as empty: {e}");
        Journal::new()
    });

    let entries = journal
        .iter()
        .rev()
        .map(|(timestamp, submission)| EntryView {
            timestamp: timestamp.clone(),
            fields: submission
                .iter()
                .map(|(name, value)| FieldView {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        })
        .collect();

    let html = MessageTemplate { entries }
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render message page: {e}")))?;

    Ok(Html(html))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

pub fn error_html() -> Html<String> {
    Html(ErrorTemplate.render().unwrap_or_default())
}
