use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::views;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {msg}");
                (StatusCode::NOT_FOUND, views::pages::error_html()).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// A form body that could not be turned into a submission.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("form body is not valid UTF-8")]
    Utf8,

    #[error("malformed percent-escape at byte {offset}")]
    Escape { offset: usize },

    /// Zero or more than one `=` in a single `name=value` assignment.
    #[error("assignment {index} has {separators} '=' separators, expected exactly one")]
    Assignment { index: usize, separators: usize },
}

/// Failure to read or write the journal file.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("journal I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize journal: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything that can go wrong between a datagram arriving and its entry
/// landing in the journal. Never propagated past the handler guard.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("error processing form data: {0}")]
    Decode(#[from] DecodeError),

    #[error("error reading or writing journal: {0}")]
    StorageIo(#[source] StorageError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<StorageError> for SubmissionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io { .. } => SubmissionError::StorageIo(err),
            StorageError::Serialize(e) => SubmissionError::Unexpected(e.to_string()),
        }
    }
}
