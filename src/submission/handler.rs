use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::SubmissionError;
use crate::journal::JournalStore;

use super::decoder;

/// Journal key format: local time with microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Decode `raw`, stamp it with the current time and merge it into the journal.
/// Returns the key the entry was stored under.
pub async fn process(journal: &JournalStore, raw: &[u8]) -> Result<String, SubmissionError> {
    process_at(journal, raw, Local::now()).await
}

/// Like [`process`] with an explicit timestamp. Two submissions stamped with
/// the same microsecond share a key; the later one replaces the earlier.
pub async fn process_at(
    journal: &JournalStore,
    raw: &[u8],
    at: DateTime<Local>,
) -> Result<String, SubmissionError> {
    let submission = decoder::decode(raw)?;
    let key = timestamp(at);

    journal.insert(&key, submission).await?;

    Ok(key)
}

/// Run one submission behind a guard that logs and swallows every failure,
/// panics included, so the caller's loop always moves on to the next one.
pub async fn handle(journal: Arc<JournalStore>, raw: Vec<u8>) -> Option<String> {
    let task = tokio::spawn(async move { process(&journal, &raw).await });

    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(SubmissionError::Unexpected(format!("submission task failed: {e}"))),
    };

    match result {
        Ok(key) => {
            tracing::info!("Stored submission {key}");
            Some(key)
        }
        Err(e @ SubmissionError::Decode(_)) => {
            tracing::warn!("Rejected submission: {e}");
            None
        }
        Err(e) => {
            tracing::error!("Failed to store submission: {e}");
            None
        }
    }
}
