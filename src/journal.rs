//! File-backed journal of submissions.
//!
//! The whole journal lives in one JSON object on disk. Every insert is a full
//! read-modify-write of that file. Without locking, two overlapping inserts can
//! lose an update: the last writer wins, possibly with data it read before the
//! other writer finished.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::sync::Mutex;

use crate::config::JournalConfig;
use crate::error::StorageError;
use crate::models::{Journal, Submission};

pub struct JournalStore {
    path: PathBuf,
    lock: Option<Mutex<()>>,
}

impl JournalStore {
    pub fn new(config: &JournalConfig) -> Self {
        Self {
            path: config.path.clone(),
            lock: config.locking.then(|| Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locking(&self) -> bool {
        self.lock.is_some()
    }

    /// Create the parent directory and an empty journal file if absent.
    /// Existing content is left untouched.
    pub async fn ensure_exists(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }

    /// Load the full journal. A missing, empty or unparsable file yields an
    /// empty journal.
    pub async fn load(&self) -> Result<Journal, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Journal::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Journal::new());
        }

        match serde_json::from_slice::<Journal>(&bytes) {
            Ok(journal) => Ok(journal),
            Err(e) => {
                tracing::warn!(
                    "Journal at {} is not a valid journal, treating as empty: {e}",
                    self.path.display()
                );
                Ok(Journal::new())
            }
        }
    }

    /// Replace the whole file with `journal`. Not atomic: a crash mid-write
    /// leaves a truncated file behind.
    pub async fn save(&self, journal: &Journal) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        journal.serialize(&mut ser)?;

        tokio::fs::write(&self.path, buf)
            .await
            .map_err(|e| self.io_error(e))
    }

    /// Merge one entry into the journal, overwriting any entry with the same key.
    pub async fn insert(&self, key: &str, submission: Submission) -> Result<(), StorageError> {
        let _guard = match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        self.initialize_if_empty().await?;

        let mut journal = self.load().await?;
        journal.insert(key.to_string(), submission);
        self.save(&journal).await?;

        tracing::debug!("Journal now holds {} entries", journal.len());
        Ok(())
    }

    async fn initialize_if_empty(&self) -> Result<(), StorageError> {
        let empty = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(self.io_error(e)),
        };

        if empty {
            tokio::fs::write(&self.path, b"{}")
                .await
                .map_err(|e| self.io_error(e))?;
        }

        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
