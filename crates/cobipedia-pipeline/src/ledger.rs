//! Durable per-entry progress record that makes runs resumable.
//!
//! On disk the ledger is a pretty-printed JSON document:
//!
//! ```json
//! { "set": { "en": { "completed": ["abc"], "errors": [{"documentId": "def", "error": "...", "timestamp": "..."}] } } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "documentId")]
    pub document_id: String,
    pub error: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleProgress {
    #[serde(default)]
    pub completed: Vec<String>,
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
}

/// Completed ids and error history per (content type, locale).
///
/// Completed ids are never removed; errors are append-only and may repeat an
/// id across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressLedger {
    types: BTreeMap<String, BTreeMap<String, LocaleProgress>>,
}

/// Counts for one (content type, locale) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummaryRow {
    pub content_type: String,
    pub locale: String,
    pub completed: usize,
    pub errors: usize,
}

impl ProgressLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn progress(&self, content_type: &str, locale: &str) -> Option<&LocaleProgress> {
        self.types.get(content_type)?.get(locale)
    }

    fn progress_mut(&mut self, content_type: &str, locale: &str) -> &mut LocaleProgress {
        self.types
            .entry(content_type.to_string())
            .or_default()
            .entry(locale.to_string())
            .or_default()
    }

    #[must_use]
    pub fn is_completed(&self, content_type: &str, locale: &str, document_id: &str) -> bool {
        self.progress(content_type, locale)
            .is_some_and(|p| p.completed.iter().any(|id| id == document_id))
    }

    /// Records `document_id` as done. Marking it twice is a no-op.
    pub fn mark_completed(&mut self, content_type: &str, locale: &str, document_id: &str) {
        let progress = self.progress_mut(content_type, locale);
        if !progress.completed.iter().any(|id| id == document_id) {
            progress.completed.push(document_id.to_string());
        }
    }

    /// Appends an error record stamped with the current time.
    pub fn mark_error(&mut self, content_type: &str, locale: &str, document_id: &str, message: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.progress_mut(content_type, locale)
            .errors
            .push(ErrorRecord {
                document_id: document_id.to_string(),
                error: message.to_string(),
                timestamp,
            });
    }

    #[must_use]
    pub fn completed_count(&self, content_type: &str, locale: &str) -> usize {
        self.progress(content_type, locale)
            .map_or(0, |p| p.completed.len())
    }

    #[must_use]
    pub fn errors(&self, content_type: &str, locale: &str) -> &[ErrorRecord] {
        self.progress(content_type, locale)
            .map(|p| p.errors.as_slice())
            .unwrap_or_default()
    }

    /// One row per recorded (content type, locale) pair.
    #[must_use]
    pub fn summary(&self) -> Vec<LedgerSummaryRow> {
        self.types
            .iter()
            .flat_map(|(content_type, locales)| {
                locales.iter().map(move |(locale, progress)| LedgerSummaryRow {
                    content_type: content_type.clone(),
                    locale: locale.clone(),
                    completed: progress.completed.len(),
                    errors: progress.errors.len(),
                })
            })
            .collect()
    }
}

/// Destination for ledger flushes during a run.
pub trait Checkpoint {
    /// Persists the full ledger, replacing whatever was stored before.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the ledger cannot be written.
    fn save(&mut self, ledger: &ProgressLedger) -> Result<(), LedgerError>;
}

/// Ledger stored as a JSON file.
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the ledger; a missing file yields an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Read`] on I/O failure or
    /// [`LedgerError::Parse`] if the file is not a ledger document.
    pub fn load(&self) -> Result<ProgressLedger, LedgerError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ProgressLedger::new());
            }
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| LedgerError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Checkpoint for LedgerFile {
    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash never leaves a truncated ledger behind.
    fn save(&mut self, ledger: &ProgressLedger) -> Result<(), LedgerError> {
        let mut json = serde_json::to_string_pretty(ledger)?;
        json.push('\n');

        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "ledger saved");
        Ok(())
    }
}

/// Keeps the ledger in memory only; used for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardCheckpoint;

impl Checkpoint for DiscardCheckpoint {
    fn save(&mut self, _ledger: &ProgressLedger) -> Result<(), LedgerError> {
        Ok(())
    }
}
