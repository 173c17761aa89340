//! Append-only result log.
//!
//! Each result becomes one JSON object on its own line. The file is opened,
//! appended to, flushed and closed for every record, so a crash between
//! answers never loses or damages earlier lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::model::{DictionaryKind, Direction};
use crate::question::QuizResult;

/// Destination for graded results.
pub trait ResultSink {
    /// Durably record one result.
    fn log(&self, result: &QuizResult) -> Result<(), QuizError>;
}

/// One line of the result log. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub kind: DictionaryKind,
    pub item_id: String,
    pub direction: Direction,
    pub prompt: String,
    pub answer: String,
    pub correct: bool,
}

impl LogRecord {
    pub fn new(session_id: Uuid, result: &QuizResult) -> Self {
        Self {
            timestamp: result.answered_at,
            session_id,
            kind: result.kind,
            item_id: result.item_id.clone(),
            direction: result.direction,
            prompt: result.prompt.clone(),
            answer: result.answer.clone(),
            correct: result.correct,
        }
    }
}

/// Appends results to a JSON Lines file.
#[derive(Debug, Clone)]
pub struct ResultLogger {
    path: PathBuf,
    session_id: Uuid,
}

impl ResultLogger {
    /// A logger for a new session, tagged with a fresh session id.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_session(path, Uuid::new_v4())
    }

    pub fn with_session(path: impl Into<PathBuf>, session_id: Uuid) -> Self {
        Self {
            path: path.into(),
            session_id,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn append(&self, line: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line)?;
        file.flush()?;
        file.sync_data()
    }
}

impl ResultSink for ResultLogger {
    fn log(&self, result: &QuizResult) -> Result<(), QuizError> {
        let record = LogRecord::new(self.session_id, result);
        let mut line = serde_json::to_vec(&record).map_err(|e| QuizError::LogWrite {
            path: self.path.clone(),
            source: e.into(),
        })?;
        line.push(b'\n');

        self.append(&line).map_err(|source| QuizError::LogWrite {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("logged {} '{}' to {}", record.kind, record.item_id, self.path.display());
        Ok(())
    }
}

/// Read every well-formed record from a result log.
///
/// A missing log is an empty history. Malformed lines are skipped with a
/// warning so one bad line never hides the rest.
pub fn read_log(path: &Path) -> Result<Vec<LogRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read result log: {}", path.display()))?;

    let mut records = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("{}:{}: skipping malformed record: {}", path.display(), n + 1, e),
        }
    }
    Ok(records)
}
