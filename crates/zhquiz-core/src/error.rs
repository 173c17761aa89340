//! Session error types.
//!
//! These are the failures the session loop knows how to classify. Loading
//! dictionaries, rule files and config uses `anyhow` instead, since those
//! errors are only ever reported, never recovered from.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{DictionaryKind, Direction};

/// Errors that can occur while running a study session.
#[derive(Debug, Error)]
pub enum QuizError {
    /// No dictionary item is eligible for the requested mode.
    #[error("no eligible items in {} for {direction}", format_kinds(.kinds))]
    EmptySelection {
        kinds: BTreeSet<DictionaryKind>,
        direction: Direction,
    },

    /// The input stream ended before an answer was supplied.
    #[error("input ended before an answer was given")]
    InputExhausted,

    /// A result could not be appended to the log.
    #[error("failed to write result log {}: {source}", .path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading an answer or writing a prompt failed.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[source] io::Error),
}

impl QuizError {
    /// Returns `true` if this error should end the process with a failure status.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QuizError::EmptySelection { .. } | QuizError::Terminal(_)
        )
    }
}

fn format_kinds(kinds: &BTreeSet<DictionaryKind>) -> String {
    if kinds.is_empty() {
        return "no dictionaries".to_string();
    }
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
