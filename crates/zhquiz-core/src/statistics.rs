//! Study history statistics.
//!
//! Summarises the result log across sessions: how much was studied, how well
//! each kind is going, and which items keep getting missed.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logger::LogRecord;
use crate::model::DictionaryKind;
use crate::session::Tally;

/// Statistics for a single item across all sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub kind: DictionaryKind,
    pub item_id: String,
    /// Most recent prompt shown for the item.
    pub prompt: String,
    pub tally: Tally,
    pub last_seen: DateTime<Utc>,
}

/// Aggregate statistics over a result log.
#[derive(Debug, Clone, Default)]
pub struct HistoryStats {
    /// Number of distinct sessions.
    pub sessions: usize,
    pub per_kind: BTreeMap<DictionaryKind, Tally>,
    /// Per-item statistics, keyed by (kind, id).
    pub per_item: BTreeMap<(DictionaryKind, String), ItemStats>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl HistoryStats {
    pub fn total(&self) -> Tally {
        self.per_kind.values().fold(Tally::default(), |acc, t| Tally {
            correct: acc.correct + t.correct,
            incorrect: acc.incorrect + t.incorrect,
        })
    }

    /// Items with at least one miss, worst first.
    ///
    /// Ordered by accuracy ascending, then by attempts descending, then by
    /// kind and identifier.
    pub fn weakest(&self, n: usize) -> Vec<&ItemStats> {
        let mut missed: Vec<&ItemStats> = self
            .per_item
            .values()
            .filter(|s| s.tally.incorrect > 0)
            .collect();
        missed.sort_by(|a, b| {
            a.tally
                .accuracy()
                .total_cmp(&b.tally.accuracy())
                .then_with(|| b.tally.total().cmp(&a.tally.total()))
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        missed.truncate(n);
        missed
    }
}

/// Compute history statistics from log records.
pub fn compute_history(records: &[LogRecord]) -> HistoryStats {
    let mut stats = HistoryStats::default();
    let mut sessions = HashSet::new();

    for record in records {
        sessions.insert(record.session_id);
        stats
            .per_kind
            .entry(record.kind)
            .or_default()
            .record(record.correct);

        let key = (record.kind, record.item_id.clone());
        let entry = stats.per_item.entry(key).or_insert_with(|| ItemStats {
            kind: record.kind,
            item_id: record.item_id.clone(),
            prompt: record.prompt.clone(),
            tally: Tally::default(),
            last_seen: record.timestamp,
        });
        entry.tally.record(record.correct);

        if record.timestamp >= entry.last_seen {
            entry.prompt = record.prompt.clone();
            entry.last_seen = record.timestamp;
        }

        stats.first_seen = Some(
            stats
                .first_seen
                .map_or(record.timestamp, |t| t.min(record.timestamp)),
        );
        stats.last_seen = Some(
            stats
                .last_seen
                .map_or(record.timestamp, |t| t.max(record.timestamp)),
        );
    }

    stats.sessions = sessions.len();
    stats
}
