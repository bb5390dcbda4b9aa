use serde::{Deserialize, Serialize};
use std::fmt;

use crate::receipt::ReceiptRecord;
use crate::transaction::RowId;

/// Outcome classification for one transaction after a matching pass.
/// `KnownPattern` is assigned by the output stage, never by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Matched,
    LowConfidence,
    Unmatched,
    KnownPattern,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::LowConfidence => "low_confidence",
            MatchStatus::Unmatched => "unmatched",
            MatchStatus::KnownPattern => "known_pattern",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one per eligible transaction per run. Computed fresh each
/// run and never persisted; idempotency lives in the output store's
/// `source_row` dedup, not here.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub row_id: RowId,
    pub items: Option<Vec<ReceiptRecord>>,
    pub score: u32,
    pub status: MatchStatus,
}

impl MatchResult {
    pub fn unmatched(row_id: RowId) -> Self {
        MatchResult {
            row_id,
            items: None,
            score: 0,
            status: MatchStatus::Unmatched,
        }
    }
}
