use serde::{Deserialize, Serialize};

/// Matching thresholds for one reconciliation run. Passed by value into
/// the scorer and matchers so tests and callers can override per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Candidate eligibility window in days, each side of the
    /// transaction date. Charges can post weeks after the order.
    pub date_window_days: i64,
    /// Hard score cutoff: pairs differing by more than this many cents
    /// never become candidates.
    pub amount_tolerance_cents: i64,
    /// Score at or above which a match is committed as `matched`.
    pub confidence_high: u32,
    /// Assignment floor: below this a candidate is never assigned.
    pub confidence_low: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            date_window_days: 30,
            amount_tolerance_cents: 300,
            confidence_high: 60,
            confidence_low: 40,
        }
    }
}
