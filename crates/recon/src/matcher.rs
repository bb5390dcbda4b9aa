use std::collections::{BTreeMap, HashSet};

use saldo_core::{
    BankTransaction, MatchConfig, MatchResult, MatchStatus, ReceiptRecord, ReceiptType, RowId,
    Shipment,
};
use tracing::{debug, info, warn};

/// How candidate generation walks the receipt-type search order.
///
/// The single-transaction entry point historically stopped scanning
/// further types once a high-confidence candidate appeared, while the
/// batch path pooled every eligible type and let global ranking decide.
/// Both behaviors share one implementation with the difference made
/// explicit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePolicy {
    /// Stop after the first type that produced a candidate scoring at or
    /// above the high threshold.
    StopAtHighConfidence,
    /// Scan every eligible type and pool all candidates.
    PoolAll,
}

/// A scored, not-yet-committed pairing. Ephemeral: exists only during
/// an assignment pass.
#[derive(Debug, Clone)]
struct Candidate {
    score: u32,
    row_id: RowId,
    message_id: String,
    shipment_idx: usize,
}

/// Receipt types worth searching for a transaction, from its sign:
/// credits settle against returns, charges against shipments with
/// orders as a fallback proxy when no shipment total exists.
fn type_search_order(amount_cents: i64) -> &'static [ReceiptType] {
    if amount_cents > 0 {
        &[ReceiptType::Return]
    } else {
        &[ReceiptType::Shipment, ReceiptType::Order]
    }
}

/// All viable candidates for one transaction, in discovery order.
/// Transactions with an unparseable date or zero amount yield nothing.
fn candidates_for(
    tx: &BankTransaction,
    shipments: &[Shipment],
    used_message_ids: &HashSet<String>,
    config: &MatchConfig,
    policy: TypePolicy,
) -> Vec<Candidate> {
    let Some(tx_date) = tx.parsed_date() else {
        return Vec::new();
    };
    let Some(amount_raw) = tx.amount_cents() else {
        return Vec::new();
    };
    if amount_raw == 0 {
        return Vec::new();
    }
    let amount_abs = amount_raw.abs();

    let mut candidates = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut best_score = 0u32;

    for target_type in type_search_order(amount_raw) {
        for (idx, shipment) in shipments.iter().enumerate() {
            if shipment.receipt_type != Some(*target_type) {
                continue;
            }
            if seen.contains(shipment.message_id.as_str()) {
                continue;
            }
            if used_message_ids.contains(&shipment.message_id) {
                continue;
            }
            let Some(receipt_date) = shipment.receipt_date else {
                continue;
            };
            let date_diff = (tx_date - receipt_date).num_days().abs();
            if date_diff > config.date_window_days {
                continue;
            }
            if !shipment.has_charge_total() {
                continue;
            }
            seen.insert(shipment.message_id.as_str());

            let score = crate::score::confidence_score(
                amount_abs,
                shipment.charge_total_cents,
                date_diff,
                config,
            );
            if score == 0 {
                continue;
            }
            best_score = best_score.max(score);
            candidates.push(Candidate {
                score,
                row_id: tx.row_id,
                message_id: shipment.message_id.clone(),
                shipment_idx: idx,
            });
        }

        if policy == TypePolicy::StopAtHighConfidence && best_score >= config.confidence_high {
            break;
        }
    }

    candidates
}

/// Result of matching one transaction in isolation.
#[derive(Debug, Clone)]
pub struct SingleMatch {
    pub items: Option<Vec<ReceiptRecord>>,
    pub score: u32,
    pub status: MatchStatus,
    /// The claimed shipment. `None` below the assignment floor: a
    /// sub-threshold best candidate must not consume the shipment.
    pub message_id: Option<String>,
}

impl SingleMatch {
    fn unmatched() -> Self {
        SingleMatch {
            items: None,
            score: 0,
            status: MatchStatus::Unmatched,
            message_id: None,
        }
    }
}

/// Match a single transaction against the shipment pool, skipping
/// shipments already claimed elsewhere. Uses the stop-at-high-confidence
/// type policy: a high-scoring shipment-type match suppresses the
/// order-type fallback scan entirely.
pub fn match_transaction(
    tx: &BankTransaction,
    shipments: &[Shipment],
    used_message_ids: &HashSet<String>,
    config: &MatchConfig,
) -> SingleMatch {
    let candidates = candidates_for(
        tx,
        shipments,
        used_message_ids,
        config,
        TypePolicy::StopAtHighConfidence,
    );

    // First strictly-better candidate wins; discovery order breaks ties.
    let mut best: Option<&Candidate> = None;
    for candidate in &candidates {
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    let Some(best) = best else {
        return SingleMatch::unmatched();
    };

    // Below the floor the best score is still reported for diagnostics,
    // but nothing is claimed.
    if best.score < config.confidence_low {
        return SingleMatch {
            items: None,
            score: best.score,
            status: MatchStatus::Unmatched,
            message_id: None,
        };
    }

    let status = if best.score >= config.confidence_high {
        MatchStatus::Matched
    } else {
        MatchStatus::LowConfidence
    };

    SingleMatch {
        items: Some(shipments[best.shipment_idx].items.clone()),
        score: best.score,
        status,
        message_id: Some(best.message_id.clone()),
    }
}

/// Match every transaction in one global pass.
///
/// Per-transaction greedy matching lets an early transaction steal a
/// shipment that fits a later one better. Instead: score all viable
/// pairs (pooling shipment and order types), sort globally by score
/// descending, and assign greedily under mutual exclusion. Sorting is
/// stable, so ties resolve in discovery order and the pass is
/// deterministic for a fixed snapshot.
pub fn match_all(
    transactions: &[BankTransaction],
    shipments: &[Shipment],
    config: &MatchConfig,
) -> BTreeMap<RowId, MatchResult> {
    let no_used = HashSet::new();

    // Phase 1: candidate generation.
    let mut candidates: Vec<Candidate> = Vec::new();
    for tx in transactions {
        candidates.extend(candidates_for(
            tx,
            shipments,
            &no_used,
            config,
            TypePolicy::PoolAll,
        ));
    }
    debug!(count = candidates.len(), "scored candidate pairs");

    // Phase 2: global greedy assignment.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let mut used_messages: HashSet<&str> = HashSet::new();
    let mut results: BTreeMap<RowId, MatchResult> = BTreeMap::new();

    for candidate in &candidates {
        if results.contains_key(&candidate.row_id)
            || used_messages.contains(candidate.message_id.as_str())
        {
            continue;
        }
        if candidate.score < config.confidence_low {
            continue;
        }
        let status = if candidate.score >= config.confidence_high {
            MatchStatus::Matched
        } else {
            MatchStatus::LowConfidence
        };
        results.insert(
            candidate.row_id,
            MatchResult {
                row_id: candidate.row_id,
                items: Some(shipments[candidate.shipment_idx].items.clone()),
                score: candidate.score,
                status,
            },
        );
        used_messages.insert(candidate.message_id.as_str());
    }

    // Phase 3: unmatched sweep.
    for tx in transactions {
        results
            .entry(tx.row_id)
            .or_insert_with(|| MatchResult::unmatched(tx.row_id));
    }

    let matched = results.values().filter(|r| r.status == MatchStatus::Matched).count();
    let low = results
        .values()
        .filter(|r| r.status == MatchStatus::LowConfidence)
        .count();
    let unmatched = results.values().filter(|r| r.status == MatchStatus::Unmatched).count();
    info!(matched, low_confidence = low, unmatched, "assignment complete");
    if low > 0 {
        warn!(low_confidence = low, "matches flagged for review");
    }

    results
}
