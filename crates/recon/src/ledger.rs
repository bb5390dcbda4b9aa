use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use saldo_core::{BankTransaction, DedupKey, RawLedgerRow};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerOptions {
    /// Drop rows without a classification hint before dedup. Some sync
    /// setups only hint the enriched copy, so this is a cheap duplicate
    /// filter, but checking-account rows often lack hints entirely.
    pub skip_blank_hint: bool,
}

/// Returns the transactions not yet marked processed, deduplicated.
/// Read-only over the input; the processed flag is written back
/// elsewhere, only after output has been committed.
pub fn load_unprocessed(rows: Vec<RawLedgerRow>, options: LedgerOptions) -> Vec<BankTransaction> {
    let total = rows.len();
    let mut skipped_processed = 0usize;
    let mut skipped_no_hint = 0usize;

    let mut transactions = Vec::new();
    for row in rows {
        if row.is_processed() {
            skipped_processed += 1;
            continue;
        }
        if options.skip_blank_hint && row.category_hint.trim().is_empty() {
            skipped_no_hint += 1;
            continue;
        }
        transactions.push(row.into_transaction());
    }

    if skipped_processed > 0 {
        info!(skipped_processed, "skipped already-processed rows");
    }
    if skipped_no_hint > 0 {
        info!(skipped_no_hint, "skipped rows with blank category hint");
    }
    info!(loaded = transactions.len(), total, "loaded ledger rows before dedup");

    let deduped = dedup_sync_duplicates(transactions);
    info!(remaining = deduped.len(), "ledger rows after dedup");
    deduped
}

/// Collapse the pending/posted/enriched copies the sync pipeline creates
/// for one real bank transaction. Rows are grouped by dedup key and one
/// survivor is kept per group: prefer a row with a classification hint,
/// then the latest "row added" timestamp (last write wins).
fn dedup_sync_duplicates(transactions: Vec<BankTransaction>) -> Vec<BankTransaction> {
    let mut groups: HashMap<DedupKey, Vec<BankTransaction>> = HashMap::new();
    for tx in transactions {
        groups.entry(tx.dedup_key()).or_default().push(tx);
    }

    let mut deduped = Vec::new();
    let mut removed = 0usize;
    for (_, mut rows) in groups {
        if rows.len() > 1 {
            removed += rows.len() - 1;
            rows.sort_by(|a, b| {
                (a.has_category_hint, &a.date_added).cmp(&(b.has_category_hint, &b.date_added))
            });
        }
        if let Some(best) = rows.pop() {
            deduped.push(best);
        }
    }

    if removed > 0 {
        info!(removed, "dedup removed sync-duplicate rows");
    }

    // Restore original table order.
    deduped.sort_by_key(|t| t.row_id);
    deduped
}

/// Account/description filter selecting the transactions that can have
/// receipts at all. Everything else passes through the output stage
/// untouched.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    pub account: String,
    pub description_patterns: Vec<String>,
}

impl EligibilityFilter {
    pub fn matches(&self, tx: &BankTransaction) -> bool {
        if !tx.account.trim().eq_ignore_ascii_case(self.account.trim()) {
            return false;
        }
        let desc = tx.description.trim().to_uppercase();
        self.description_patterns
            .iter()
            .any(|p| desc == p.to_uppercase() || desc.starts_with(&p.to_uppercase()))
    }
}

pub fn filter_eligible(
    transactions: &[BankTransaction],
    filter: &EligibilityFilter,
) -> Vec<BankTransaction> {
    let eligible: Vec<BankTransaction> = transactions
        .iter()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect();
    info!(count = eligible.len(), "found receipt-eligible transactions");
    eligible
}

/// Optional month/year narrowing for partial reruns.
pub fn filter_by_period(
    transactions: Vec<BankTransaction>,
    month: Option<u32>,
    year: Option<i32>,
) -> Vec<BankTransaction> {
    if month.is_none() && year.is_none() {
        return transactions;
    }
    let filtered: Vec<BankTransaction> = transactions
        .into_iter()
        .filter(|t| match t.parsed_date() {
            Some(d) => {
                month.map_or(true, |m| d.month() == m) && year.map_or(true, |y| d.year() == y)
            }
            None => false,
        })
        .collect();
    info!(count = filtered.len(), ?month, ?year, "filtered by period");
    filtered
}

/// Keep the first transaction per (date, uppercased description). A
/// second safety net behind the sync dedup for rows the prefix key
/// cannot group.
pub fn dedup_by_date_description(transactions: Vec<BankTransaction>) -> Vec<BankTransaction> {
    let before = transactions.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let unique: Vec<BankTransaction> = transactions
        .into_iter()
        .filter(|t| {
            seen.insert((
                t.date.trim().to_string(),
                t.description.trim().to_uppercase(),
            ))
        })
        .collect();
    if unique.len() < before {
        info!(removed = before - unique.len(), "removed duplicate transactions");
    }
    unique
}
