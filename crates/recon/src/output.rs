use std::collections::{BTreeMap, HashSet};

use saldo_core::{BankTransaction, MatchResult, MatchStatus, Money, OutputRow, RowId};
use tracing::info;

use crate::patterns::KnownPatternTable;
use crate::summarize::{summarize_item_name, DEFAULT_MAX_LENGTH};

fn passthrough(tx: &BankTransaction, processed_at: &str) -> OutputRow {
    OutputRow {
        date: tx.date.clone(),
        description: tx.description.clone(),
        category: tx.category.clone(),
        amount: tx.amount.clone(),
        account: tx.account.clone(),
        amazon_order_id: String::new(),
        match_confidence: String::new(),
        match_status: String::new(),
        source_row: tx.row_id,
        processed_at: processed_at.to_string(),
    }
}

/// Expand match results into output rows.
///
/// Matched and low-confidence results emit one row per item, with the
/// summarized item name in place of the raw card description and the
/// original description preserved in `amazon_order_id` for audit.
/// Unmatched eligible transactions fall back to the known-pattern table;
/// everything else passes through with empty match fields.
pub fn generate_output_rows(
    all_transactions: &[BankTransaction],
    eligible: &[BankTransaction],
    results: &BTreeMap<RowId, MatchResult>,
    patterns: &KnownPatternTable,
    processed_at: &str,
) -> Vec<OutputRow> {
    let eligible_rows: HashSet<RowId> = eligible.iter().map(|t| t.row_id).collect();
    let mut output = Vec::new();

    for tx in all_transactions {
        let result = if eligible_rows.contains(&tx.row_id) {
            results.get(&tx.row_id)
        } else {
            None
        };

        let Some(result) = result else {
            output.push(passthrough(tx, processed_at));
            continue;
        };

        let items = match (&result.items, result.status) {
            (Some(items), MatchStatus::Matched | MatchStatus::LowConfidence) => Some(items),
            _ => None,
        };

        if let Some(items) = items {
            let sign_negative = tx.amount_cents().map_or(false, |c| c < 0);

            for item in items {
                if item.item_name.is_empty() {
                    continue;
                }
                let price = if sign_negative {
                    -item.item_price_cents
                } else {
                    item.item_price_cents
                };
                output.push(OutputRow {
                    date: tx.date.clone(),
                    description: summarize_item_name(&item.item_name, DEFAULT_MAX_LENGTH),
                    category: tx.category.clone(),
                    amount: Money::from_cents(price).to_string(),
                    account: tx.account.clone(),
                    amazon_order_id: tx.description.clone(),
                    match_confidence: result.score.to_string(),
                    match_status: result.status.as_str().to_string(),
                    source_row: tx.row_id,
                    processed_at: processed_at.to_string(),
                });
            }
        } else {
            let mut row = passthrough(tx, processed_at);
            row.match_confidence = result.score.to_string();

            // Recurring non-itemized charges get a clean display name;
            // category stays untouched for the external classifier.
            if let Some(clean_name) = patterns.lookup(&tx.description) {
                info!(
                    row = %tx.row_id,
                    original = %tx.description,
                    clean_name,
                    "known pattern"
                );
                row.description = clean_name.to_string();
                row.match_status = MatchStatus::KnownPattern.as_str().to_string();
            } else {
                row.match_status = result.status.as_str().to_string();
            }

            output.push(row);
        }
    }

    output
}
