use serde::{Deserialize, Serialize};

use crate::transaction::RowId;

/// Column order of the output table.
pub const OUTPUT_HEADERS: &[&str] = &[
    "Date",
    "Description",
    "Category",
    "Amount",
    "Account",
    "amazon_order_id",
    "match_confidence",
    "match_status",
    "source_row",
    "processed_at",
];

/// One output row: one per purchased item for matched transactions, one
/// summary row otherwise. `source_row` is the idempotency key the
/// output store deduplicates appends by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub account: String,
    pub amazon_order_id: String,
    pub match_confidence: String,
    pub match_status: String,
    pub source_row: RowId,
    pub processed_at: String,
}

impl OutputRow {
    /// Field values in `OUTPUT_HEADERS` order, for tabular sinks.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.description.clone(),
            self.category.clone(),
            self.amount.clone(),
            self.account.clone(),
            self.amazon_order_id.clone(),
            self.match_confidence.clone(),
            self.match_status.clone(),
            self.source_row.to_string(),
            self.processed_at.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_matches_header_arity_and_order() {
        let row = OutputRow {
            date: "2024-03-10".to_string(),
            description: "Widget".to_string(),
            category: "Shopping".to_string(),
            amount: "-$41.03".to_string(),
            account: "Chase Sapphire".to_string(),
            amazon_order_id: "AMAZON.COM*ABC".to_string(),
            match_confidence: "64".to_string(),
            match_status: "matched".to_string(),
            source_row: RowId(2),
            processed_at: "2024-03-11 09:00:00".to_string(),
        };
        let record = row.to_record();
        assert_eq!(record.len(), OUTPUT_HEADERS.len());
        assert_eq!(record[0], "2024-03-10");
        assert_eq!(record[8], "2");
        assert_eq!(record[9], "2024-03-11 09:00:00");
    }
}
