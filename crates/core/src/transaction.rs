use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parse::{parse_amount, parse_date};

/// How much of the description participates in the dedup key. Upstream
/// sync pipelines truncate or decorate descriptions differently per
/// stage, so only a prefix is stable across copies of one real charge.
pub const DEDUP_DESC_PREFIX_LEN: usize = 20;

/// 1-based row number in the source ledger table (header is row 1).
/// This is the idempotency key carried through to the output store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ledger row as read from the source table. Textual fields are kept
/// verbatim so unmatched rows pass through to the output unchanged;
/// typed views are computed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    pub row_id: RowId,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub account: String,
    /// True when the upstream sync attached a classification hint.
    /// Used only to pick the best copy during dedup.
    pub has_category_hint: bool,
    /// "row added" timestamp as recorded upstream; lexicographic
    /// comparison is enough for last-write-wins.
    pub date_added: String,
}

/// One row exactly as it sits in the source ledger table, before
/// processed-flag filtering and dedup. The store produces these; the
/// ledger loader decides which become [`BankTransaction`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLedgerRow {
    pub row_id: RowId,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub account: String,
    pub processed_flag: String,
    pub category_hint: String,
    pub date_added: String,
}

impl RawLedgerRow {
    /// Truthy forms written back by earlier runs.
    pub fn is_processed(&self) -> bool {
        let flag = self.processed_flag.trim().to_uppercase();
        flag == "TRUE" || flag == "1"
    }

    pub fn into_transaction(self) -> BankTransaction {
        let has_category_hint = !self.category_hint.trim().is_empty();
        BankTransaction {
            row_id: self.row_id,
            date: self.date,
            description: self.description,
            category: self.category,
            amount: self.amount,
            account: self.account,
            has_category_hint,
            date_added: self.date_added,
        }
    }
}

/// Identity of one real-world charge across pending/posted/enriched
/// copies produced by the sync pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub date: String,
    pub amount: String,
    pub account: String,
    pub description_prefix: String,
}

impl BankTransaction {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn amount_cents(&self) -> Option<i64> {
        parse_amount(&self.amount)
    }

    pub fn dedup_key(&self) -> DedupKey {
        let prefix: String = self.description.chars().take(DEDUP_DESC_PREFIX_LEN).collect();
        DedupKey {
            date: self.date.trim().to_string(),
            amount: self.amount.trim().to_string(),
            account: self.account.trim().to_string(),
            description_prefix: prefix.trim().to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(desc: &str) -> BankTransaction {
        BankTransaction {
            row_id: RowId(2),
            date: "2024-03-10 ".to_string(),
            description: desc.to_string(),
            category: String::new(),
            amount: " -41.03".to_string(),
            account: "Chase Sapphire".to_string(),
            has_category_hint: false,
            date_added: String::new(),
        }
    }

    #[test]
    fn parsed_views() {
        let t = tx("AMAZON.COM*ABC123");
        assert_eq!(t.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(t.amount_cents(), Some(-4103));
    }

    #[test]
    fn dedup_key_normalizes() {
        let key = tx("amazon.com*abc123 extra words beyond prefix").dedup_key();
        assert_eq!(key.date, "2024-03-10");
        assert_eq!(key.amount, "-41.03");
        assert_eq!(key.description_prefix, "AMAZON.COM*ABC123 EX");
    }

    #[test]
    fn dedup_key_matches_across_stage_suffixes() {
        // Pending vs. enriched copies differ only past the prefix.
        let a = tx("AMAZON.COM*ABC123XYZ pending").dedup_key();
        let b = tx("AMAZON.COM*ABC123XYZ posted 04/12").dedup_key();
        assert_eq!(a, b);
    }

    #[test]
    fn dedup_key_prefix_shorter_than_limit() {
        let key = tx("AMZN").dedup_key();
        assert_eq!(key.description_prefix, "AMZN");
    }

    #[test]
    fn processed_flag_truthy_forms() {
        let mut raw = RawLedgerRow::default();
        for flag in ["TRUE", "true", " True ", "1"] {
            raw.processed_flag = flag.to_string();
            assert!(raw.is_processed(), "flag {flag:?} should be truthy");
        }
        for flag in ["", "FALSE", "0", "yes"] {
            raw.processed_flag = flag.to_string();
            assert!(!raw.is_processed(), "flag {flag:?} should be falsy");
        }
    }

    #[test]
    fn into_transaction_detects_hint() {
        let raw = RawLedgerRow {
            category_hint: "Shopping".to_string(),
            ..RawLedgerRow::default()
        };
        assert!(raw.into_transaction().has_category_hint);

        let raw = RawLedgerRow {
            category_hint: "  ".to_string(),
            ..RawLedgerRow::default()
        };
        assert!(!raw.into_transaction().has_category_hint);
    }
}
