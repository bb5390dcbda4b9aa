pub mod ledger;
pub mod matcher;
pub mod output;
pub mod patterns;
pub mod receipts;
pub mod score;
pub mod summarize;

pub use ledger::{
    dedup_by_date_description, filter_by_period, filter_eligible, load_unprocessed,
    EligibilityFilter, LedgerOptions,
};
pub use matcher::{match_all, match_transaction, SingleMatch, TypePolicy};
pub use output::generate_output_rows;
pub use patterns::{KnownPattern, KnownPatternTable};
pub use receipts::{filter_window, group_shipments, receipt_window};
pub use score::confidence_score;
pub use summarize::summarize_item_name;
