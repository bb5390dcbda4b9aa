pub mod config;
pub mod money;
pub mod output;
pub mod parse;
pub mod receipt;
pub mod result;
pub mod transaction;
pub mod window;

pub use config::MatchConfig;
pub use money::Money;
pub use output::{OutputRow, OUTPUT_HEADERS};
pub use parse::{parse_amount, parse_date, parse_receipt_date};
pub use receipt::{ReceiptRecord, ReceiptType, Shipment};
pub use result::{MatchResult, MatchStatus};
pub use transaction::{BankTransaction, DedupKey, RawLedgerRow, RowId};
pub use window::DateRange;
