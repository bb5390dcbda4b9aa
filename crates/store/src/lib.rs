pub mod error;
pub mod ledger;
pub mod output;
pub mod receipts;

pub use error::StoreError;
pub use ledger::{clear_processed_flags, read_ledger, write_processed_flags};
pub use output::{write_output, WriteMode};
pub use receipts::read_receipts;
