use std::path::Path;

use saldo_core::{parse_amount, parse_receipt_date, ReceiptRecord};
use tracing::info;

use crate::error::StoreError;

// The receipt table has a fixed layout written by the intake pipeline:
// message_id, receipt_date, receipt_type, order_number, charge_total,
// item_name, item_price, item_qty, parse_status, processed_at.
const IDX_MESSAGE_ID: usize = 0;
const IDX_RECEIPT_DATE: usize = 1;
const IDX_RECEIPT_TYPE: usize = 2;
const IDX_ORDER_NUMBER: usize = 3;
const IDX_CHARGE_TOTAL: usize = 4;
const IDX_ITEM_NAME: usize = 5;
const IDX_ITEM_PRICE: usize = 6;
const IDX_ITEM_QTY: usize = 7;
const IDX_PARSE_STATUS: usize = 8;

fn field(record: &csv::StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}

fn parse_qty(s: &str) -> i64 {
    let s = s.trim();
    if s.is_empty() {
        return 1;
    }
    // Quantities sometimes arrive as "2.0" from the intake side.
    s.parse::<f64>().map(|q| q as i64).unwrap_or(1)
}

/// Read the receipt table. The layout is positional (header row
/// skipped), short rows are padded, and numeric or date fields that do
/// not parse degrade to zero or `None` rather than failing the load.
pub fn read_receipts(path: &Path) -> Result<Vec<ReceiptRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if i == 0 {
            continue;
        }
        let message_id = field(&record, IDX_MESSAGE_ID).trim().to_string();
        records.push(ReceiptRecord {
            message_id,
            receipt_date: parse_receipt_date(field(&record, IDX_RECEIPT_DATE)),
            receipt_type: field(&record, IDX_RECEIPT_TYPE).parse().ok(),
            order_number: field(&record, IDX_ORDER_NUMBER).trim().to_string(),
            charge_total_cents: parse_amount(field(&record, IDX_CHARGE_TOTAL)).unwrap_or(0),
            item_name: field(&record, IDX_ITEM_NAME).trim().to_string(),
            item_price_cents: parse_amount(field(&record, IDX_ITEM_PRICE)).unwrap_or(0),
            item_qty: parse_qty(field(&record, IDX_ITEM_QTY)),
            parse_status: field(&record, IDX_PARSE_STATUS).trim().to_string(),
        });
    }

    info!(records = records.len(), path = %path.display(), "read receipt table");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use saldo_core::ReceiptType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn receipt_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "message_id,receipt_date,receipt_type,order_number,charge_total,item_name,item_price,item_qty,parse_status,processed_at\n";

    #[test]
    fn reads_full_rows() {
        let file = receipt_file(&format!(
            "{HEADER}msg-001,2024-03-08 14:22:00,shipment,111-222,41.03,USB-C Cable 6ft,12.99,2,success,\n"
        ));
        let records = read_receipts(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.message_id, "msg-001");
        assert_eq!(r.receipt_date, NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(r.receipt_type, Some(ReceiptType::Shipment));
        assert_eq!(r.order_number, "111-222");
        assert_eq!(r.charge_total_cents, 4103);
        assert_eq!(r.item_name, "USB-C Cable 6ft");
        assert_eq!(r.item_price_cents, 1299);
        assert_eq!(r.item_qty, 2);
        assert_eq!(r.parse_status, "success");
    }

    #[test]
    fn header_row_is_skipped() {
        let file = receipt_file(HEADER);
        assert!(read_receipts(file.path()).unwrap().is_empty());
    }

    #[test]
    fn short_rows_are_padded() {
        let file = receipt_file(&format!("{HEADER}msg-002,2024-03-08\n"));
        let records = read_receipts(file.path()).unwrap();
        let r = &records[0];
        assert_eq!(r.message_id, "msg-002");
        assert!(r.receipt_type.is_none());
        assert_eq!(r.charge_total_cents, 0);
        assert_eq!(r.item_qty, 1);
    }

    #[test]
    fn bad_numerics_degrade_to_zero() {
        let file = receipt_file(&format!(
            "{HEADER}msg-003,not-a-date,mystery,,pending,Widget,n/a,2.0,partial,\n"
        ));
        let records = read_receipts(file.path()).unwrap();
        let r = &records[0];
        assert!(r.receipt_date.is_none());
        assert!(r.receipt_type.is_none());
        assert_eq!(r.charge_total_cents, 0);
        assert_eq!(r.item_price_cents, 0);
        assert_eq!(r.item_qty, 2);
    }

    #[test]
    fn dollar_amounts_accepted() {
        let file = receipt_file(&format!(
            "{HEADER}msg-004,2024-03-08,order,111,\"$1,234.56\",Desk,\"$1,234.56\",1,success,\n"
        ));
        let records = read_receipts(file.path()).unwrap();
        assert_eq!(records[0].charge_total_cents, 123456);
        assert_eq!(records[0].item_price_cents, 123456);
    }

    #[test]
    fn blank_qty_defaults_to_one() {
        let file = receipt_file(&format!(
            "{HEADER}msg-005,2024-03-08,shipment,111,10.00,Thing,10.00,,success,\n"
        ));
        assert_eq!(read_receipts(file.path()).unwrap()[0].item_qty, 1);
    }
}
