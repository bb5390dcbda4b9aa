use std::path::Path;

use saldo_core::{RawLedgerRow, RowId};
use tracing::info;

use crate::error::StoreError;

const COL_DATE: &str = "Date";
const COL_DESCRIPTION: &str = "Description";
const COL_CATEGORY: &str = "Category";
const COL_AMOUNT: &str = "Amount";
const COL_ACCOUNT: &str = "Account";
const COL_PROCESSED_FLAG: &str = "Processed_Flag";
const COL_CATEGORY_HINT: &str = "Category Hint";
const COL_DATE_ADDED: &str = "Date Added";

const REQUIRED_COLUMNS: &[&str] = &[
    COL_DATE,
    COL_DESCRIPTION,
    COL_CATEGORY,
    COL_AMOUNT,
    COL_ACCOUNT,
];

struct LedgerColumns {
    date: usize,
    description: usize,
    category: usize,
    amount: usize,
    account: usize,
    processed_flag: Option<usize>,
    category_hint: Option<usize>,
    date_added: Option<usize>,
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<LedgerColumns, StoreError> {
    for name in REQUIRED_COLUMNS {
        if find_column(headers, name).is_none() {
            return Err(StoreError::MissingColumn(name.to_string()));
        }
    }
    let required = |name: &str| find_column(headers, name).unwrap_or(usize::MAX);
    Ok(LedgerColumns {
        date: required(COL_DATE),
        description: required(COL_DESCRIPTION),
        category: required(COL_CATEGORY),
        amount: required(COL_AMOUNT),
        account: required(COL_ACCOUNT),
        processed_flag: find_column(headers, COL_PROCESSED_FLAG),
        category_hint: find_column(headers, COL_CATEGORY_HINT),
        date_added: find_column(headers, COL_DATE_ADDED),
    })
}

fn field(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}

fn optional_field(record: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.map(|i| field(record, i)).unwrap_or_default()
}

/// Read the source ledger table. Columns are located by header name, so
/// the table's column order does not matter; short rows are padded with
/// empty fields. Row ids are 1-based table positions (the header is
/// row 1), matching the numbering the output table refers back to.
pub fn read_ledger(path: &Path) -> Result<Vec<RawLedgerRow>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let headers = match records.next() {
        Some(record) => record?,
        None => return Err(StoreError::MissingHeader(path.display().to_string())),
    };
    let columns = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record?;
        rows.push(RawLedgerRow {
            row_id: RowId(i as i64 + 2),
            date: field(&record, columns.date),
            description: field(&record, columns.description),
            category: field(&record, columns.category),
            amount: field(&record, columns.amount),
            account: field(&record, columns.account),
            processed_flag: optional_field(&record, columns.processed_flag),
            category_hint: optional_field(&record, columns.category_hint),
            date_added: optional_field(&record, columns.date_added),
        });
    }

    info!(rows = rows.len(), path = %path.display(), "read ledger table");
    Ok(rows)
}

/// Mark the given rows processed so subsequent runs skip them. Creates
/// the `Processed_Flag` column when the table lacks one. Callers invoke
/// this only for matched rows, after the output write has succeeded.
pub fn write_processed_flags(path: &Path, row_ids: &[RowId]) -> Result<usize, StoreError> {
    if row_ids.is_empty() {
        return Ok(0);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut table: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(|s| s.to_string()).collect());
    }
    if table.is_empty() {
        return Err(StoreError::MissingHeader(path.display().to_string()));
    }

    let flag_idx = match table[0].iter().position(|h| h.trim() == COL_PROCESSED_FLAG) {
        Some(idx) => idx,
        None => {
            table[0].push(COL_PROCESSED_FLAG.to_string());
            table[0].len() - 1
        }
    };

    let mut updated = 0usize;
    for row_id in row_ids {
        // Row 1 is the header; data rows start at row id 2.
        let idx = row_id.0 as usize;
        if idx <= 1 || idx > table.len() {
            continue;
        }
        let row = &mut table[idx - 1];
        if row.len() <= flag_idx {
            row.resize(flag_idx + 1, String::new());
        }
        row[flag_idx] = "TRUE".to_string();
        updated += 1;
    }

    write_table(path, &table)?;
    info!(updated, path = %path.display(), "updated processed flags");
    Ok(updated)
}

/// Blank every `Processed_Flag` value, forcing a full reprocess.
/// Development-mode reset; a no-op when the column does not exist.
pub fn clear_processed_flags(path: &Path) -> Result<(), StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut table: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(|s| s.to_string()).collect());
    }
    if table.is_empty() {
        return Ok(());
    }

    let Some(flag_idx) = table[0].iter().position(|h| h.trim() == COL_PROCESSED_FLAG) else {
        info!("no processed-flag column, nothing to clear");
        return Ok(());
    };

    let cleared = table.len() - 1;
    for row in table.iter_mut().skip(1) {
        if row.len() > flag_idx {
            row[flag_idx] = String::new();
        }
    }

    write_table(path, &table)?;
    info!(cleared, path = %path.display(), "cleared processed flags");
    Ok(())
}

fn write_table(path: &Path, table: &[Vec<String>]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in table {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
