use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

use saldo_core::{OutputRow, OUTPUT_HEADERS};
use tracing::info;

use crate::error::StoreError;

const SOURCE_ROW_IDX: usize = 8;

/// How to reconcile new rows with what the output table already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the table wholesale. Development runs use this.
    Rewrite,
    /// Keep existing rows and add only rows whose `source_row` has not
    /// been written before, so re-running a batch cannot duplicate.
    Append,
}

/// Write output rows to the table at `path` and return how many were
/// actually written.
pub fn write_output(
    path: &Path,
    rows: &[OutputRow],
    mode: WriteMode,
) -> Result<usize, StoreError> {
    match mode {
        WriteMode::Rewrite => rewrite(path, rows),
        WriteMode::Append => append(path, rows),
    }
}

fn rewrite(path: &Path, rows: &[OutputRow]) -> Result<usize, StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OUTPUT_HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    info!(rows = rows.len(), path = %path.display(), "rewrote output table");
    Ok(rows.len())
}

fn append(path: &Path, rows: &[OutputRow]) -> Result<usize, StoreError> {
    let seen = existing_source_rows(path)?;
    let fresh: Vec<&OutputRow> = rows
        .iter()
        .filter(|r| !seen.contains(&r.source_row.0))
        .collect();
    let skipped = rows.len() - fresh.len();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let needs_header = file.metadata()?.len() == 0;
    let mut writer = csv::Writer::from_writer(file);
    if needs_header {
        writer.write_record(OUTPUT_HEADERS)?;
    }
    for row in &fresh {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    if skipped > 0 {
        info!(skipped, "skipped rows already present in output table");
    }
    info!(rows = fresh.len(), path = %path.display(), "appended to output table");
    Ok(fresh.len())
}

// Source rows already written. A matched transaction emits one output
// row per item, all sharing a source_row, so dedup is against the file
// only and never within the incoming batch.
fn existing_source_rows(path: &Path) -> Result<HashSet<i64>, StoreError> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut seen = HashSet::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if i == 0 {
            continue;
        }
        if let Some(value) = record.get(SOURCE_ROW_IDX) {
            if let Ok(id) = value.trim().parse::<i64>() {
                seen.insert(id);
            }
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saldo_core::RowId;
    use tempfile::tempdir;

    fn row(source_row: i64, description: &str) -> OutputRow {
        OutputRow {
            date: "2024-03-10".to_string(),
            description: description.to_string(),
            category: "Shopping".to_string(),
            amount: "-$41.03".to_string(),
            account: "Chase Sapphire".to_string(),
            amazon_order_id: "AMAZON.COM*ABC".to_string(),
            match_confidence: "64".to_string(),
            match_status: "matched".to_string(),
            source_row: RowId(source_row),
            processed_at: "2024-03-11 09:00:00".to_string(),
        }
    }

    fn read_table(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn rewrite_replaces_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        write_output(&path, &[row(2, "Old")], WriteMode::Rewrite).unwrap();
        let written = write_output(&path, &[row(3, "New")], WriteMode::Rewrite).unwrap();
        assert_eq!(written, 1);
        let table = read_table(&path);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], OUTPUT_HEADERS);
        assert_eq!(table[1][1], "New");
    }

    #[test]
    fn append_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        write_output(&path, &[row(2, "Widget")], WriteMode::Append).unwrap();
        let table = read_table(&path);
        assert_eq!(table[0], OUTPUT_HEADERS);
        assert_eq!(table[1][8], "2");
    }

    #[test]
    fn append_skips_source_rows_already_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        write_output(&path, &[row(2, "Widget")], WriteMode::Append).unwrap();
        let written =
            write_output(&path, &[row(2, "Widget"), row(5, "Gadget")], WriteMode::Append)
                .unwrap();
        assert_eq!(written, 1);
        let table = read_table(&path);
        assert_eq!(table.len(), 3);
        assert_eq!(table[2][8], "5");
    }

    #[test]
    fn append_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let batch = [row(2, "Widget"), row(3, "Gadget")];
        write_output(&path, &batch, WriteMode::Append).unwrap();
        let second = write_output(&path, &batch, WriteMode::Append).unwrap();
        assert_eq!(second, 0);
        assert_eq!(read_table(&path).len(), 3);
    }

    #[test]
    fn append_keeps_multi_item_rows_sharing_a_source_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let written = write_output(
            &path,
            &[row(2, "Cable"), row(2, "Charger")],
            WriteMode::Append,
        )
        .unwrap();
        assert_eq!(written, 2);
        assert_eq!(read_table(&path).len(), 3);
    }
}
