use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use saldo_core::{BankTransaction, MatchResult, MatchStatus, RowId};
use saldo_recon::{
    dedup_by_date_description, filter_by_period, filter_eligible, filter_window,
    generate_output_rows, group_shipments, load_unprocessed, match_all, receipt_window,
    KnownPatternTable,
};
use saldo_store::{
    clear_processed_flags, read_ledger, read_receipts, write_output, write_processed_flags,
    WriteMode,
};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::Mode;

pub struct RunArgs {
    pub ledger: PathBuf,
    pub receipts: PathBuf,
    pub output: PathBuf,
    pub mode: Mode,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub config: RunConfig,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = &args.config;
    let match_config = config.match_config();
    let patterns = config.pattern_table();

    info!(mode = ?args.mode, "starting reconciliation run");

    if args.mode == Mode::Development {
        info!("development mode: clearing processed flags and output table");
        clear_processed_flags(&args.ledger)
            .with_context(|| format!("clearing flags in {}", args.ledger.display()))?;
        write_output(&args.output, &[], WriteMode::Rewrite)
            .with_context(|| format!("clearing output {}", args.output.display()))?;
    }

    let rows = read_ledger(&args.ledger)
        .with_context(|| format!("reading ledger {}", args.ledger.display()))?;
    let all_transactions = load_unprocessed(rows, config.ledger_options());
    if all_transactions.is_empty() {
        info!("no unprocessed transactions found");
        return Ok(());
    }
    let all_transactions = filter_by_period(all_transactions, args.month, args.year);

    let eligible = filter_eligible(&all_transactions, &config.eligibility_filter());
    let eligible = dedup_by_date_description(eligible);

    let processed_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let write_mode = match args.mode {
        Mode::Development => WriteMode::Rewrite,
        Mode::Production => WriteMode::Append,
    };

    if eligible.is_empty() {
        info!("no reconcilable transactions, passing everything through");
        let no_results = BTreeMap::new();
        let output_rows =
            generate_output_rows(&all_transactions, &[], &no_results, &patterns, &processed_at);
        let written = write_output(&args.output, &output_rows, write_mode)
            .with_context(|| format!("writing output {}", args.output.display()))?;
        info!(written, "run complete");
        return Ok(());
    }

    let window = receipt_window(&eligible, &match_config);
    let receipts = read_receipts(&args.receipts)
        .with_context(|| format!("reading receipts {}", args.receipts.display()))?;
    let receipts = filter_window(receipts, window);
    if receipts.is_empty() {
        warn!("no receipt records in the matching window, nothing to reconcile");
        return Ok(());
    }
    let shipments = group_shipments(&receipts);

    let results = match_all(&eligible, &shipments, &match_config);
    log_summary(&eligible, &results, &patterns);

    let output_rows =
        generate_output_rows(&all_transactions, &eligible, &results, &patterns, &processed_at);
    let written = write_output(&args.output, &output_rows, write_mode)
        .with_context(|| format!("writing output {}", args.output.display()))?;

    if args.mode == Mode::Production {
        let matched_rows: Vec<RowId> = results
            .iter()
            .filter(|(_, r)| r.status == MatchStatus::Matched)
            .map(|(row_id, _)| *row_id)
            .collect();
        if !matched_rows.is_empty() {
            let updated = write_processed_flags(&args.ledger, &matched_rows)
                .with_context(|| format!("flagging rows in {}", args.ledger.display()))?;
            info!(updated, "marked matched rows processed");
        }
    } else {
        info!("development mode: skipping processed flag update");
    }

    info!(written, total_rows = output_rows.len(), "run complete");
    Ok(())
}

fn log_summary(
    eligible: &[BankTransaction],
    results: &BTreeMap<RowId, MatchResult>,
    patterns: &KnownPatternTable,
) {
    let matched = results
        .values()
        .filter(|r| r.status == MatchStatus::Matched)
        .count();
    let low_confidence = results
        .values()
        .filter(|r| r.status == MatchStatus::LowConfidence)
        .count();

    let unmatched_rows: HashSet<RowId> = results
        .iter()
        .filter(|(_, r)| r.status == MatchStatus::Unmatched)
        .map(|(row_id, _)| *row_id)
        .collect();
    let mut known_pattern = 0usize;
    let mut truly_unmatched = 0usize;
    for tx in eligible {
        if unmatched_rows.contains(&tx.row_id) {
            if patterns.lookup(&tx.description).is_some() {
                known_pattern += 1;
            } else {
                truly_unmatched += 1;
            }
        }
    }

    for (row_id, result) in results {
        match result.status {
            MatchStatus::Matched => {
                info!(row = row_id.0, confidence = result.score, "matched")
            }
            MatchStatus::LowConfidence => {
                warn!(row = row_id.0, score = result.score, "low confidence")
            }
            _ => warn!(row = row_id.0, "unmatched"),
        }
    }

    info!(
        matched,
        low_confidence, known_pattern, truly_unmatched, "match results"
    );
}
