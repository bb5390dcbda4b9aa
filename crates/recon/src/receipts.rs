use chrono::Duration;
use saldo_core::{BankTransaction, DateRange, MatchConfig, ReceiptRecord, ReceiptType, Shipment};
use tracing::info;

/// Padding added to each side of the receipt window beyond the matching
/// window itself, so boundary receipts are never cut off by load-time
/// filtering.
const WINDOW_PAD_DAYS: i64 = 7;

/// The date range worth loading receipts for, derived from the
/// transactions being processed: `[min − (W+7), max + (W+7)]`.
/// `None` when no transaction has a parseable date.
pub fn receipt_window(
    transactions: &[BankTransaction],
    config: &MatchConfig,
) -> Option<DateRange> {
    let dates: Vec<_> = transactions.iter().filter_map(|t| t.parsed_date()).collect();
    let min = *dates.iter().min()?;
    let max = *dates.iter().max()?;
    let pad = Duration::days(config.date_window_days + WINDOW_PAD_DAYS);
    Some(DateRange::new(min - pad, max + pad))
}

/// Drop records dated outside the window. Records with no parseable
/// date are kept: they cost nothing and can never score anyway, so
/// correctness is unaffected. Windowing exists to bound memory as the
/// receipt store accumulates history.
pub fn filter_window(
    records: Vec<ReceiptRecord>,
    window: Option<DateRange>,
) -> Vec<ReceiptRecord> {
    let Some(window) = window else {
        return records;
    };
    let total = records.len();
    let kept: Vec<ReceiptRecord> = records
        .into_iter()
        .filter(|r| match r.receipt_date {
            Some(date) => window.contains(date),
            None => true,
        })
        .collect();
    if kept.len() < total {
        info!(
            skipped = total - kept.len(),
            %window,
            "skipped receipts outside date range"
        );
    }
    kept
}

/// Group records into shipments by source-message identity, preserving
/// first-seen order. Each message is one bank-charge-worthy event; all
/// its records carry the same charge total, so the first one wins.
pub fn group_shipments(records: &[ReceiptRecord]) -> Vec<Shipment> {
    let mut shipments: Vec<Shipment> = Vec::new();
    for record in records {
        if record.message_id.is_empty() {
            continue;
        }
        match shipments.iter_mut().find(|s| s.message_id == record.message_id) {
            Some(shipment) => shipment.items.push(record.clone()),
            None => shipments.push(Shipment {
                message_id: record.message_id.clone(),
                receipt_type: record.receipt_type,
                charge_total_cents: record.charge_total_cents,
                receipt_date: record.receipt_date,
                items: vec![record.clone()],
            }),
        }
    }

    log_type_breakdown(&shipments);
    shipments
}

fn log_type_breakdown(shipments: &[Shipment]) {
    let count = |t: ReceiptType| {
        shipments
            .iter()
            .filter(|s| s.receipt_type == Some(t))
            .count()
    };
    info!(
        shipments = count(ReceiptType::Shipment),
        orders = count(ReceiptType::Order),
        returns = count(ReceiptType::Return),
        total = shipments.len(),
        "grouped receipt records into shipments"
    );
}
