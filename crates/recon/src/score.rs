use saldo_core::MatchConfig;

/// Confidence that a transaction and a shipment describe the same
/// charge, in [0, 100]. Amounts are in cents; `tx_amount_cents` is the
/// transaction's absolute value.
///
/// Amount component: exact 50, within $1.00 30, within tolerance 20,
/// otherwise the pair is disqualified outright regardless of date.
/// Date component: 20 minus 3 per day of drift, floored at 0, plus a
/// 10-point same-day bonus. The boundary values are hand-tuned and
/// load-bearing for output parity; do not "clean them up".
pub fn confidence_score(
    tx_amount_cents: i64,
    charge_total_cents: i64,
    date_diff_days: i64,
    config: &MatchConfig,
) -> u32 {
    let amount_diff = (tx_amount_cents - charge_total_cents).abs();

    let mut score: u32 = if amount_diff == 0 {
        50
    } else if amount_diff <= 100 {
        30
    } else if amount_diff <= config.amount_tolerance_cents {
        20
    } else {
        return 0;
    };

    score += (20 - date_diff_days * 3).max(0) as u32;

    if date_diff_days == 0 {
        score += 10;
    }

    score.min(100)
}
