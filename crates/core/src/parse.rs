use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::money::Money;

/// Parse a ledger amount into cents. Accepts `$`, thousands commas,
/// a leading `-`, and accounting parentheses: `($41.03)` is -4103.
/// Returns `None` for garbage — callers treat that as an absent amount.
pub fn parse_amount(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s)
    };

    let cleaned = s.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let dec = Decimal::from_str(cleaned).ok()?;
    let cents = Money::from_decimal(dec)?.to_cents();
    Some(if negative { -cents } else { cents })
}

const TRANSACTION_DATE_FORMATS: &[&str] =
    &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d", "%d/%m/%Y"];

// Receipt timestamps may carry a time component; parsing to NaiveDate
// truncates it, which keeps date comparisons at midnight and avoids
// off-by-one drift from time zones.
const RECEIPT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y",
];

fn parse_with_formats(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in formats {
        if fmt.contains("%H") {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        } else if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Parse a transaction date from the ledger's textual formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_with_formats(s, TRANSACTION_DATE_FORMATS)
}

/// Parse a receipt date, with or without a time-of-day component.
pub fn parse_receipt_date(s: &str) -> Option<NaiveDate> {
    parse_with_formats(s, RECEIPT_DATE_FORMATS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("41.03"), Some(4103));
    }

    #[test]
    fn parse_amount_with_dollar_sign() {
        assert_eq!(parse_amount("$41.03"), Some(4103));
    }

    #[test]
    fn parse_amount_negative_with_symbol() {
        assert_eq!(parse_amount("-$41.03"), Some(-4103));
    }

    #[test]
    fn parse_amount_accounting_parens() {
        assert_eq!(parse_amount("($41.03)"), Some(-4103));
    }

    #[test]
    fn parse_amount_with_commas() {
        assert_eq!(parse_amount("1,234.56"), Some(123456));
    }

    #[test]
    fn parse_amount_garbage_is_none() {
        assert_eq!(parse_amount("pending"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("()"), None);
    }

    #[test]
    fn parse_date_iso() {
        assert_eq!(
            parse_date("2024-03-10"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn parse_date_us_slash() {
        assert_eq!(
            parse_date("03/10/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn parse_date_invalid_is_none() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_receipt_date_with_time_truncates_to_midnight() {
        assert_eq!(
            parse_receipt_date("2024-03-08 23:59:59"),
            NaiveDate::from_ymd_opt(2024, 3, 8)
        );
    }

    #[test]
    fn parse_receipt_date_date_only() {
        assert_eq!(
            parse_receipt_date("03/08/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 8)
        );
    }
}
