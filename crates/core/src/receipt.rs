use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of confirmation the receipt record was parsed from.
/// Charges settle against shipments (or orders as a fallback proxy);
/// credits settle against returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptType {
    Order,
    Shipment,
    Return,
}

impl ReceiptType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiptType::Order => "order",
            ReceiptType::Shipment => "shipment",
            ReceiptType::Return => "return",
        }
    }
}

impl fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "order" => Ok(ReceiptType::Order),
            "shipment" => Ok(ReceiptType::Shipment),
            "return" => Ok(ReceiptType::Return),
            _ => Err(()),
        }
    }
}

/// One parsed line item from an order/shipment/return confirmation.
/// Several records share a `message_id` when one charge covered
/// multiple items; unparseable numeric fields are zero and an
/// unparseable date is `None` (the record then never scores).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub message_id: String,
    pub receipt_date: Option<NaiveDate>,
    pub receipt_type: Option<ReceiptType>,
    pub order_number: String,
    /// The actual bank charge for the whole shipment, in cents.
    pub charge_total_cents: i64,
    pub item_name: String,
    pub item_price_cents: i64,
    pub item_qty: i64,
    pub parse_status: String,
}

/// The group of receipt records sharing one `message_id`: a single
/// bank-charge-worthy event. All items carry the same charge total;
/// grouping takes it from the first.
#[derive(Debug, Clone)]
pub struct Shipment {
    pub message_id: String,
    pub receipt_type: Option<ReceiptType>,
    pub charge_total_cents: i64,
    pub receipt_date: Option<NaiveDate>,
    pub items: Vec<ReceiptRecord>,
}

impl Shipment {
    /// Shipments without a positive charge total cannot be candidates:
    /// there is nothing to compare the transaction amount against.
    pub fn has_charge_total(&self) -> bool {
        self.charge_total_cents > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_type_round_trip() {
        for s in ["order", "shipment", "return"] {
            let t: ReceiptType = s.parse().unwrap();
            assert_eq!(t.as_str(), s);
        }
    }

    #[test]
    fn receipt_type_is_case_insensitive() {
        assert_eq!(" Shipment ".parse::<ReceiptType>(), Ok(ReceiptType::Shipment));
    }

    #[test]
    fn receipt_type_unknown_is_err() {
        assert!("refund".parse::<ReceiptType>().is_err());
        assert!("".parse::<ReceiptType>().is_err());
    }

    #[test]
    fn shipment_charge_total_must_be_positive() {
        let mut s = Shipment {
            message_id: "m1".to_string(),
            receipt_type: Some(ReceiptType::Shipment),
            charge_total_cents: 0,
            receipt_date: None,
            items: vec![],
        };
        assert!(!s.has_charge_total());
        s.charge_total_cents = 4103;
        assert!(s.has_charge_total());
    }
}
