use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Invoice,
    Transaction,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Invoice => write!(f, "invoice"),
            RecordKind::Transaction => write!(f, "transaction"),
        }
    }
}

/// A billing record awaiting payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub amount: Money,
    pub date: NaiveDate,
    /// `None` and `Some("")` are kept distinct; neither can match a description.
    pub vendor: Option<String>,
}

/// A bank-ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub description: String,
}

impl Invoice {
    pub fn new(id: &str, amount: Money, date: NaiveDate, vendor: Option<&str>) -> Self {
        Invoice {
            id: id.to_string(),
            amount,
            date,
            vendor: vendor.map(str::to_string),
        }
    }
}

impl BankTransaction {
    pub fn new(id: &str, amount: Money, date: NaiveDate, description: &str) -> Self {
        BankTransaction {
            id: id.to_string(),
            amount,
            date,
            description: description.to_string(),
        }
    }
}

/// Whole calendar days between two dates, regardless of order.
pub fn days_apart(a: NaiveDate, b: NaiveDate) -> u64 {
    (a - b).num_days().unsigned_abs()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Could not parse {field} '{value}' on {kind} '{id}'")]
    DateParse {
        kind: RecordKind,
        id: String,
        field: &'static str,
        value: String,
    },
    #[error("Invalid {kind} '{id}': {reason}")]
    InvalidRecord {
        kind: RecordKind,
        id: String,
        reason: String,
    },
}

impl RecordError {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordError::DateParse { kind, .. } | RecordError::InvalidRecord { kind, .. } => *kind,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            RecordError::DateParse { id, .. } | RecordError::InvalidRecord { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_apart_is_symmetric() {
        assert_eq!(days_apart(date(2024, 1, 10), date(2024, 1, 20)), 10);
        assert_eq!(days_apart(date(2024, 1, 20), date(2024, 1, 10)), 10);
        assert_eq!(days_apart(date(2024, 3, 1), date(2024, 3, 1)), 0);
    }

    #[test]
    fn days_apart_crosses_leap_day() {
        assert_eq!(days_apart(date(2024, 2, 28), date(2024, 3, 1)), 2);
    }

    #[test]
    fn invoice_keeps_empty_vendor_distinct() {
        let with_empty = Invoice::new("inv-1", Money::from_cents(100), date(2024, 1, 1), Some(""));
        let without = Invoice::new("inv-1", Money::from_cents(100), date(2024, 1, 1), None);
        assert_eq!(with_empty.vendor.as_deref(), Some(""));
        assert_eq!(without.vendor, None);
    }

    #[test]
    fn record_error_identifies_record() {
        let err = RecordError::DateParse {
            kind: RecordKind::Transaction,
            id: "tx-9".to_string(),
            field: "date",
            value: "yesterday".to_string(),
        };
        assert_eq!(err.kind(), RecordKind::Transaction);
        assert_eq!(err.record_id(), "tx-9");
        assert_eq!(err.to_string(), "Could not parse date 'yesterday' on transaction 'tx-9'");
    }
}
