use chrono::{DateTime, NaiveDate, NaiveDateTime};
use recon_core::{BankTransaction, Invoice, Money, RecordError, RecordKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Invoice as received from a transport, before date parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceInput {
    pub id: String,
    pub amount: Decimal,
    pub date: String,
    #[serde(default)]
    pub vendor: Option<String>,
}

/// Bank transaction as received from a transport, before date parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub id: String,
    pub amount: Decimal,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Abort the whole batch on the first malformed record.
    #[default]
    FailFast,
    /// Skip malformed records and report them as [`Rejection`]s.
    Partial,
}

/// A record dropped from a partial batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: RecordKind,
    pub id: String,
    pub reason: String,
}

impl From<&RecordError> for Rejection {
    fn from(err: &RecordError) -> Self {
        Rejection {
            kind: err.kind(),
            id: err.record_id().to_string(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub invoices: Vec<Invoice>,
    pub transactions: Vec<BankTransaction>,
    pub rejected: Vec<Rejection>,
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-8601 date or date-time and keeps the calendar date in the
/// offset it was written in. A trailing `Z` is accepted as UTC.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    let with_offset = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(local) => format!("{local}+00:00"),
        None => s.to_string(),
    };
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_date_field(kind: RecordKind, id: &str, value: &str) -> Result<NaiveDate, RecordError> {
    parse_record_date(value).ok_or_else(|| RecordError::DateParse {
        kind,
        id: id.to_string(),
        field: "date",
        value: value.to_string(),
    })
}

pub fn normalize_invoice(input: &InvoiceInput) -> Result<Invoice, RecordError> {
    let date = parse_date_field(RecordKind::Invoice, &input.id, &input.date)?;
    Ok(Invoice {
        id: input.id.clone(),
        amount: Money::new(input.amount),
        date,
        vendor: input.vendor.clone(),
    })
}

pub fn normalize_transaction(input: &TransactionInput) -> Result<BankTransaction, RecordError> {
    let date = parse_date_field(RecordKind::Transaction, &input.id, &input.date)?;
    Ok(BankTransaction {
        id: input.id.clone(),
        amount: Money::new(input.amount),
        date,
        description: input.description.clone(),
    })
}

/// Normalizes both sides of a scoring request.
///
/// Duplicate identifiers within one kind break the uniqueness contract and
/// abort the batch in either mode.
pub fn normalize_batch(
    invoices: &[InvoiceInput],
    transactions: &[TransactionInput],
    mode: BatchMode,
) -> Result<NormalizedBatch, RecordError> {
    ensure_unique_ids(RecordKind::Invoice, invoices.iter().map(|i| i.id.as_str()))?;
    ensure_unique_ids(
        RecordKind::Transaction,
        transactions.iter().map(|t| t.id.as_str()),
    )?;

    let mut batch = NormalizedBatch::default();

    for input in invoices {
        match normalize_invoice(input) {
            Ok(invoice) => batch.invoices.push(invoice),
            Err(err) => reject(&mut batch, err, mode)?,
        }
    }
    for input in transactions {
        match normalize_transaction(input) {
            Ok(txn) => batch.transactions.push(txn),
            Err(err) => reject(&mut batch, err, mode)?,
        }
    }

    Ok(batch)
}

fn reject(
    batch: &mut NormalizedBatch,
    err: RecordError,
    mode: BatchMode,
) -> Result<(), RecordError> {
    match mode {
        BatchMode::FailFast => Err(err),
        BatchMode::Partial => {
            tracing::warn!(kind = %err.kind(), id = err.record_id(), "rejecting record: {err}");
            batch.rejected.push(Rejection::from(&err));
            Ok(())
        }
    }
}

fn ensure_unique_ids<'a>(
    kind: RecordKind,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), RecordError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RecordError::InvalidRecord {
                kind,
                id: id.to_string(),
                reason: "duplicate identifier in batch".to_string(),
            });
        }
    }
    Ok(())
}
