use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

use crate::normalize::{InvoiceInput, TransactionInput};

/// Column indices for a CSV export. A mapping with no columns set is resolved
/// from the header row by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvColumnMapping {
    pub id_column: Option<usize>,
    pub date_column: Option<usize>,
    pub amount_column: Option<usize>,
    pub debit_column: Option<usize>,
    pub credit_column: Option<usize>,
    pub description_column: Option<usize>,
    pub vendor_column: Option<usize>,
}

impl CsvColumnMapping {
    fn is_unset(&self) -> bool {
        *self == CsvColumnMapping::default()
    }

    /// Matches header names case-insensitively, e.g. `Date`, `Amount`,
    /// `Description`, `Vendor`, `Debit`, `Credit`, `Id`.
    pub fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut mapping = CsvColumnMapping::default();
        for (idx, name) in headers.iter().enumerate() {
            let slot = match name.trim().to_lowercase().as_str() {
                "id" | "reference" | "ref" => &mut mapping.id_column,
                "date" | "posted" | "posting date" | "invoice date" => &mut mapping.date_column,
                "amount" | "total" => &mut mapping.amount_column,
                "debit" => &mut mapping.debit_column,
                "credit" => &mut mapping.credit_column,
                "description" | "memo" | "details" => &mut mapping.description_column,
                "vendor" | "payee" | "supplier" => &mut mapping.vendor_column,
                _ => continue,
            };
            slot.get_or_insert(idx);
        }
        mapping
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvImportProfile {
    pub name: String,
    pub mapping: CsvColumnMapping,
    pub has_header: bool,
    pub delimiter: String,
}

impl Default for CsvImportProfile {
    fn default() -> Self {
        Self {
            name: "Unnamed Profile".to_string(),
            mapping: CsvColumnMapping::default(),
            has_header: true,
            delimiter: ",".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid amount '{value}' on row {row}")]
    InvalidAmount { row: usize, value: String },
    #[error("No data rows")]
    NoDataRows,
}

/// A data row with the fields every record kind needs.
struct CommonFields {
    id: String,
    date: String,
    amount: Decimal,
}

struct CsvRows {
    mapping: CsvColumnMapping,
    records: Vec<csv::StringRecord>,
}

fn read_rows<R: Read>(data: R, profile: &CsvImportProfile) -> Result<CsvRows, CsvError> {
    let delimiter = profile
        .delimiter
        .as_bytes()
        .first()
        .copied()
        .unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(profile.has_header)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let mapping = if profile.mapping.is_unset() && profile.has_header {
        CsvColumnMapping::from_headers(reader.headers()?)
    } else {
        profile.mapping.clone()
    };

    let records = reader
        .records()
        .filter(|r| r.as_ref().map_or(true, |rec| !is_blank(rec)))
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(CsvError::NoDataRows);
    }
    Ok(CsvRows { mapping, records })
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

fn field(record: &csv::StringRecord, col: Option<usize>) -> Option<&str> {
    col.and_then(|c| record.get(c)).map(str::trim)
}

fn common_fields(
    mapping: &CsvColumnMapping,
    record: &csv::StringRecord,
    row: usize,
) -> Result<CommonFields, CsvError> {
    let date_col = mapping
        .date_column
        .ok_or_else(|| CsvError::MissingColumn("date".to_string()))?;
    let date = field(record, Some(date_col)).unwrap_or_default().to_string();

    let amount = if let Some(col) = mapping.amount_column {
        parse_amount(field(record, Some(col)).unwrap_or_default(), row)?
    } else if let (Some(d_col), Some(c_col)) = (mapping.debit_column, mapping.credit_column) {
        let d = field(record, Some(d_col))
            .filter(|s| !s.is_empty())
            .map(|s| parse_amount(s, row))
            .transpose()?;
        let c = field(record, Some(c_col))
            .filter(|s| !s.is_empty())
            .map(|s| parse_amount(s, row))
            .transpose()?;
        match (d, c) {
            (Some(d), None) => d,
            (None, Some(c)) => -c,
            (Some(d), Some(c)) => d - c,
            (None, None) => Decimal::ZERO,
        }
    } else {
        return Err(CsvError::MissingColumn("amount".to_string()));
    };

    let id = field(record, mapping.id_column)
        .filter(|s| !s.is_empty())
        .map_or_else(|| format!("row-{row}"), str::to_string);

    Ok(CommonFields { id, date, amount })
}

/// Accepts `$`, thousands separators and accounting-style `(1.00)` negatives.
fn parse_amount(s: &str, row: usize) -> Result<Decimal, CsvError> {
    let s = s.trim();
    let (negative, inner) = if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned = inner.replace([',', '$', ' '], "");
    let dec = Decimal::from_str(&cleaned).map_err(|_| CsvError::InvalidAmount {
        row,
        value: s.to_string(),
    })?;
    Ok(if negative { -dec } else { dec })
}

/// Reads a bank-statement export into wire-format transactions.
///
/// Rows are numbered from 1 (excluding the header) for generated ids and
/// error messages.
pub fn import_transactions_csv<R: Read>(
    data: R,
    profile: &CsvImportProfile,
) -> Result<Vec<TransactionInput>, CsvError> {
    let CsvRows { mapping, records } = read_rows(data, profile)?;
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let common = common_fields(&mapping, record, idx + 1)?;
            Ok(TransactionInput {
                id: common.id,
                amount: common.amount,
                date: common.date,
                description: field(record, mapping.description_column)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

/// Reads an invoice register export. An empty vendor cell becomes `None`.
pub fn import_invoices_csv<R: Read>(
    data: R,
    profile: &CsvImportProfile,
) -> Result<Vec<InvoiceInput>, CsvError> {
    let CsvRows { mapping, records } = read_rows(data, profile)?;
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let common = common_fields(&mapping, record, idx + 1)?;
            Ok(InvoiceInput {
                id: common.id,
                amount: common.amount,
                date: common.date,
                vendor: field(record, mapping.vendor_column)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("123.45", 1).unwrap(), dec("123.45"));
    }

    #[test]
    fn parse_amount_with_dollar_sign_and_commas() {
        assert_eq!(parse_amount("$1,234.56", 1).unwrap(), dec("1234.56"));
    }

    #[test]
    fn parse_amount_accounting_parens() {
        assert_eq!(parse_amount("(75.25)", 1).unwrap(), dec("-75.25"));
    }

    #[test]
    fn parse_amount_keeps_extra_precision() {
        assert_eq!(parse_amount("10.005", 1).unwrap(), dec("10.005"));
    }

    #[test]
    fn parse_amount_invalid_reports_row() {
        let err = parse_amount("not_a_number", 4).unwrap_err();
        assert!(matches!(err, CsvError::InvalidAmount { row: 4, .. }));
        assert!(parse_amount("", 1).is_err());
    }

    // ── header detection ──────────────────────────────────────────────────────

    #[test]
    fn from_headers_maps_known_names() {
        let headers = csv::StringRecord::from(vec!["Ref", "Posting Date", "Details", "Amount"]);
        let m = CsvColumnMapping::from_headers(&headers);
        assert_eq!(m.id_column, Some(0));
        assert_eq!(m.date_column, Some(1));
        assert_eq!(m.description_column, Some(2));
        assert_eq!(m.amount_column, Some(3));
        assert_eq!(m.vendor_column, None);
    }

    // ── full imports ──────────────────────────────────────────────────────────

    #[test]
    fn import_transactions_from_headers() {
        let data = b"id,date,description,amount\ntx-1,2024-01-15,AMAZON,49.99\n,2024-01-16,STARBUCKS,-5.00\n";
        let txs = import_transactions_csv(data.as_ref(), &CsvImportProfile::default()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].id, "tx-1");
        assert_eq!(txs[0].amount, dec("49.99"));
        assert_eq!(txs[0].date, "2024-01-15");
        assert_eq!(txs[1].id, "row-2");
        assert_eq!(txs[1].description, "STARBUCKS");
    }

    #[test]
    fn import_transactions_debit_credit_columns() {
        let data =
            b"date;description;debit;credit\n2024-01-15;PAYMENT;;100.00\n2024-01-16;CHARGE;50.00;\n";
        let profile = CsvImportProfile {
            delimiter: ";".to_string(),
            ..CsvImportProfile::default()
        };
        let txs = import_transactions_csv(data.as_ref(), &profile).unwrap();
        assert_eq!(txs[0].amount, dec("-100.00"));
        assert_eq!(txs[1].amount, dec("50.00"));
    }

    #[test]
    fn import_with_explicit_mapping_and_no_header() {
        let data = b"2024-03-01,Acme Corp,250.00,INV-1\n";
        let profile = CsvImportProfile {
            has_header: false,
            mapping: CsvColumnMapping {
                id_column: Some(3),
                date_column: Some(0),
                vendor_column: Some(1),
                amount_column: Some(2),
                ..CsvColumnMapping::default()
            },
            ..CsvImportProfile::default()
        };
        let invoices = import_invoices_csv(data.as_ref(), &profile).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].id, "INV-1");
        assert_eq!(invoices[0].vendor.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn import_invoices_empty_vendor_is_none() {
        let data = b"id,date,vendor,amount\nINV-1,2024-03-01,,10.00\n";
        let invoices = import_invoices_csv(data.as_ref(), &CsvImportProfile::default()).unwrap();
        assert_eq!(invoices[0].vendor, None);
    }

    #[test]
    fn import_missing_amount_column_errors() {
        let data = b"date,description\n2024-01-15,AMAZON\n";
        let result = import_transactions_csv(data.as_ref(), &CsvImportProfile::default());
        assert!(matches!(result, Err(CsvError::MissingColumn(c)) if c == "amount"));
    }

    #[test]
    fn import_skips_blank_lines_and_errors_when_empty() {
        let data = b"date,description,amount\n";
        let result = import_transactions_csv(data.as_ref(), &CsvImportProfile::default());
        assert!(matches!(result, Err(CsvError::NoDataRows)));
    }

    #[test]
    fn dates_are_passed_through_unparsed() {
        let data = b"date,description,amount\nnot a date,X,1.00\n";
        let txs = import_transactions_csv(data.as_ref(), &CsvImportProfile::default()).unwrap();
        assert_eq!(txs[0].date, "not a date");
    }
}
