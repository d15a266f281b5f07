pub mod csv;
pub mod normalize;

pub use crate::csv::{CsvColumnMapping, CsvError, CsvImportProfile};
pub use crate::normalize::{
    normalize_batch, normalize_invoice, normalize_transaction, parse_record_date, BatchMode,
    InvoiceInput, NormalizedBatch, Rejection, TransactionInput,
};

pub mod import {
    use crate::*;

    pub fn transactions_from_csv<R: std::io::Read>(
        data: R,
        profile: &CsvImportProfile,
    ) -> Result<Vec<TransactionInput>, CsvError> {
        crate::csv::import_transactions_csv(data, profile)
    }

    pub fn invoices_from_csv<R: std::io::Read>(
        data: R,
        profile: &CsvImportProfile,
    ) -> Result<Vec<InvoiceInput>, CsvError> {
        crate::csv::import_invoices_csv(data, profile)
    }
}
