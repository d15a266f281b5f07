use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use recon_core::MatchCandidate;
use recon_import::{
    import, normalize_batch, BatchMode, CsvImportProfile, InvoiceInput, Rejection,
    TransactionInput,
};
use recon_match::{EngineConfig, MatchEngine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Decide from the file extension
    Auto,
    Csv,
    Json,
}

#[derive(Debug, Args)]
pub struct ScoreParams {
    /// Invoice register (CSV export or JSON array)
    #[arg(short = 'i', long = "invoices")]
    pub invoices: PathBuf,
    /// Bank statement (CSV export or JSON array)
    #[arg(short = 't', long = "transactions")]
    pub transactions: PathBuf,
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    pub format: InputFormat,
    /// Field delimiter for CSV input [default: tab for .tsv files, comma otherwise]
    #[arg(short = 'd', long = "delimiter")]
    pub delimiter: Option<String>,
    /// TOML file overriding engine weights and thresholds
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Skip records with unparsable dates instead of failing
    #[arg(long = "partial")]
    pub partial: bool,
}

#[derive(Debug, Serialize)]
pub struct ScoreReport {
    pub candidates: Vec<MatchCandidate>,
    pub rejected: Vec<Rejection>,
}

pub fn run_score(params: &ScoreParams) -> anyhow::Result<ScoreReport> {
    let engine = match &params.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            MatchEngine::new(EngineConfig::from_toml(&content)?)
        }
        None => MatchEngine::default(),
    };

    let invoices: Vec<InvoiceInput> = read_records(&params.invoices, params.format, |r| {
        let profile = csv_profile(&params.invoices, params.delimiter.as_deref());
        import::invoices_from_csv(r, &profile)
    })?;
    let transactions: Vec<TransactionInput> =
        read_records(&params.transactions, params.format, |r| {
            let profile = csv_profile(&params.transactions, params.delimiter.as_deref());
            import::transactions_from_csv(r, &profile)
        })?;

    let mode = if params.partial {
        BatchMode::Partial
    } else {
        BatchMode::FailFast
    };
    let batch = normalize_batch(&invoices, &transactions, mode)?;
    let candidates = engine.score_matches(&batch.invoices, &batch.transactions);

    tracing::info!(
        invoices = batch.invoices.len(),
        transactions = batch.transactions.len(),
        candidates = candidates.len(),
        "scoring complete"
    );

    Ok(ScoreReport {
        candidates,
        rejected: batch.rejected,
    })
}

fn resolve_format(path: &Path, format: InputFormat) -> anyhow::Result<InputFormat> {
    if format != InputFormat::Auto {
        return Ok(format);
    }
    match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => Ok(InputFormat::Csv),
        Some("json") => Ok(InputFormat::Json),
        _ => bail!(
            "Cannot tell the format of {}; pass --format csv|json",
            path.display()
        ),
    }
}

/// An explicit `--delimiter` wins; otherwise `.tsv` files are tab separated.
fn csv_profile(path: &Path, delimiter: Option<&str>) -> CsvImportProfile {
    let delimiter = match delimiter {
        Some(d) => d.to_string(),
        None if has_extension(path, "tsv") => "\t".to_string(),
        None => ",".to_string(),
    };
    CsvImportProfile {
        delimiter,
        ..CsvImportProfile::default()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn read_records<T, F, E>(
    path: &Path,
    format: InputFormat,
    from_csv: F,
) -> anyhow::Result<Vec<T>>
where
    T: DeserializeOwned,
    F: FnOnce(BufReader<File>) -> Result<Vec<T>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let records = match resolve_format(path, format)? {
        InputFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        _ => from_csv(reader).with_context(|| format!("Invalid CSV in {}", path.display()))?,
    };
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn params(invoices: PathBuf, transactions: PathBuf) -> ScoreParams {
        ScoreParams {
            invoices,
            transactions,
            format: InputFormat::Auto,
            delimiter: None,
            config: None,
            partial: false,
        }
    }

    #[test]
    fn scores_csv_exports() {
        let dir = TempDir::new().unwrap();
        let invoices = write(
            &dir,
            "invoices.csv",
            "id,date,vendor,amount\nINV-1,2024-03-01,Acme Corp,250.00\nINV-2,2024-03-05,,99.00\n",
        );
        let txns = write(
            &dir,
            "bank.csv",
            "id,date,description,amount\nTX-1,2024-03-02,ACME CORP invoice payment,250.00\n",
        );

        let report = run_score(&params(invoices, txns)).unwrap();
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].invoice_id, "INV-1");
        assert_eq!(report.candidates[0].score, 1.0);
    }

    #[test]
    fn scores_json_arrays() {
        let dir = TempDir::new().unwrap();
        let invoices = write(
            &dir,
            "invoices.json",
            r#"[{"id":"i1","amount":100.0,"date":"2024-01-10T00:00:00Z"}]"#,
        );
        let txns = write(
            &dir,
            "bank.json",
            r#"[{"id":"t1","amount":100.0,"date":"2024-01-20","description":"misc payment"}]"#,
        );

        let report = run_score(&params(invoices, txns)).unwrap();
        assert_eq!(report.candidates[0].score, 0.7);
    }

    #[test]
    fn partial_flag_reports_bad_dates() {
        let dir = TempDir::new().unwrap();
        let invoices = write(&dir, "i.csv", "id,date,amount\nI1,2024-01-01,5\nI2,soon,5\n");
        let txns = write(&dir, "t.csv", "id,date,description,amount\nT1,2024-01-01,x,5\n");

        let mut p = params(invoices.clone(), txns.clone());
        assert!(run_score(&p).is_err());

        p.partial = true;
        let report = run_score(&p).unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].id, "I2");
        assert_eq!(report.candidates.len(), 1);
    }

    #[test]
    fn engine_config_file_is_applied() {
        let dir = TempDir::new().unwrap();
        let invoices = write(&dir, "i.csv", "id,date,amount\nI1,2024-01-01,5\n");
        let txns = write(&dir, "t.csv", "id,date,description,amount\nT1,2024-01-20,x,5\n");
        let config = write(&dir, "engine.toml", "acceptance_threshold = \"0.75\"\n");

        let mut p = params(invoices, txns);
        assert_eq!(run_score(&p).unwrap().candidates.len(), 1);
        p.config = Some(config);
        assert!(run_score(&p).unwrap().candidates.is_empty());
    }

    #[test]
    fn tsv_files_default_to_tab_delimiter() {
        let dir = TempDir::new().unwrap();
        let invoices = write(
            &dir,
            "invoices.tsv",
            "id\tdate\tvendor\tamount\nINV-1\t2024-03-01\tAcme, Inc\t1,250.00\n",
        );
        let txns = write(
            &dir,
            "bank.tsv",
            "id\tdate\tdescription\tamount\nTX-1\t2024-03-02\tACME, INC payment\t1250.00\n",
        );

        let report = run_score(&params(invoices, txns)).unwrap();
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].score, 1.0);
    }

    #[test]
    fn explicit_delimiter_overrides_tsv_default() {
        assert_eq!(csv_profile(Path::new("bank.tsv"), None).delimiter, "\t");
        assert_eq!(csv_profile(Path::new("bank.TSV"), None).delimiter, "\t");
        assert_eq!(csv_profile(Path::new("bank.csv"), None).delimiter, ",");
        assert_eq!(csv_profile(Path::new("bank.tsv"), Some(";")).delimiter, ";");
    }

    #[test]
    fn unknown_extension_needs_explicit_format() {
        let err = resolve_format(Path::new("data.bin"), InputFormat::Auto).unwrap_err();
        assert!(err.to_string().contains("--format"));
        assert_eq!(
            resolve_format(Path::new("data.bin"), InputFormat::Json).unwrap(),
            InputFormat::Json
        );
    }
}
