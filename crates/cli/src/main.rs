use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod score;

use score::{run_score, ScoreParams};

#[derive(Parser, Debug)]
#[command(name = "recon-match", version, about = "Suggest invoice / bank transaction pairings")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score every invoice against every transaction and print ranked candidates as JSON
    #[clap(name = "score")]
    Score(ScoreParams),
}

fn main() -> anyhow::Result<()> {
    // stdout carries the JSON report, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Arguments::parse();
    match args.command {
        Command::Score(params) => {
            let report = run_score(&params)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
