use anyhow::{bail, Context};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{Config, OutputFormat};
use outlay_import::OfxError;

#[derive(Parser, Debug)]
#[command(name = "outlay", version, about = "List the transactions in an OFX bank statement")]
struct Cli {
    /// Statement file exported by the bank (.ofx)
    file: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "OUTLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Output format, overrides the configuration file
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Accept SGML lines the strict repair would reject
    #[arg(long)]
    lenient: bool,
}

fn main() -> ExitCode {
    // stdout carries the transactions; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_overrides(cli.format, cli.lenient);

    tracing::info!(file = %cli.file.display(), "import requested");
    if !has_ofx_extension(&cli.file) {
        tracing::warn!("import rejected: not an OFX file");
        bail!("Error: not an OFX file.");
    }

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    tracing::info!(length = data.len(), "OFX file read");

    let import = match outlay_import::import::import_ofx_with_options(&data, config.import) {
        Ok(import) => import,
        Err(e) => {
            tracing::error!(stage = ?e.stage(), "OFX parsing failed: {e}");
            return Err(e.into());
        }
    };

    tracing::info!(
        transactions = import.transactions.len(),
        sections = import.sections,
        fallbacks = import.diagnostics.fallbacks.len(),
        dropped = import.diagnostics.dropped.len(),
        "OFX parsing succeeded"
    );
    for dropped in &import.diagnostics.dropped {
        tracing::warn!(
            section = dropped.section,
            index = dropped.index,
            fit_id = ?dropped.fit_id,
            "transaction skipped: {}",
            dropped.reason
        );
    }

    let mut stdout = io::stdout().lock();
    render::write_transactions(&mut stdout, &import.transactions, config.output.format)
}

/// Import failures are shown exactly as the parser words them; the cause
/// chain is only spelled out for the binary's own errors.
fn error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<OfxError>() {
        Some(ofx) => ofx.to_string(),
        None => format!("{e:#}"),
    }
}

fn has_ofx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ofx"))
}
