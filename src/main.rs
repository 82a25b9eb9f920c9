use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, field, info};

use hapgrm::cli::{run_cli, Cli};
use hapgrm::logging;
use hapgrm::HapGrmError;

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(&cli).context("hapgrm failed")?;
    info!(
        loci = summary.n_loci,
        samples = summary.covariance.rows(),
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("failed to initialise logging: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let code = err
            .downcast_ref::<HapGrmError>()
            .map(|e| field::display(e.code()));
        let message = format!("{err:#}");
        error!(error = %message, code, "command failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
