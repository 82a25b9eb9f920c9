//! Command line front end: read a haplotype VCF, write its GRM as CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::grm::{compute_grm, GrmSummary};
use crate::output::write_matrix;
use crate::reader::HaplotypeVcfReader;
use crate::types::{ReaderOptions, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "hapgrm",
    version,
    about = "Genomic relationship matrix from founder haplotype dosages",
    long_about = "Reads a VCF whose FORMAT column carries an HD subfield of \
                  comma-separated founder haplotype dosages and writes the \
                  sample-by-sample covariance matrix, summed over founders, \
                  as comma-separated rows."
)]
pub struct Cli {
    /// Input VCF with HD dosages
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV; standard output when omitted
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Read chunk size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Log progress every N loci, 0 to disable
    #[arg(long, value_name = "N", default_value_t = 100_000)]
    pub progress: usize,
}

impl Cli {
    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions::default().with_chunk_size(self.chunk_size)
    }
}

pub fn run_cli(cli: &Cli) -> Result<GrmSummary> {
    let mut reader = HaplotypeVcfReader::with_options(&cli.input, cli.reader_options())
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    info!(
        samples = reader.n_samples(),
        founders = reader.k_founders(),
        path = %cli.input.display(),
        "reading haplotype dosages"
    );

    let summary = compute_grm(&mut reader, cli.progress)
        .with_context(|| format!("failed to compute GRM from {}", cli.input.display()))?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_matrix(&summary.covariance, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_matrix(&summary.covariance, &mut out).context("failed to write GRM")?;
            out.flush().context("failed to flush output")?;
        }
    }
    Ok(summary)
}
