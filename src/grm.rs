//! Online genomic relationship matrix accumulation.
//!
//! For samples `i`, `j` the GRM entry is the sum over founders `f` of the
//! unbiased covariance, across loci, of the dosages `x(i, f)` and `x(j, f)`.
//! It is computed in one pass with a Welford-style update: for the `t`-th
//! locus, with `d(i, f) = x(i, f) - mean(i, f)` taken before the means move,
//!
//! ```text
//! C(i, j)    += (t - 1) / t * sum_f d(i, f) * d(j, f)
//! mean(i, f) += d(i, f) / t
//! ```
//!
//! and the covariance is `C / (m - 1)` after `m` loci.

use std::io::{Read, Seek};
use std::time::Instant;

use tracing::info;

use crate::error::{HapGrmError, Result};
use crate::matrix::DenseMatrix;
use crate::reader::HaplotypeVcfReader;
use crate::record::HaplotypeRecord;

#[derive(Debug, Clone)]
pub struct GrmAccumulator {
    n_samples: usize,
    k_founders: usize,
    n_loci: usize,
    /// `n_samples x k_founders` running means.
    means: DenseMatrix,
    /// Centered co-moments; only the upper triangle is maintained.
    comoment: DenseMatrix,
    /// Scratch space for the deviations of the current locus.
    deltas: Vec<f64>,
}

impl GrmAccumulator {
    pub fn new(n_samples: usize, k_founders: usize) -> Result<Self> {
        Ok(Self {
            n_samples,
            k_founders,
            n_loci: 0,
            means: DenseMatrix::new(n_samples, k_founders)?,
            comoment: DenseMatrix::new(n_samples, n_samples)?,
            deltas: vec![0.0; n_samples * k_founders],
        })
    }

    pub fn n_loci(&self) -> usize {
        self.n_loci
    }

    /// Mean dosage of every sample and founder over the loci seen so far.
    pub fn means(&self) -> &DenseMatrix {
        &self.means
    }

    pub fn update(&mut self, record: &HaplotypeRecord) -> Result<()> {
        self.update_dosages(record.dosages())
    }

    /// Adds one locus given as a sample-major `n_samples x k_founders` matrix.
    pub fn update_dosages(&mut self, dosages: &DenseMatrix) -> Result<()> {
        let expected = (self.n_samples, self.k_founders);
        if dosages.dims() != expected {
            return Err(HapGrmError::DimensionMismatch {
                expected,
                found: dosages.dims(),
            });
        }

        self.n_loci += 1;
        let t = self.n_loci as f64;
        let weight = (t - 1.0) / t;

        for ((delta, x), mean) in self
            .deltas
            .iter_mut()
            .zip(dosages.as_slice())
            .zip(self.means.as_slice())
        {
            *delta = x - mean;
        }

        let n = self.n_samples;
        let k = self.k_founders;
        let comoment = self.comoment.as_mut_slice();
        for (i, di) in self.deltas.chunks_exact(k).enumerate() {
            let row = &mut comoment[i * n..(i + 1) * n];
            for (j, dj) in self.deltas.chunks_exact(k).enumerate().skip(i) {
                let dot: f64 = di.iter().zip(dj).map(|(a, b)| a * b).sum();
                row[j] += weight * dot;
            }
        }

        for (mean, delta) in self.means.as_mut_slice().iter_mut().zip(&self.deltas) {
            *mean += delta / t;
        }
        Ok(())
    }

    /// The unbiased `n_samples x n_samples` covariance of the loci seen so far.
    pub fn covariance(&self) -> Result<DenseMatrix> {
        if self.n_loci < 2 {
            return Err(HapGrmError::InsufficientLoci {
                n_loci: self.n_loci,
            });
        }
        let n = self.n_samples;
        let denom = (self.n_loci - 1) as f64;
        let mut covariance = DenseMatrix::new(n, n)?;
        let upper = self.comoment.as_slice();
        let out = covariance.as_mut_slice();
        for i in 0..n {
            for j in i..n {
                let value = upper[i * n + j] / denom;
                out[i * n + j] = value;
                out[j * n + i] = value;
            }
        }
        Ok(covariance)
    }

    pub fn finish(self) -> Result<DenseMatrix> {
        let covariance = self.covariance()?;
        info!(loci = self.n_loci, samples = self.n_samples, "finished GRM");
        Ok(covariance)
    }
}

/// Result of [`compute_grm`].
#[derive(Debug, Clone)]
pub struct GrmSummary {
    pub covariance: DenseMatrix,
    pub n_loci: usize,
}

/// Streams every remaining record of `reader` into a [`GrmAccumulator`].
///
/// Emits a progress event every `progress_every` loci; 0 disables them.
pub fn compute_grm<R: Read + Seek>(
    reader: &mut HaplotypeVcfReader<R>,
    progress_every: usize,
) -> Result<GrmSummary> {
    let mut record = reader.new_record()?;
    let mut accumulator = GrmAccumulator::new(reader.n_samples(), reader.k_founders())?;
    let started = Instant::now();

    while reader.load_record(&mut record)? {
        accumulator.update(&record)?;
        let n_loci = accumulator.n_loci();
        if progress_every > 0 && n_loci % progress_every == 0 {
            info!(
                loci = n_loci,
                chrom = %record.chrom(),
                pos = record.pos(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "accumulating"
            );
        }
    }

    let n_loci = accumulator.n_loci();
    let covariance = accumulator.finish()?;
    info!(
        loci = n_loci,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "computed GRM"
    );
    Ok(GrmSummary { covariance, n_loci })
}
