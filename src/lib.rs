pub mod buffer;
pub mod cli;
pub mod error;
pub mod grm;
pub mod line_reader;
pub mod logging;
pub mod matrix;
pub mod output;
pub(crate) mod parser;
pub mod reader;
pub mod record;
pub mod tokenizer;
pub mod types;

pub use error::{HapGrmError, Result};
pub use grm::{compute_grm, GrmAccumulator, GrmSummary};
pub use matrix::DenseMatrix;
pub use parser::{leading_f64, leading_i64};
pub use reader::{HaplotypeVcfReader, ReaderState};
pub use record::HaplotypeRecord;
pub use types::{ReaderOptions, VcfColumn};
