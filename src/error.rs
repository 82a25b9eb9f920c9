//! Error type shared by every stage of the parsing and GRM pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HapGrmError>;

#[derive(Debug, Error)]
pub enum HapGrmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file {path} is empty")]
    EmptyFile { path: String },

    #[error("buffer of capacity {capacity} is full")]
    BufferFull { capacity: usize },

    #[error("index {index} is out of range for buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{what} must be greater than zero")]
    ZeroDimension { what: &'static str },

    #[error("index ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
    MatrixOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("record begins with whitespace")]
    LeadingWhitespace,

    #[error("record has {found} columns, at least {expected} are required")]
    TooFewColumns { found: usize, expected: usize },

    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: Box<HapGrmError>,
    },

    #[error("header column {column} is `{found}`, expected `{expected}`")]
    HeaderMismatch {
        column: usize,
        found: String,
        expected: String,
    },

    #[error("haplotype counts are not specified in FORMAT `{format}`")]
    MissingHaplotypeDose { format: String },

    #[error("sample {sample} has no sub-field at position {hap_idx}")]
    MissingDoseSubfield { sample: usize, hap_idx: usize },

    #[error("sample {sample} has {found} founder dosages, expected {expected}")]
    FounderCountMismatch {
        sample: usize,
        found: usize,
        expected: usize,
    },

    #[error("found {found} samples, expected {expected}")]
    SampleCountMismatch { found: usize, expected: usize },

    #[error("file has no `#CHROM` header line, sample count is unknown")]
    MissingHeader,

    #[error("file has no data records")]
    NoDataRecords,

    #[error("at least 2 loci are required for an unbiased covariance, got {n_loci}")]
    InsufficientLoci { n_loci: usize },
}

impl HapGrmError {
    /// Stable machine-readable code, used in structured log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::EmptyFile { .. } => "EMPTY_FILE",
            Self::BufferFull { .. } => "BUFFER_FULL",
            Self::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            Self::ZeroDimension { .. } => "ZERO_DIMENSION",
            Self::MatrixOutOfBounds { .. } => "MATRIX_OUT_OF_BOUNDS",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::LeadingWhitespace => "LEADING_WHITESPACE",
            Self::TooFewColumns { .. } => "TOO_FEW_COLUMNS",
            Self::Record { source, .. } => source.code(),
            Self::HeaderMismatch { .. } => "HEADER_MISMATCH",
            Self::MissingHaplotypeDose { .. } => "MISSING_HAPLOTYPE_DOSE",
            Self::MissingDoseSubfield { .. } => "MISSING_DOSE_SUBFIELD",
            Self::FounderCountMismatch { .. } => "FOUNDER_COUNT_MISMATCH",
            Self::SampleCountMismatch { .. } => "SAMPLE_COUNT_MISMATCH",
            Self::MissingHeader => "MISSING_HEADER",
            Self::NoDataRecords => "NO_DATA_RECORDS",
            Self::InsufficientLoci { .. } => "INSUFFICIENT_LOCI",
        }
    }
}
