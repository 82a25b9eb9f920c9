use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use multimap::MultiMap;
use strum::{AsRefStr, Display, EnumIter};

/// FORMAT tag naming the haplotype-dose sub-field.
pub(crate) const HAP_CODE: &[u8] = b"HD";
pub(crate) const META_PREFIX: u8 = b'#';
pub(crate) const MEASUREMENT_DELIM: u8 = b':';
pub(crate) const HAP_DELIM: u8 = b',';

/// Number of fixed columns preceding the sample columns.
pub const NUM_VCF_FIELDS: usize = 9;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
pub const DEFAULT_FIELD_CAPACITY: usize = 16 * 1024;
pub const DEFAULT_LINE_SLACK: f64 = 1.1;

/// The mandatory VCF columns, in file order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Display, AsRefStr)]
pub enum VcfColumn {
    #[strum(serialize = "#CHROM")]
    Chrom,
    #[strum(serialize = "POS")]
    Pos,
    #[strum(serialize = "ID")]
    Id,
    #[strum(serialize = "REF")]
    Ref,
    #[strum(serialize = "ALT")]
    Alt,
    #[strum(serialize = "QUAL")]
    Qual,
    #[strum(serialize = "FILTER")]
    Filter,
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "FORMAT")]
    Format,
}

/// How a [`FieldSplitter`](crate::tokenizer::FieldSplitter) finds field boundaries.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Delimiter {
    /// A single literal byte. Adjacent delimiters enclose an empty field.
    Byte(u8),
    /// Any run of space, tab, newline, vertical tab, form feed or carriage
    /// return. Runs collapse into a single boundary.
    Whitespace,
}

impl Delimiter {
    #[inline]
    pub fn matches(self, b: u8) -> bool {
        match self {
            Delimiter::Byte(d) => b == d,
            Delimiter::Whitespace => is_space(b),
        }
    }

    #[inline]
    pub fn collapses(self) -> bool {
        matches!(self, Delimiter::Whitespace)
    }
}

/// C `isspace` in the "C" locale.
#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Meta lines and sample names read from the top of the file.
#[derive(Debug, Clone, Default, Getters)]
#[getset(get = "pub")]
pub struct Header {
    /// `##key=value` lines; a bare `##key` maps to an empty value.
    pub(crate) meta: MultiMap<String, String>,
    /// Sample name to zero-based sample index.
    pub(crate) samples: IndexMap<String, usize>,
}

impl Header {
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }
}

/// Buffer sizing for [`HaplotypeVcfReader`](crate::reader::HaplotypeVcfReader).
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ReaderOptions {
    /// Size of the read-ahead chunk of the line reader.
    chunk_size: usize,
    /// Capacity of the staging buffer of each tokenizer, i.e. the longest field.
    field_capacity: usize,
    /// The line buffer holds the longest line of the file times this factor.
    line_slack: f64,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            field_capacity: DEFAULT_FIELD_CAPACITY,
            line_slack: DEFAULT_LINE_SLACK,
        }
    }
}

impl ReaderOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_field_capacity(mut self, field_capacity: usize) -> Self {
        self.field_capacity = field_capacity;
        self
    }

    pub fn with_line_slack(mut self, line_slack: f64) -> Self {
        self.line_slack = line_slack;
        self
    }

    /// Line buffer capacity for a file whose longest line has `longest` bytes,
    /// with room for the terminator slot.
    pub(crate) fn line_capacity(&self, longest: usize) -> usize {
        let slack = self.line_slack.max(1.0);
        (longest as f64 * slack).ceil() as usize + 2
    }
}
