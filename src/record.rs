use std::borrow::Cow;

use getset::{CopyGetters, Getters};
use tracing::trace;

use crate::error::{HapGrmError, Result};
use crate::matrix::DenseMatrix;
use crate::parser::{leading_f64, leading_i64};
use crate::tokenizer::FieldSplitter;
use crate::types::{
    is_space, Delimiter, DEFAULT_FIELD_CAPACITY, HAP_CODE, HAP_DELIM, MEASUREMENT_DELIM,
    NUM_VCF_FIELDS,
};

/// Locates and splits the haplotype-dose sub-field of FORMAT and sample columns.
#[derive(Debug, Clone)]
pub(crate) struct DoseParser {
    field_parse: FieldSplitter,
    hap_parse: FieldSplitter,
}

impl DoseParser {
    pub(crate) fn new(field_capacity: usize) -> Result<Self> {
        Ok(Self {
            field_parse: FieldSplitter::with_capacity(
                Delimiter::Byte(MEASUREMENT_DELIM),
                field_capacity,
            )?,
            hap_parse: FieldSplitter::with_capacity(Delimiter::Byte(HAP_DELIM), field_capacity)?,
        })
    }

    /// Ordinal of `HD` among the `:`-separated tags of `format`.
    pub(crate) fn hap_index(&mut self, format: &[u8]) -> Result<usize> {
        self.field_parse.update_str(format);
        let mut idx = 0;
        while self.field_parse.next_field()? {
            if self.field_parse.data() == HAP_CODE {
                return Ok(idx);
            }
            idx += 1;
        }
        Err(HapGrmError::MissingHaplotypeDose {
            format: String::from_utf8_lossy(format).into_owned(),
        })
    }

    /// Walks the dose group of one sample column, handing each value to
    /// `store` with its founder index. Returns the number of values seen.
    pub(crate) fn parse_sample<F>(
        &mut self,
        sample_field: &[u8],
        sample: usize,
        hap_idx: usize,
        mut store: F,
    ) -> Result<usize>
    where
        F: FnMut(usize, f64),
    {
        self.field_parse.update_str(sample_field);
        for _ in 0..=hap_idx {
            if !self.field_parse.next_field()? {
                return Err(HapGrmError::MissingDoseSubfield { sample, hap_idx });
            }
        }

        self.hap_parse.update_str(self.field_parse.data());
        let mut founder = 0;
        while self.hap_parse.next_field()? {
            store(founder, leading_f64(self.hap_parse.data()));
            founder += 1;
        }
        Ok(founder)
    }
}

/// One data line of a haplotype-dose VCF.
///
/// A record is allocated once with the sample and founder counts of the file
/// and then overwritten by every call to [`parse_vcf_line`](Self::parse_vcf_line).
/// Dosages are stored sample-major: row `i` holds the founder dosages of
/// sample `i`.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct HaplotypeRecord {
    #[getset(get = "pub")]
    chrom: String,
    /// -1 until a line has been parsed.
    #[getset(get_copy = "pub")]
    pos: i64,
    #[getset(get = "pub")]
    id: String,
    /// First base of REF; longer alleles are truncated.
    #[getset(get_copy = "pub")]
    ref_allele: char,
    /// First base of ALT; longer alleles are truncated.
    #[getset(get_copy = "pub")]
    alt_allele: char,
    #[getset(get = "pub")]
    qual: String,
    #[getset(get = "pub")]
    filter: String,
    #[getset(get = "pub")]
    info: String,
    #[getset(get = "pub")]
    format: String,
    #[getset(get = "pub")]
    dosages: DenseMatrix,
    n_samples: usize,
    k_founders: usize,
    line_parse: FieldSplitter,
    dose_parse: DoseParser,
}

fn assign(target: &mut String, field: &[u8]) {
    target.clear();
    match String::from_utf8_lossy(field) {
        Cow::Borrowed(s) => target.push_str(s),
        Cow::Owned(s) => target.push_str(&s),
    }
}

fn first_char(field: &[u8]) -> char {
    field.first().map_or('\0', |&b| char::from(b))
}

impl HaplotypeRecord {
    pub fn new(n_samples: usize, k_founders: usize) -> Result<Self> {
        Self::with_field_capacity(n_samples, k_founders, DEFAULT_FIELD_CAPACITY)
    }

    /// Like [`new`](Self::new), with `field_capacity` bounding the length of
    /// any single column.
    pub fn with_field_capacity(
        n_samples: usize,
        k_founders: usize,
        field_capacity: usize,
    ) -> Result<Self> {
        if n_samples == 0 || k_founders == 0 {
            return Err(HapGrmError::ZeroDimension {
                what: "sample and founder count",
            });
        }
        Ok(Self {
            chrom: String::new(),
            pos: -1,
            id: String::new(),
            ref_allele: '\0',
            alt_allele: '\0',
            qual: String::new(),
            filter: String::new(),
            info: String::new(),
            format: String::new(),
            dosages: DenseMatrix::new(n_samples, k_founders)?,
            n_samples,
            k_founders,
            line_parse: FieldSplitter::with_capacity(Delimiter::Whitespace, field_capacity)?,
            dose_parse: DoseParser::new(field_capacity)?,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn k_founders(&self) -> usize {
        self.k_founders
    }

    /// `(n_samples, k_founders)`.
    pub fn dims(&self) -> (usize, usize) {
        self.dosages.dims()
    }

    /// Dosage of `founder` in `sample`.
    pub fn dosage(&self, sample: usize, founder: usize) -> Result<f64> {
        self.dosages.get(sample, founder)
    }

    /// All founder dosages of `sample`.
    pub fn sample_dosages(&self, sample: usize) -> Result<&[f64]> {
        self.dosages.row(sample)
    }

    /// Overwrites this record with the content of one VCF data line.
    ///
    /// The line must hold the nine fixed columns, a FORMAT containing `HD`, and
    /// exactly one column per sample whose `HD` group has one value per
    /// founder. On error the record is left partially updated.
    pub fn parse_vcf_line(&mut self, line: &[u8]) -> Result<()> {
        if line.first().map_or(false, |&b| is_space(b)) {
            return Err(HapGrmError::LeadingWhitespace);
        }

        self.line_parse.update_str(line);
        let mut column = 0;
        let mut sample = 0;
        let mut hap_idx = 0;

        while self.line_parse.next_field()? {
            let field = self.line_parse.data();
            match column {
                0 => assign(&mut self.chrom, field),
                1 => self.pos = leading_i64(field),
                2 => assign(&mut self.id, field),
                3 => self.ref_allele = first_char(field),
                4 => self.alt_allele = first_char(field),
                5 => assign(&mut self.qual, field),
                6 => assign(&mut self.filter, field),
                7 => assign(&mut self.info, field),
                8 => {
                    assign(&mut self.format, field);
                    hap_idx = self.dose_parse.hap_index(field)?;
                }
                _ => {
                    if sample >= self.n_samples {
                        return Err(HapGrmError::SampleCountMismatch {
                            found: sample + 1,
                            expected: self.n_samples,
                        });
                    }
                    let row = self.dosages.row_mut(sample)?;
                    let found = self.dose_parse.parse_sample(field, sample, hap_idx, |f, v| {
                        if let Some(slot) = row.get_mut(f) {
                            *slot = v;
                        }
                    })?;
                    if found != self.k_founders {
                        return Err(HapGrmError::FounderCountMismatch {
                            sample,
                            found,
                            expected: self.k_founders,
                        });
                    }
                    sample += 1;
                }
            }
            column += 1;
        }

        if column < NUM_VCF_FIELDS {
            return Err(HapGrmError::TooFewColumns {
                found: column,
                expected: NUM_VCF_FIELDS,
            });
        }
        if sample != self.n_samples {
            return Err(HapGrmError::SampleCountMismatch {
                found: sample,
                expected: self.n_samples,
            });
        }
        trace!(chrom = %self.chrom, pos = self.pos, "parsed record");
        Ok(())
    }
}
