use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::buffer::CharBuffer;
use crate::error::{HapGrmError, Result};
use crate::line_reader::LineReader;
use crate::parser::{is_meta_line, meta_entry};
use crate::record::{DoseParser, HaplotypeRecord};
use crate::tokenizer::FieldSplitter;
use crate::types::{Delimiter, Header, ReaderOptions, VcfColumn, META_PREFIX, NUM_VCF_FIELDS};

/// Where a [`HaplotypeVcfReader`] is in the file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReaderState {
    Unopened,
    /// `##` lines have been consumed.
    MetaSkipped,
    /// Sample and founder counts are known.
    HeaderParsed,
    Streaming,
    Exhausted,
}

/// Streams [`HaplotypeRecord`]s out of a haplotype-dose VCF.
///
/// Opening the reader scans the whole input once to size the line buffer,
/// then reads the meta lines and header, and peeks at the first data line to
/// learn the number of founders. After that, every call to
/// [`load_record`](Self::load_record) parses one line into a caller-owned
/// record.
///
/// Without a `#CHROM` header line the sample and founder counts stay 0 and the
/// caller has to supply a correctly sized record itself.
#[derive(Debug)]
pub struct HaplotypeVcfReader<R = File> {
    reader: LineReader<R>,
    line: CharBuffer,
    header: Header,
    n_samples: usize,
    k_founders: usize,
    first_record_offset: u64,
    /// Line number of the last line read, starting at 1.
    line_number: usize,
    first_record_line: usize,
    state: ReaderState,
    options: ReaderOptions,
}

impl HaplotypeVcfReader<File> {
    /// # Examples
    ///
    /// ```
    /// use hapgrm::{HaplotypeVcfReader, ReaderState};
    ///
    /// let mut reader = HaplotypeVcfReader::from_path("resources/test.vcf").unwrap();
    /// let mut record = reader.new_record().unwrap();
    /// let mut n = 0;
    /// while reader.load_record(&mut record).unwrap() {
    ///     n += 1;
    /// }
    /// assert_eq!(n, 6);
    /// assert_eq!(reader.state(), ReaderState::Exhausted);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options(path, ReaderOptions::default())
    }

    pub fn with_options<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        let reader = LineReader::from_path(path, options.chunk_size())?;
        Self::new(reader, options)
    }
}

impl<R: Read + Seek> HaplotypeVcfReader<R> {
    pub fn from_reader(inner: R, options: ReaderOptions) -> Result<Self> {
        Self::new(LineReader::new(inner, options.chunk_size())?, options)
    }

    pub fn new(mut reader: LineReader<R>, options: ReaderOptions) -> Result<Self> {
        reader.rewind()?;
        let stats = reader.scan_lines()?;
        if stats.bytes == 0 {
            return Err(HapGrmError::EmptyFile {
                path: "<stream>".to_owned(),
            });
        }
        reader.rewind()?;
        let capacity = options.line_capacity(stats.longest);
        debug!(
            lines = stats.lines,
            longest = stats.longest,
            capacity,
            "sized line buffer"
        );

        let mut this = Self {
            reader,
            line: CharBuffer::new(capacity)?,
            header: Header::default(),
            n_samples: 0,
            k_founders: 0,
            first_record_offset: 0,
            line_number: 0,
            first_record_line: 0,
            state: ReaderState::Unopened,
            options,
        };
        let has_header = this.read_header()?;
        this.first_record_line = this.line_number;
        if has_header {
            this.discover_founders()?;
        }
        this.reader.seek(this.first_record_offset)?;
        this.state = ReaderState::HeaderParsed;
        debug!(
            samples = this.n_samples,
            founders = this.k_founders,
            has_header,
            "parsed header"
        );
        Ok(this)
    }

    /// Consumes `##` lines and the `#CHROM` line. Returns whether a header
    /// line was present.
    fn read_header(&mut self) -> Result<bool> {
        loop {
            let offset = self.reader.tell();
            if self.reader.get_line(&mut self.line)?.is_none() {
                self.first_record_offset = offset;
                self.state = ReaderState::MetaSkipped;
                return Ok(false);
            }
            self.line_number += 1;

            let line = self.line.data();
            if is_meta_line(line) {
                if let Some((key, value)) = meta_entry(line) {
                    self.header.meta.insert(key, value);
                }
                continue;
            }

            self.state = ReaderState::MetaSkipped;
            if line.first() == Some(&META_PREFIX) {
                self.parse_header_line()?;
                self.first_record_offset = self.reader.tell();
                return Ok(true);
            }
            // a data line; leave it for load_record
            self.line_number -= 1;
            self.first_record_offset = offset;
            return Ok(false);
        }
    }

    fn parse_header_line(&mut self) -> Result<()> {
        let mut columns =
            FieldSplitter::with_capacity(Delimiter::Whitespace, self.options.field_capacity())?;
        columns.update_str(self.line.data());

        let mut expected = VcfColumn::iter();
        let mut column = 0;
        while columns.next_field()? {
            let name = columns.as_str();
            match expected.next() {
                Some(fixed) if name == fixed.as_ref() => {}
                Some(fixed) => {
                    return Err(HapGrmError::HeaderMismatch {
                        column,
                        found: name.into_owned(),
                        expected: fixed.to_string(),
                    })
                }
                None => {
                    let sample = self.header.samples.len();
                    self.header
                        .samples
                        .insert(name.into_owned(), sample);
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
        // duplicate sample names collapse in the map but still count as columns
        self.n_samples = column - NUM_VCF_FIELDS;
        Ok(())
    }

    /// Counts the dose values of the first sample on the first data line.
    fn discover_founders(&mut self) -> Result<()> {
        loop {
            match self.reader.get_line(&mut self.line)? {
                None => return Err(HapGrmError::NoDataRecords),
                Some(0) => continue,
                Some(_) => break,
            }
        }
        let mut columns =
            FieldSplitter::with_capacity(Delimiter::Whitespace, self.options.field_capacity())?;
        let mut doses = DoseParser::new(self.options.field_capacity())?;
        columns.update_str(self.line.data());

        let mut column = 0;
        let mut hap_idx = 0;
        while columns.next_field()? {
            if column == NUM_VCF_FIELDS - 1 {
                hap_idx = doses.hap_index(columns.data())?;
            } else if column == NUM_VCF_FIELDS {
                self.k_founders = doses.parse_sample(columns.data(), 0, hap_idx, |_, _| ())?;
                if self.k_founders == 0 {
                    return Err(HapGrmError::ZeroDimension {
                        what: "founder count",
                    });
                }
                return Ok(());
            }
            column += 1;
        }
        Err(HapGrmError::TooFewColumns {
            found: column,
            expected: NUM_VCF_FIELDS + 1,
        })
    }

    /// Reads the next data line into `record`.
    ///
    /// Returns `Ok(false)` at end of input, and on every call after that.
    /// Blank lines are skipped. Parse errors carry the line number.
    pub fn load_record(&mut self, record: &mut HaplotypeRecord) -> Result<bool> {
        if self.state == ReaderState::Exhausted {
            return Ok(false);
        }
        if self.n_samples > 0 && record.dims() != (self.n_samples, self.k_founders) {
            return Err(HapGrmError::DimensionMismatch {
                expected: (self.n_samples, self.k_founders),
                found: record.dims(),
            });
        }

        loop {
            match self.reader.get_line(&mut self.line) {
                Ok(None) => {
                    self.state = ReaderState::Exhausted;
                    debug!(lines = self.line_number, "reached end of input");
                    return Ok(false);
                }
                Ok(Some(0)) => self.line_number += 1,
                Ok(Some(_)) => {
                    self.line_number += 1;
                    break;
                }
                Err(source) => return Err(self.at_line(source)),
            }
        }
        self.state = ReaderState::Streaming;
        let line_number = self.line_number;
        record
            .parse_vcf_line(self.line.data())
            .map_err(|source| HapGrmError::Record {
                line: line_number,
                source: Box::new(source),
            })?;
        Ok(true)
    }

    fn at_line(&self, source: HapGrmError) -> HapGrmError {
        match source {
            HapGrmError::Io(_) => source,
            source => HapGrmError::Record {
                line: self.line_number + 1,
                source: Box::new(source),
            },
        }
    }

    /// A record sized for this file.
    pub fn new_record(&self) -> Result<HaplotypeRecord> {
        if self.n_samples == 0 {
            return Err(HapGrmError::MissingHeader);
        }
        HaplotypeRecord::with_field_capacity(
            self.n_samples,
            self.k_founders,
            self.options.field_capacity(),
        )
    }

    /// Returns to the first data line.
    pub fn rewind_records(&mut self) -> Result<()> {
        self.reader.seek(self.first_record_offset)?;
        self.line_number = self.first_record_line;
        self.state = ReaderState::HeaderParsed;
        Ok(())
    }
}

impl<R> HaplotypeVcfReader<R> {
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn k_founders(&self) -> usize {
        self.k_founders
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Capacity of the line buffer chosen at open time.
    pub fn line_capacity(&self) -> usize {
        self.line.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const VCF: &str = "##fileformat=VCFv4.2\n\
##FORMAT=<ID=HD,Number=.,Type=Float>\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\tS3\tS4\n\
chr12\t1\t.\tA\tT\tQ1\tF1\tINFO1\tGT:AB:HD\t0/0:2:1,0,1\t0/0:1:0,2,0\t1/0:0:0,0,2\t1/1:1:2,0,0\n\
chr12\t2\t.\tG\tT\tQ2\tF2\tINFO2\tGT:AB:HD\t0/0:2:1,0,1\t0/1:1:0,2,0\t1/0:0:0,0,2\t0/1:1:0,0,2\n";

    fn open(content: &str) -> Result<HaplotypeVcfReader<Cursor<Vec<u8>>>> {
        HaplotypeVcfReader::from_reader(
            Cursor::new(content.as_bytes().to_vec()),
            ReaderOptions::default().with_chunk_size(7),
        )
    }

    #[test]
    fn header_discovery() {
        let reader = open(VCF).unwrap();
        assert_eq!(reader.n_samples(), 4);
        assert_eq!(reader.k_founders(), 3);
        assert_eq!(reader.state(), ReaderState::HeaderParsed);
        assert_eq!(
            reader.header().sample_names().collect::<Vec<_>>(),
            vec!["S1", "S2", "S3", "S4"]
        );
        assert_eq!(
            reader.header().meta().get("fileformat").map(String::as_str),
            Some("VCFv4.2")
        );
        assert!(reader.line_capacity() > 80);
    }

    #[test]
    fn records_stream_then_exhaust() {
        let mut reader = open(VCF).unwrap();
        let mut record = reader.new_record().unwrap();

        assert!(reader.load_record(&mut record).unwrap());
        assert_eq!(reader.state(), ReaderState::Streaming);
        assert_eq!(record.pos(), 1);
        assert_eq!(record.sample_dosages(3).unwrap(), &[2.0, 0.0, 0.0]);

        assert!(reader.load_record(&mut record).unwrap());
        assert_eq!(record.pos(), 2);
        assert_eq!(record.sample_dosages(3).unwrap(), &[0.0, 0.0, 2.0]);

        assert!(!reader.load_record(&mut record).unwrap());
        assert_eq!(reader.state(), ReaderState::Exhausted);
        assert!(!reader.load_record(&mut record).unwrap());
    }

    #[test]
    fn rewind_restarts_at_first_record() {
        let mut reader = open(VCF).unwrap();
        let mut record = reader.new_record().unwrap();
        while reader.load_record(&mut record).unwrap() {}
        reader.rewind_records().unwrap();
        assert!(reader.load_record(&mut record).unwrap());
        assert_eq!(record.pos(), 1);
    }

    #[test]
    fn wrongly_sized_record_is_rejected() {
        let mut reader = open(VCF).unwrap();
        let mut record = HaplotypeRecord::new(4, 2).unwrap();
        assert!(matches!(
            reader.load_record(&mut record),
            Err(HapGrmError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn header_must_name_fixed_columns() {
        let content = VCF.replace("\tQUAL\t", "\tQUALITY\t");
        match open(&content) {
            Err(HapGrmError::HeaderMismatch {
                column,
                found,
                expected,
            }) => {
                assert_eq!(column, 5);
                assert_eq!(found, "QUALITY");
                assert_eq!(expected, "QUAL");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_hd_in_first_record_is_rejected() {
        let content = VCF.replacen("GT:AB:HD", "GT:AB:DS", 1);
        assert!(matches!(
            open(&content),
            Err(HapGrmError::MissingHaplotypeDose { .. })
        ));
    }

    #[test]
    fn bad_later_record_reports_line() {
        let content = format!("{}chr12\t3\t.\tA\tT\t.\t.\t.\tGT:HD\t0/0:1,1\t0/0:1,1,0\t0/0:1,1,0\t0/0:1,1,0\n", VCF);
        let mut reader = open(&content).unwrap();
        let mut record = reader.new_record().unwrap();
        assert!(reader.load_record(&mut record).unwrap());
        assert!(reader.load_record(&mut record).unwrap());
        match reader.load_record(&mut record) {
            Err(HapGrmError::Record { line, source }) => {
                assert_eq!(line, 6);
                assert!(matches!(
                    *source,
                    HapGrmError::FounderCountMismatch { sample: 0, found: 2, expected: 3 }
                ));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let content = VCF.replacen("\nchr12\t2", "\n\n\nchr12\t2", 1);
        let mut reader = open(&content).unwrap();
        let mut record = reader.new_record().unwrap();
        let mut positions = Vec::new();
        while reader.load_record(&mut record).unwrap() {
            positions.push(record.pos());
        }
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn headerless_file_leaves_counts_unset() {
        let content = "##fileformat=VCFv4.2\n\
chr12 1 . A T Q1 F1 INFO1 GT:AB:HD 0/0:2:1,0,1 0/0:1:0,2,0 1/0:0:0,0,2 1/1:1:2,0,0\n";
        let mut reader = open(content).unwrap();
        assert_eq!(reader.n_samples(), 0);
        assert_eq!(reader.k_founders(), 0);
        assert!(matches!(reader.new_record(), Err(HapGrmError::MissingHeader)));

        let mut record = HaplotypeRecord::new(4, 3).unwrap();
        assert!(reader.load_record(&mut record).unwrap());
        assert_eq!(record.chrom(), "chr12");
        assert!(!reader.load_record(&mut record).unwrap());
    }

    #[test]
    fn header_without_records_is_rejected() {
        let content = "#CHROM POS ID REF ALT QUAL FILTER INFO FORMAT S1\n";
        assert!(matches!(open(content), Err(HapGrmError::NoDataRecords)));
        let blank_tail = "#CHROM POS ID REF ALT QUAL FILTER INFO FORMAT S1\n\n\n";
        assert!(matches!(open(blank_tail), Err(HapGrmError::NoDataRecords)));
    }

    #[test]
    fn blank_lines_before_first_record() {
        let content = VCF.replacen("S4\n", "S4\n\n\n", 1);
        let mut reader = open(&content).unwrap();
        assert_eq!(reader.k_founders(), 3);
        let mut record = reader.new_record().unwrap();
        assert!(reader.load_record(&mut record).unwrap());
        assert_eq!(record.pos(), 1);
        assert_eq!(record.sample_dosages(3).unwrap(), &[2.0, 0.0, 0.0]);
        assert!(reader.load_record(&mut record).unwrap());
        assert!(!reader.load_record(&mut record).unwrap());

        reader.rewind_records().unwrap();
        assert!(reader.load_record(&mut record).unwrap());
        assert_eq!(record.pos(), 1);
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert!(matches!(open(""), Err(HapGrmError::EmptyFile { .. })));
    }
}
