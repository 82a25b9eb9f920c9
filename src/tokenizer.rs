use std::borrow::Cow;

use crate::buffer::CharBuffer;
use crate::error::Result;
use crate::types::{Delimiter, DEFAULT_FIELD_CAPACITY};

/// Splits a byte string into fields one at a time.
///
/// The source is copied into storage owned by the splitter, so nested
/// splitters can be fed from each other's fields (line, then `:` sub-fields,
/// then `,` values) without borrowing across calls. Both the source storage
/// and the staging buffer are reused between lines.
#[derive(Debug, Clone)]
pub struct FieldSplitter {
    delimiter: Delimiter,
    source: Vec<u8>,
    offset: usize,
    field: CharBuffer,
}

impl FieldSplitter {
    pub fn new(delimiter: Delimiter) -> Result<Self> {
        Self::with_capacity(delimiter, DEFAULT_FIELD_CAPACITY)
    }

    /// `capacity` bounds the length of a single field (minus one terminator slot).
    pub fn with_capacity(delimiter: Delimiter, capacity: usize) -> Result<Self> {
        Ok(Self {
            delimiter,
            source: Vec::new(),
            offset: 0,
            field: CharBuffer::new(capacity)?,
        })
    }

    /// Rebinds to `s` and rewinds to its start.
    pub fn update_str(&mut self, s: &[u8]) {
        self.source.clear();
        self.source.extend_from_slice(s);
        self.offset = 0;
        self.field.reset();
    }

    /// Forgets the current source.
    pub fn reset(&mut self) {
        self.update_str(&[]);
    }

    /// Length of the current source.
    pub fn size(&self) -> usize {
        self.source.len()
    }

    /// Extracts the next field into the staging buffer.
    ///
    /// Returns `Ok(false)` once the source is used up. A field that does not
    /// fit the staging buffer is an error.
    pub fn next_field(&mut self) -> Result<bool> {
        let delimiter = self.delimiter;
        let len = self.source.len();
        if self.offset >= len {
            return Ok(false);
        }

        if delimiter.collapses() {
            self.offset = skip_run(&self.source, self.offset, delimiter);
            if self.offset >= len {
                return Ok(false);
            }
        }

        self.field.reset();
        let rest = &self.source[self.offset..];
        let end = rest
            .iter()
            .position(|&b| delimiter.matches(b))
            .unwrap_or(rest.len());
        self.field.extend_from_slice(&rest[..end])?;
        self.offset += end;

        if self.offset < len {
            // step over the delimiter ending this field
            self.offset += 1;
            if delimiter.collapses() {
                self.offset = skip_run(&self.source, self.offset, delimiter);
            }
        }
        Ok(true)
    }

    /// The most recently extracted field.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.field.data()
    }

    /// The most recently extracted field as text.
    pub fn as_str(&self) -> Cow<'_, str> {
        self.field.as_str()
    }
}

fn skip_run(source: &[u8], from: usize, delimiter: Delimiter) -> usize {
    source[from..]
        .iter()
        .position(|&b| !delimiter.matches(b))
        .map_or(source.len(), |n| from + n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HapGrmError;
    use rstest::rstest;

    fn fields(delimiter: Delimiter, s: &str) -> Vec<String> {
        let mut splitter = FieldSplitter::new(delimiter).unwrap();
        splitter.update_str(s.as_bytes());
        let mut out = Vec::new();
        while splitter.next_field().unwrap() {
            out.push(String::from_utf8(splitter.data().to_vec()).unwrap());
        }
        out
    }

    #[test]
    fn whitespace_fields_and_size() {
        let mut splitter = FieldSplitter::new(Delimiter::Whitespace).unwrap();
        splitter.update_str(b"the\tcat\n");

        assert!(splitter.next_field().unwrap());
        assert_eq!(splitter.data(), b"the");
        assert!(splitter.next_field().unwrap());
        assert_eq!(splitter.data(), b"cat");
        assert!(!splitter.next_field().unwrap());
        assert_eq!(splitter.size(), 8);

        splitter.reset();
        assert_eq!(splitter.size(), 0);
    }

    #[test]
    fn unbound_splitter_has_no_fields() {
        let mut splitter = FieldSplitter::new(Delimiter::Byte(b'\t')).unwrap();
        assert_eq!(splitter.size(), 0);
        assert!(!splitter.next_field().unwrap());
    }

    #[rstest]
    #[case("a  b", &["a", "b"])]
    #[case("  a \t\n b  ", &["a", "b"])]
    #[case("a", &["a"])]
    #[case("", &[])]
    #[case(" \t \r\n", &[])]
    fn whitespace_runs_collapse(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(fields(Delimiter::Whitespace, input), expected);
    }

    #[rstest]
    #[case("1,0,1", &["1", "0", "1"])]
    #[case("1,,1", &["1", "", "1"])]
    #[case(",1", &["", "1"])]
    #[case("1,", &["1"])]
    #[case("1", &["1"])]
    #[case("", &[])]
    fn single_byte_keeps_empty_fields(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(fields(Delimiter::Byte(b','), input), expected);
    }

    #[test]
    fn rebinding_restarts_scan() {
        let mut splitter = FieldSplitter::new(Delimiter::Byte(b':')).unwrap();
        splitter.update_str(b"GT:HD");
        assert!(splitter.next_field().unwrap());
        assert_eq!(splitter.data(), b"GT");
        splitter.update_str(b"0/1:1,1");
        assert!(splitter.next_field().unwrap());
        assert_eq!(splitter.data(), b"0/1");
        assert!(splitter.next_field().unwrap());
        assert_eq!(splitter.data(), b"1,1");
        assert!(!splitter.next_field().unwrap());
    }

    #[test]
    fn nested_splitters_feed_each_other() {
        let mut line = FieldSplitter::new(Delimiter::Whitespace).unwrap();
        let mut sub = FieldSplitter::new(Delimiter::Byte(b':')).unwrap();
        line.update_str(b"GT:HD 0/0:1,0");
        assert!(line.next_field().unwrap());
        assert!(line.next_field().unwrap());
        sub.update_str(line.data());
        assert!(sub.next_field().unwrap());
        assert!(sub.next_field().unwrap());
        assert_eq!(sub.data(), b"1,0");
    }

    #[test]
    fn oversized_field_overflows() {
        let mut splitter = FieldSplitter::with_capacity(Delimiter::Whitespace, 4).unwrap();
        splitter.update_str(b"abc abcd");
        assert!(splitter.next_field().unwrap());
        assert_eq!(splitter.data(), b"abc");
        assert!(matches!(
            splitter.next_field(),
            Err(HapGrmError::BufferFull { capacity: 4 })
        ));
    }
}
