use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::buffer::CharBuffer;
use crate::error::{HapGrmError, Result};

/// Line statistics gathered by [`LineReader::scan_lines`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct LineStats {
    /// Bytes on the longest line, newline excluded.
    pub longest: usize,
    /// Number of lines, counting a final line without newline.
    pub lines: usize,
    /// Total bytes read.
    pub bytes: u64,
}

/// Reads newline-terminated lines through a fixed-size read-ahead chunk.
///
/// `tell` reports the logical position, i.e. the offset of the next byte a
/// caller will see, not the position of the underlying reader.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    chunk: Vec<u8>,
    start: usize,
    end: usize,
    /// Stream offset of `chunk[0]`.
    base: u64,
}

impl LineReader<File> {
    /// Opens `path`, failing if it cannot be opened or has no content.
    pub fn from_path<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(HapGrmError::EmptyFile {
                path: path.display().to_string(),
            });
        }
        debug!(path = %path.display(), chunk_size, "opened input");
        Self::new(file, chunk_size)
    }
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(HapGrmError::ZeroDimension { what: "chunk size" });
        }
        Ok(Self {
            inner,
            chunk: vec![0; chunk_size],
            start: 0,
            end: 0,
            base: 0,
        })
    }

    /// Logical offset of the next byte to be returned.
    pub fn tell(&self) -> u64 {
        self.base + self.start as u64
    }

    /// Refills the chunk. Returns false at end of input.
    fn fill(&mut self) -> Result<bool> {
        self.base += self.end as u64;
        self.start = 0;
        self.end = 0;
        loop {
            match self.inner.read(&mut self.chunk) {
                Ok(n) => {
                    self.end = n;
                    return Ok(n > 0);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Returns the next byte, or `None` at end of input.
    #[inline]
    pub fn get_char(&mut self) -> Result<Option<u8>> {
        if self.start == self.end && !self.fill()? {
            return Ok(None);
        }
        let b = self.chunk[self.start];
        self.start += 1;
        Ok(Some(b))
    }

    /// Replaces the content of `line` with the next line, newline excluded.
    ///
    /// Returns the number of bytes written, or `None` at end of input. An empty
    /// line yields `Some(0)`. A line longer than `line` can hold is an error.
    pub fn get_line(&mut self, line: &mut CharBuffer) -> Result<Option<usize>> {
        line.reset();
        let mut read_any = false;
        loop {
            if self.start == self.end && !self.fill()? {
                break;
            }
            read_any = true;
            let available = &self.chunk[self.start..self.end];
            match available.iter().position(|&b| b == b'\n') {
                Some(n) => {
                    line.extend_from_slice(&available[..n])?;
                    self.start += n + 1;
                    return Ok(Some(line.len()));
                }
                None => {
                    let n = available.len();
                    line.extend_from_slice(available)?;
                    self.start += n;
                }
            }
        }
        Ok(if read_any { Some(line.len()) } else { None })
    }

    /// Consumes the rest of the input byte by byte, measuring its lines.
    pub fn scan_lines(&mut self) -> Result<LineStats> {
        let mut stats = LineStats::default();
        let mut current = 0;
        while let Some(b) = self.get_char()? {
            stats.bytes += 1;
            if b == b'\n' {
                stats.lines += 1;
                stats.longest = stats.longest.max(current);
                current = 0;
            } else {
                current += 1;
            }
        }
        if current > 0 {
            stats.lines += 1;
            stats.longest = stats.longest.max(current);
        }
        Ok(stats)
    }
}

impl<R: Read + Seek> LineReader<R> {
    /// Moves to byte `offset` and drops the buffered chunk.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        let pos = self.inner.seek(SeekFrom::Start(offset))?;
        self.base = pos;
        self.start = 0;
        self.end = 0;
        Ok(())
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek(0)
    }
}
