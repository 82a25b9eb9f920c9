use std::borrow::Cow;

use crate::error::{HapGrmError, Result};

/// A fixed-capacity byte buffer that fails instead of growing.
///
/// One slot of the capacity is kept for a terminator, so a buffer of
/// capacity `n` holds at most `n - 1` bytes.
#[derive(Debug, Clone)]
pub struct CharBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl CharBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HapGrmError::ZeroDimension {
                what: "buffer capacity",
            });
        }
        Ok(Self {
            data: Vec::with_capacity(capacity),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn append(&mut self, b: u8) -> Result<()> {
        if self.data.len() + 1 >= self.capacity {
            return Err(HapGrmError::BufferFull {
                capacity: self.capacity,
            });
        }
        self.data.push(b);
        Ok(())
    }

    /// Appends all of `bytes`, or nothing if they do not fit.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if self.data.len() + bytes.len() >= self.capacity {
            return Err(HapGrmError::BufferFull {
                capacity: self.capacity,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Clears the buffer and changes its capacity.
    pub fn reset_with_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(HapGrmError::ZeroDimension {
                what: "buffer capacity",
            });
        }
        self.data.clear();
        self.data.reserve(capacity);
        self.capacity = capacity;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<u8> {
        self.data
            .get(index)
            .copied()
            .ok_or(HapGrmError::IndexOutOfRange {
                index,
                len: self.data.len(),
            })
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The content as text; invalid UTF-8 is replaced.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}
