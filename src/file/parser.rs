//! Low-level byte stream parser for QVD symbol decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor over a byte slice
//! which only ever moves forward. Every read is bounds-checked against the slice the parser was
//! created with, so handing the parser exactly one field's symbol range makes any read past that
//! range an error instead of a silent bleed into the next field.
//!
//! # Usage Examples
//!
//! ```rust
//! use qvdscope::Parser;
//!
//! let data = [0x04, b'H', b'i', 0x00];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_le::<u8>()?, 0x04);
//! assert_eq!(parser.read_cstring_latin1()?, "Hi");
//! assert!(!parser.has_more_data());
//! # Ok::<(), qvdscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, QvdIO},
    Result,
};

/// A forward-only, bounds-checked cursor over a byte slice.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` over the provided data
    ///
    /// # Arguments
    /// * `data` - The buffer to parse
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if the cursor has not yet reached the end of the buffer
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Current cursor position
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes between the cursor and the end of the buffer
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Read a primitive in little-endian byte order and advance past it
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough bytes remain
    pub fn read_le<T: QvdIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a NUL-terminated byte string, mapping every byte to the code point of the same value
    ///
    /// The terminator is consumed but not included. The text encoding of QVD strings is not
    /// self-describing, so bytes are mapped 1:1 (latin1) rather than decoded as UTF-8.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator exists before the end of the
    /// buffer; the cursor is left at the start of the string.
    pub fn read_cstring_latin1(&mut self) -> Result<String> {
        let start = self.position;
        let Some(length) = self.data[start..].iter().position(|&byte| byte == 0) else {
            return Err(out_of_bounds_error!());
        };

        let string_data = &self.data[start..start + length];
        self.position = start + length + 1;

        Ok(string_data.iter().map(|&byte| char::from(byte)).collect())
    }
}
