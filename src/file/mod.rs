//! Input file abstraction for QVD decoding.
//!
//! A decode only ever reads its input, so the input is modelled as one immutable byte buffer
//! that every decode phase borrows disjoint ranges from. The buffer comes from a
//! [`crate::file::Backend`]: either a read-only memory map of a file on disk, or an owned
//! in-memory buffer.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - The immutable input buffer with bounds-checked slicing
//! - [`crate::file::Backend`] - Trait for the different data sources
//! - [`crate::file::parser::Parser`] - Forward-only cursor used by the symbol decoder
//! - [`crate::file::io`] - Little-endian primitive reads
//!
//! # Examples
//!
//! ```rust,no_run
//! use qvdscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("data/orders.qvd"))?;
//! println!("Loaded {} bytes", file.len());
//! # Ok::<(), qvdscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`crate::file::File`] is `Send + Sync`; the symbol and index decoders read it concurrently.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// Implementors only provide access to the whole buffer; slicing and length are derived.
pub trait Backend: Send + Sync {
    /// Returns the complete data buffer.
    fn data(&self) -> &[u8];

    /// Returns a slice of `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the buffer or overflows.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        let data = self.data();
        if offset_end > data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&data[offset..offset_end])
    }

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize {
        self.data().len()
    }
}

/// The immutable input of one decode.
pub struct File {
    data: Box<dyn Backend>,
}

impl File {
    /// Maps a file from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file is missing or unreadable, and
    /// [`crate::Error::Empty`] if it has no content.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Wraps a buffer already held in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
        })
    }

    /// Total size of the input in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false, empty inputs are rejected on load
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// The complete input buffer
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// A bounds-checked range of the input buffer
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range does not lie within the input.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }
}
