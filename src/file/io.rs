//! Little-endian primitive reads for QVD decoding.
//!
//! Every multi-byte number in a QVD body is little-endian: 4-byte signed integers and 8-byte
//! IEEE-754 doubles in the symbol section. The [`crate::file::io::QvdIO`] trait gives those
//! primitives a single bounds-checked entry point, [`crate::file::io::read_le_at`], which the
//! cursor parser builds upon.
//!
//! # Error Handling
//!
//! All reading functions return [`crate::Result<T>`] and fail with [`crate::Error::OutOfBounds`]
//! if there are insufficient bytes in the buffer to complete the operation.

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be decoded from a fixed number of little-endian bytes.
pub trait QvdIO: Sized {
    /// The fixed-size byte array representation of the type
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Builds the value from its little-endian byte representation
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_qvd_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl QvdIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_qvd_io! {
    u8 => 1,
    i32 => 4,
    f64 => 8,
}

/// Reads a value from the start of the buffer in little-endian format.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_le<T: QvdIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a value at `offset` in little-endian format and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain; `offset`
/// is left untouched in that case.
pub fn read_le_at<T: QvdIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}
