//! Index section decoding.
//!
//! The index section is a sequence of fixed-size records, one per row. A record packs one symbol
//! index per field at the field's bit position. Bits are addressed little-endian across the
//! whole record: bit `n` is bit `n % 8` (counted from the least significant end) of byte
//! `n / 8`.
//!
//! ```text
//! record bytes:   [ b0 ][ b1 ] ...
//! bit positions:   7..0  15..8 ...
//!
//! field value = sum(bit[bit_offset + i] << i for i in 0..bit_width) + bias
//! ```
//!
//! A field with a bit width of zero is a constant column and references symbol 0 in every row;
//! its bias does not apply. A negative symbol index (after applying the bias) encodes null.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{header::FieldDescriptor, Error, Result};

/// Symbol indices of all rows, one per field in field order.
///
/// Stored row-major in a single buffer; [`IndexTable::record`] returns one row. A table whose
/// records occupy zero bytes stores a single record of zeros shared by every row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexTable {
    indices: Vec<i64>,
    field_count: usize,
    row_count: usize,
    constant: bool,
}

impl IndexTable {
    /// Builds a table from records of equal length.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a record's length differs from `field_count`.
    pub fn from_records(records: Vec<Vec<i64>>, field_count: usize) -> Result<Self> {
        let row_count = records.len();
        let mut indices = Vec::with_capacity(row_count * field_count);

        for (row, record) in records.into_iter().enumerate() {
            if record.len() != field_count {
                return Err(malformed_error!(
                    "Record {} has {} indices, expected {}",
                    row,
                    record.len(),
                    field_count
                ));
            }
            indices.extend(record);
        }

        Ok(IndexTable {
            indices,
            field_count,
            row_count,
            constant: false,
        })
    }

    /// Number of records
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of indices per record
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// True if every row shares the same all-zero record
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Symbol indices of one row, in field order
    #[must_use]
    pub fn record(&self, row: usize) -> Option<&[i64]> {
        if row >= self.row_count {
            return None;
        }
        if self.constant {
            return self.indices.get(..self.field_count);
        }

        let start = row * self.field_count;
        self.indices.get(start..start + self.field_count)
    }

    /// Iterates the records in row order
    pub fn iter(&self) -> impl Iterator<Item = &[i64]> + '_ {
        (0..self.row_count).filter_map(move |row| self.record(row))
    }
}

/// Decodes the index section.
///
/// # Arguments
/// * `section` - The index section, exactly the bytes holding the records
/// * `record_byte_size` - Size of one record in bytes
/// * `row_count` - Number of rows declared in the header
/// * `fields` - Field descriptors with their bit layout
/// * `parallel` - Decode records on the rayon pool
///
/// # Errors
/// - [`crate::Error::RecordCountMismatch`] if `section` does not hold exactly `row_count` records
/// - [`crate::Error::Malformed`] if a bit range exceeds the record or a biased index overflows
pub fn decode(
    section: &[u8],
    record_byte_size: usize,
    row_count: usize,
    fields: &[FieldDescriptor],
    parallel: bool,
) -> Result<IndexTable> {
    let field_count = fields.len();

    if record_byte_size == 0 {
        // Only constant fields fit into an empty record
        if !section.is_empty() {
            return Err(malformed_error!(
                "Index section holds {} bytes but records are empty",
                section.len()
            ));
        }
        if let Some(field) = fields.iter().find(|field| field.bit_width > 0) {
            return Err(malformed_error!(
                "Field '{}' needs {} bits but records are empty",
                field.name,
                field.bit_width
            ));
        }

        debug!("Index: {} empty records, {} constant fields", row_count, field_count);

        return Ok(IndexTable {
            indices: vec![0; field_count],
            field_count,
            row_count,
            constant: true,
        });
    }

    if section.len() % record_byte_size != 0 {
        return Err(malformed_error!(
            "Index section of {} bytes is not a multiple of the record size {}",
            section.len(),
            record_byte_size
        ));
    }

    let found = section.len() / record_byte_size;
    if found != row_count {
        return Err(Error::RecordCountMismatch {
            expected: row_count,
            found,
        });
    }

    let mut indices = vec![0_i64; row_count * field_count];
    if field_count > 0 {
        if parallel {
            indices
                .par_chunks_mut(field_count)
                .zip(section.par_chunks_exact(record_byte_size))
                .try_for_each(|(out, record)| decode_record(record, fields, out))?;
        } else {
            indices
                .chunks_mut(field_count)
                .zip(section.chunks_exact(record_byte_size))
                .try_for_each(|(out, record)| decode_record(record, fields, out))?;
        }
    }

    debug!(
        "Index: {} records of {} bytes, {} fields",
        row_count, record_byte_size, field_count
    );

    Ok(IndexTable {
        indices,
        field_count,
        row_count,
        constant: false,
    })
}

/// Decodes one record into the symbol index of every field.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a field's bits lie outside the record or applying the
/// bias overflows.
pub fn decode_record(record: &[u8], fields: &[FieldDescriptor], out: &mut [i64]) -> Result<()> {
    for (field, slot) in fields.iter().zip(out.iter_mut()) {
        if field.bit_width == 0 {
            *slot = 0;
            continue;
        }

        let raw = extract_bits(record, field.bit_offset, field.bit_width).ok_or_else(|| {
            malformed_error!(
                "Bits [{}, +{}) of field '{}' exceed a {}-byte record",
                field.bit_offset,
                field.bit_width,
                field.name,
                record.len()
            )
        })?;

        *slot = i64::try_from(raw)
            .ok()
            .and_then(|raw| raw.checked_add(field.bias))
            .ok_or_else(|| {
                malformed_error!(
                    "Index {} of field '{}' overflows with bias {}",
                    raw,
                    field.name,
                    field.bias
                )
            })?;
    }

    Ok(())
}

/// Reads `bit_width` bits starting at `bit_offset` as an unsigned integer.
///
/// Bit `bit_offset` becomes the least significant bit of the result. Returns `None` if the range
/// exceeds the record or is wider than 64 bits.
#[must_use]
pub fn extract_bits(record: &[u8], bit_offset: usize, bit_width: usize) -> Option<u64> {
    if bit_width > 64 {
        return None;
    }
    let end = bit_offset.checked_add(bit_width)?;
    if end > record.len() * 8 {
        return None;
    }

    let mut value = 0_u64;
    let mut written = 0;
    let mut position = bit_offset;

    while written < bit_width {
        let byte = record[position / 8];
        let shift = position % 8;
        let take = (8 - shift).min(bit_width - written);
        let bits = (u64::from(byte) >> shift) & ((1_u64 << take) - 1);

        value |= bits << written;
        written += take;
        position += take;
    }

    Some(value)
}
