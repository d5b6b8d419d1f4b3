//! Symbol section decoding.
//!
//! Every field owns a contiguous byte range of the symbol section holding its distinct values
//! ("symbols") back to back. Each symbol starts with a one-byte [`SymbolType`] tag followed by a
//! tag-specific payload:
//!
//! | tag  | payload                                         | value                      |
//! |------|-------------------------------------------------|----------------------------|
//! | 0x01 | `i32` little-endian                             | [`Value::Integer`]         |
//! | 0x02 | `f64` little-endian                             | [`Value::Double`]          |
//! | 0x04 | NUL-terminated bytes                            | [`Value::String`]          |
//! | 0x05 | `i32` little-endian + NUL-terminated bytes      | [`Value::DualInteger`]     |
//! | 0x06 | `f64` little-endian + NUL-terminated bytes      | [`Value::DualDouble`]      |
//!
//! The position of a symbol in its field's list is the symbol index referenced by the index
//! table. Fields are independent and are decoded in parallel when requested.

mod value;

pub use value::{SymbolType, Value};

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{file::parser::Parser, header::FieldDescriptor, Error, Result};

/// Decoded symbols of all fields, indexed by field then by symbol index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    columns: Vec<Vec<Value>>,
}

impl SymbolTable {
    /// Wraps per-field symbol lists, in field order
    #[must_use]
    pub fn new(columns: Vec<Vec<Value>>) -> Self {
        SymbolTable { columns }
    }

    /// Number of fields
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// All symbols of a field
    #[must_use]
    pub fn symbols(&self, field: usize) -> Option<&[Value]> {
        self.columns.get(field).map(Vec::as_slice)
    }

    /// One symbol of a field
    #[must_use]
    pub fn get(&self, field: usize, index: usize) -> Option<&Value> {
        self.columns.get(field).and_then(|symbols| symbols.get(index))
    }
}

/// Decodes the symbols of every field.
///
/// # Arguments
/// * `section` - The complete symbol section
/// * `fields` - Field descriptors, their symbol ranges are relative to `section`
/// * `parallel` - Decode fields on the rayon pool
///
/// # Errors
/// Returns the first error of any field, see [`decode_field`].
pub fn decode(section: &[u8], fields: &[FieldDescriptor], parallel: bool) -> Result<SymbolTable> {
    let columns = if parallel {
        fields
            .par_iter()
            .map(|field| decode_field(section, field))
            .collect::<Result<Vec<_>>>()?
    } else {
        fields
            .iter()
            .map(|field| decode_field(section, field))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(SymbolTable::new(columns))
}

/// Decodes the symbols of one field, in encounter order.
///
/// # Errors
/// - [`crate::Error::Malformed`] if the field's range lies outside `section`
/// - [`crate::Error::UnknownSymbolType`] if a tag outside the known set is found
/// - [`crate::Error::SymbolOverrun`] if the last symbol does not end within the field's range
pub fn decode_field(section: &[u8], field: &FieldDescriptor) -> Result<Vec<Value>> {
    let Some(data) = field
        .symbol_end()
        .and_then(|end| section.get(field.symbol_offset..end))
    else {
        return Err(malformed_error!(
            "Symbols of field '{}' at [{}, +{}) lie outside the symbol section",
            field.name,
            field.symbol_offset,
            field.symbol_length
        ));
    };

    let mut parser = Parser::new(data);
    let mut symbols = Vec::with_capacity(field.symbol_count.unwrap_or(0).min(data.len()));
    let mut high_bytes = false;

    while parser.has_more_data() {
        let offset = parser.pos();
        let tag = parser.read_le::<u8>()?;

        let Some(kind) = SymbolType::from_tag(tag) else {
            return Err(Error::UnknownSymbolType {
                tag,
                offset,
                field: field.name.clone(),
            });
        };

        let value = read_symbol(&mut parser, kind).map_err(|error| match error {
            Error::OutOfBounds => Error::SymbolOverrun {
                field: field.name.clone(),
                expected: data.len(),
                offset,
            },
            other => other,
        })?;

        if !high_bytes {
            high_bytes = value.as_str().is_some_and(|text| !text.is_ascii());
        }
        symbols.push(value);
    }

    if high_bytes {
        warn!(
            "Field '{}' contains string bytes >= 0x80, mapped 1:1 to code points (latin1)",
            field.name
        );
    }

    if let Some(declared) = field.symbol_count {
        if declared != symbols.len() {
            warn!(
                "Field '{}' declares {} symbols but {} were decoded",
                field.name,
                declared,
                symbols.len()
            );
        }
    }

    debug!("Field '{}': {} symbols", field.name, symbols.len());

    Ok(symbols)
}

fn read_symbol(parser: &mut Parser, kind: SymbolType) -> Result<Value> {
    let value = match kind {
        SymbolType::Integer => Value::Integer(parser.read_le::<i32>()?),
        SymbolType::Double => Value::Double(parser.read_le::<f64>()?),
        SymbolType::String => Value::String(parser.read_cstring_latin1()?),
        SymbolType::DualInteger => {
            let number = parser.read_le::<i32>()?;
            Value::DualInteger(number, parser.read_cstring_latin1()?)
        }
        SymbolType::DualDouble => {
            let number = parser.read_le::<f64>()?;
            Value::DualDouble(number, parser.read_cstring_latin1()?)
        }
    };

    Ok(value)
}
