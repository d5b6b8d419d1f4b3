//! Whole-file decoding.
//!
//! Drives the three decode phases over one immutable input buffer:
//!
//! 1. [`crate::header::parse`] locates the sections and reads the field descriptors
//! 2. [`crate::symbols::decode`] and [`crate::index::decode`] run over their disjoint sections,
//!    concurrently when the [`DecodeConfig`] asks for it
//! 3. [`QvdTable::new`] cross-checks the parts and assembles the table
//!
//! Any error aborts the decode; no partial table is produced.

use std::path::Path;

use log::{debug, info};

use crate::{header, index, symbols, DecodeConfig, Error, File, QvdTable, Result};

/// Decodes the QVD file at `path` with the default configuration.
///
/// The file is memory-mapped read-only for the duration of the decode.
///
/// # Errors
/// - [`crate::Error::FileError`] if the file cannot be opened or mapped
/// - [`crate::Error::Empty`] if the file has no content
/// - any format or consistency error of the decode phases
///
/// # Examples
///
/// ```rust,no_run
/// let table = qvdscope::decode("data/orders.qvd")?;
/// println!("{} rows x {} columns", table.row_count(), table.column_count());
/// # Ok::<(), qvdscope::Error>(())
/// ```
pub fn decode(path: impl AsRef<Path>) -> Result<QvdTable> {
    decode_with_config(path, DecodeConfig::default())
}

/// Decodes the QVD file at `path`.
///
/// # Errors
/// See [`decode`].
pub fn decode_with_config(path: impl AsRef<Path>, config: DecodeConfig) -> Result<QvdTable> {
    let path = path.as_ref();
    info!("Decoding '{}'", path.display());

    let file = File::from_file(path)?;
    decode_file(&file, config)
}

/// Decodes a QVD image held in memory with the default configuration.
///
/// # Errors
/// Returns [`crate::Error::Empty`] for an empty slice, or any error of the decode phases.
pub fn decode_bytes(data: &[u8]) -> Result<QvdTable> {
    decode_bytes_with_config(data, DecodeConfig::default())
}

/// Decodes a QVD image held in memory.
///
/// # Errors
/// See [`decode_bytes`].
pub fn decode_bytes_with_config(data: &[u8], config: DecodeConfig) -> Result<QvdTable> {
    if data.is_empty() {
        return Err(Error::Empty);
    }

    decode_slice(data, config)
}

/// Decodes an already loaded [`File`].
///
/// # Errors
/// See [`decode`].
pub fn decode_file(file: &File, config: DecodeConfig) -> Result<QvdTable> {
    decode_slice(file.data(), config)
}

fn decode_slice(data: &[u8], config: DecodeConfig) -> Result<QvdTable> {
    let header = header::parse(data)?;
    let layout = header.layout;

    let Some(symbol_section) = data.get(layout.symbol_table_offset..layout.index_table_offset)
    else {
        return Err(malformed_error!(
            "Symbol section [{}, {}) lies outside the input",
            layout.symbol_table_offset,
            layout.index_table_offset
        ));
    };

    // A declared index length bounds the section; without one it runs to the end of the input
    let index_end = header
        .index_section_length
        .and_then(|length| layout.index_table_offset.checked_add(length))
        .map_or(data.len(), |end| end.min(data.len()));
    let Some(index_section) = data.get(layout.index_table_offset..index_end) else {
        return Err(malformed_error!(
            "Index section [{}, {}) lies outside the input",
            layout.index_table_offset,
            index_end
        ));
    };

    debug!(
        "Sections: {} symbol bytes, {} index bytes",
        symbol_section.len(),
        index_section.len()
    );

    let parallel_rows = config.parallel_rows(header.record_count);
    let decode_symbols = || symbols::decode(symbol_section, &header.fields, config.parallel);
    let decode_index = || {
        index::decode(
            index_section,
            header.record_byte_size,
            header.record_count,
            &header.fields,
            parallel_rows,
        )
    };

    let (symbols, index) = if config.parallel {
        rayon::join(decode_symbols, decode_index)
    } else {
        (decode_symbols(), decode_index())
    };
    let (symbols, index) = (symbols?, index?);

    let table = QvdTable::new(header, symbols, index)?;
    info!(
        "Decoded {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{crafted_table, dual_int, QvdBuilder},
        Value,
    };

    #[test]
    fn configurations_agree() {
        let data = crafted_table();

        let default = decode_bytes(&data).unwrap();
        let sequential = decode_bytes_with_config(&data, DecodeConfig::sequential()).unwrap();
        let parallel = decode_bytes_with_config(&data, DecodeConfig::parallel()).unwrap();

        assert_eq!(default, sequential);
        assert_eq!(default, parallel);
        assert_eq!(default.header().table_name.as_deref(), Some("Crafted"));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(decode_bytes(&[]), Err(Error::Empty)));
    }

    #[test]
    fn index_length_bounds_section() {
        let mut data = QvdBuilder::new()
            .field_with_symbols("A", 0, 1, 0, &[&dual_int(10, "10"), &dual_int(20, "20")])
            .records(1, &[&[0x00], &[0x01]])
            .build();
        // bytes past the declared index length are not records
        data.extend_from_slice(&[0xFF, 0xFF]);

        let table = decode_bytes(&data).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap(), vec![Value::String("20".to_string())]);
    }

    #[test]
    fn first_error_wins() {
        let data = QvdBuilder::new()
            .field("A", 0, 8, 0, 0, 2)
            .symbol_section(vec![0x03, 0x00])
            .records(1, &[&[0x00]])
            .build();

        for config in [DecodeConfig::sequential(), DecodeConfig::parallel()] {
            assert!(matches!(
                decode_bytes_with_config(&data, config),
                Err(Error::UnknownSymbolType { tag: 0x03, .. })
            ));
        }
    }
}
