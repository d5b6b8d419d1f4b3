//! QVD header parsing.
//!
//! A QVD file starts with an XML document describing the table, terminated by the three bytes
//! `CR LF NUL`. The binary body follows immediately:
//!
//! ```text
//! +---------------------------+  0
//! | XML header                |
//! | ... </QvdTableHeader>     |
//! +---------------------------+
//! | 0x0D 0x0A 0x00            |  delimiter
//! +---------------------------+  header_end == symbol_table_offset
//! | symbol section            |  <Offset> bytes (table level)
//! +---------------------------+  index_table_offset
//! | index section             |  <NoOfRecords> records of <RecordByteSize> bytes
//! +---------------------------+
//! ```
//!
//! [`parse`] locates the delimiter, reads the table-level and per-field metadata, and checks that
//! the declared layout is internally consistent and fits inside the input, so the symbol and
//! index decoders can slice their ranges without further validation.

mod field;
pub(crate) mod xml;

pub use field::{FieldDescriptor, NumberFormat, NumberFormatType};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Terminator of the XML header: `CR LF NUL`.
pub const HEADER_DELIMITER: [u8; 3] = [0x0D, 0x0A, 0x00];

/// Widest field index that still fits a signed 64-bit symbol index.
const MAX_BIT_WIDTH: usize = 63;

/// Byte offsets of the three parts of a QVD file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// First byte after the header delimiter
    pub header_end: usize,
    /// Start of the symbol section (equal to `header_end`)
    pub symbol_table_offset: usize,
    /// Start of the index section
    pub index_table_offset: usize,
}

/// Table metadata parsed from the XML header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QvdHeader {
    /// Column descriptors in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Declared number of rows (`NoOfRecords`)
    pub record_count: usize,
    /// Size of one index record in bytes (`RecordByteSize`)
    pub record_byte_size: usize,
    /// Length of the symbol section in bytes (table level `Offset`)
    pub symbol_section_length: usize,
    /// Declared length of the index section in bytes (table level `Length`)
    pub index_section_length: Option<usize>,
    /// Byte offsets of header, symbol and index sections
    pub layout: TableLayout,
    /// Table name
    pub table_name: Option<String>,
    /// Build number of the writer (`QvBuildNo`)
    pub build_no: Option<String>,
    /// Document that created the file (`CreatorDoc`)
    pub creator_doc: Option<String>,
    /// Creation timestamp (`CreateUtcTime`)
    pub create_utc_time: Option<String>,
    /// Table comment
    pub comment: Option<String>,
}

impl QvdHeader {
    /// Number of declared fields
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Bit width of one index record
    #[must_use]
    pub fn record_bit_width(&self) -> usize {
        self.record_byte_size.saturating_mul(8)
    }
}

/// Returns the position of the first `CR LF NUL` sequence in `data`.
#[must_use]
pub fn find_delimiter(data: &[u8]) -> Option<usize> {
    data.windows(HEADER_DELIMITER.len())
        .position(|window| window == HEADER_DELIMITER)
}

/// Parses the header at the start of a QVD file.
///
/// # Arguments
/// * `data` - The complete input buffer
///
/// # Errors
/// - [`crate::Error::MissingDelimiter`] if `data` contains no `CR LF NUL`
/// - [`crate::Error::Malformed`] if the XML is invalid, a required element is missing or not a
///   base-10 integer, or the declared layout does not fit the record or the input
pub fn parse(data: &[u8]) -> Result<QvdHeader> {
    let Some(delimiter) = find_delimiter(data) else {
        return Err(Error::MissingDelimiter);
    };
    let header_end = delimiter + HEADER_DELIMITER.len();
    trace!("Header delimiter at byte {}", delimiter);

    let root = xml::parse_document(&data[..delimiter])?;
    if root.name != "QvdTableHeader" {
        debug!("Unexpected header root element '{}'", root.name);
    }

    let record_count: usize = root.number("NoOfRecords")?;
    let record_byte_size: usize = root.number("RecordByteSize")?;
    let symbol_section_length: usize = root.number("Offset")?;
    let index_section_length: Option<usize> = root.optional_number("Length")?;

    let Some(field_list) = root.child("Fields") else {
        return Err(malformed_error!("Missing required element 'Fields' in '{}'", root.name));
    };
    let fields = field_list
        .children_named("QvdFieldHeader")
        .map(FieldDescriptor::from_element)
        .collect::<Result<Vec<_>>>()?;

    let Some(index_table_offset) = header_end.checked_add(symbol_section_length) else {
        return Err(malformed_error!(
            "Symbol section length {} overflows",
            symbol_section_length
        ));
    };
    if index_table_offset > data.len() {
        return Err(malformed_error!(
            "Symbol section [{}, {}) exceeds the file size of {} bytes",
            header_end,
            index_table_offset,
            data.len()
        ));
    }

    let header = QvdHeader {
        fields,
        record_count,
        record_byte_size,
        symbol_section_length,
        index_section_length,
        layout: TableLayout {
            header_end,
            symbol_table_offset: header_end,
            index_table_offset,
        },
        table_name: root.optional_text("TableName"),
        build_no: root.optional_text("QvBuildNo"),
        creator_doc: root.optional_text("CreatorDoc"),
        create_utc_time: root.optional_text("CreateUtcTime"),
        comment: root.optional_text("Comment"),
    };

    validate_fields(&header)?;

    debug!(
        "Header: {} fields, {} records of {} bytes, symbols at {}, index at {}",
        header.fields.len(),
        header.record_count,
        header.record_byte_size,
        header.layout.symbol_table_offset,
        header.layout.index_table_offset
    );

    Ok(header)
}

fn validate_fields(header: &QvdHeader) -> Result<()> {
    let record_bits = header.record_bit_width();

    for field in &header.fields {
        trace!(
            "Field '{}': bits [{}, +{}) bias {}, symbols [{}, +{})",
            field.name,
            field.bit_offset,
            field.bit_width,
            field.bias,
            field.symbol_offset,
            field.symbol_length
        );

        if field.bit_width > MAX_BIT_WIDTH {
            return Err(malformed_error!(
                "Field '{}' has a bit width of {}, at most {} is supported",
                field.name,
                field.bit_width,
                MAX_BIT_WIDTH
            ));
        }

        if field.bit_width > 0 && field.bit_end().is_none_or(|end| end > record_bits) {
            return Err(malformed_error!(
                "Field '{}' occupies bits [{}, +{}) outside a {}-bit record",
                field.name,
                field.bit_offset,
                field.bit_width,
                record_bits
            ));
        }

        if field
            .symbol_end()
            .is_none_or(|end| end > header.symbol_section_length)
        {
            return Err(malformed_error!(
                "Symbols of field '{}' at [{}, +{}) exceed the symbol section of {} bytes",
                field.name,
                field.symbol_offset,
                field.symbol_length,
                header.symbol_section_length
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::QvdBuilder;

    #[test]
    fn delimiter() {
        assert_eq!(find_delimiter(b"<a/>\r\n\0rest"), Some(4));
        assert_eq!(find_delimiter(b"\r\n\r\n\0"), Some(2));
        assert_eq!(find_delimiter(b"<a/>\r\n"), None);
        assert_eq!(find_delimiter(b""), None);
    }

    #[test]
    fn missing_delimiter() {
        let result = parse(b"<QvdTableHeader></QvdTableHeader>\r\n");
        assert!(matches!(result, Err(Error::MissingDelimiter)));
    }

    #[test]
    fn layout() {
        let data = QvdBuilder::new()
            .field_with_symbols("A", 0, 1, 0, &[&[0x04, b'x', 0x00], &[0x04, b'y', 0x00]])
            .records(1, &[&[0x00], &[0x01], &[0x01]])
            .table_name("T")
            .build();

        let header = parse(&data).unwrap();
        let delimiter = find_delimiter(&data).unwrap();

        assert_eq!(header.layout.header_end, delimiter + 3);
        assert_eq!(header.layout.symbol_table_offset, header.layout.header_end);
        assert_eq!(header.layout.index_table_offset, header.layout.header_end + 6);
        assert_eq!(header.symbol_section_length, 6);
        assert_eq!(header.index_section_length, Some(3));
        assert_eq!(header.record_count, 3);
        assert_eq!(header.record_byte_size, 1);
        assert_eq!(header.field_count(), 1);
        assert_eq!(header.fields[0].name, "A");
        assert_eq!(header.table_name.as_deref(), Some("T"));
        assert_eq!(data.len(), header.layout.index_table_offset + 3);
    }

    #[test]
    fn single_field_is_a_list() {
        let data = QvdBuilder::new()
            .field_with_symbols("Only", 0, 0, 0, &[&[0x01, 7, 0, 0, 0]])
            .records(0, &[&[], &[]])
            .build();

        let header = parse(&data).unwrap();
        assert_eq!(header.fields.len(), 1);
        assert_eq!(header.fields[0].name, "Only");
    }

    #[test]
    fn missing_record_count() {
        let xml = "<QvdTableHeader><Fields></Fields><RecordByteSize>1</RecordByteSize>\
            <Offset>0</Offset></QvdTableHeader>\r\n\0";
        assert!(matches!(
            parse(xml.as_bytes()),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn non_numeric_record_size() {
        let xml = "<QvdTableHeader><Fields></Fields><NoOfRecords>0</NoOfRecords>\
            <RecordByteSize>one</RecordByteSize><Offset>0</Offset></QvdTableHeader>\r\n\0";
        assert!(matches!(
            parse(xml.as_bytes()),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn bits_outside_record() {
        let data = QvdBuilder::new()
            .field_with_symbols("A", 6, 3, 0, &[&[0x01, 1, 0, 0, 0]])
            .records(1, &[&[0x00]])
            .build();
        assert!(matches!(parse(&data), Err(Error::Malformed { .. })));
    }

    #[test]
    fn symbols_outside_section() {
        let data = QvdBuilder::new()
            .field("A", 0, 0, 0, 0, 8)
            .symbol_section(vec![0x04, b'a', 0x00])
            .records(0, &[&[]])
            .build();
        assert!(matches!(parse(&data), Err(Error::Malformed { .. })));
    }

    #[test]
    fn symbol_section_past_end_of_file() {
        let xml = "<QvdTableHeader><Fields></Fields><NoOfRecords>0</NoOfRecords>\
            <RecordByteSize>0</RecordByteSize><Offset>100</Offset></QvdTableHeader>\r\n\0";
        assert!(matches!(
            parse(xml.as_bytes()),
            Err(Error::Malformed { .. })
        ));
    }
}
