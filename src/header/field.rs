//! Per-column descriptors declared in the QVD header.
//!
//! Each `<QvdFieldHeader>` element describes one column: where its symbols live inside the
//! symbol section, and where its symbol index is packed inside every index record.
//!
//! ```text
//! <QvdFieldHeader>
//!   <FieldName>Country</FieldName>
//!   <BitOffset>3</BitOffset>      bit position inside each index record
//!   <BitWidth>4</BitWidth>        bits used by this field's index (0 = constant column)
//!   <Bias>0</Bias>                added to the extracted bits
//!   <NoOfSymbols>11</NoOfSymbols>
//!   <Offset>42</Offset>           start of the field's symbols, relative to the symbol section
//!   <Length>96</Length>           byte length of the field's symbols
//!   ...
//! </QvdFieldHeader>
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{header::xml::Element, Result};

/// Display format category of a field, as recorded by the writer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum NumberFormatType {
    /// No format recorded
    #[default]
    Unknown,
    /// Plain text
    Ascii,
    /// Integer number
    Integer,
    /// Floating point number
    Real,
    /// Fixed number of decimals
    Fix,
    /// Currency
    Money,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time
    Timestamp,
    /// Duration
    Interval,
}

/// The `<NumberFormat>` block of a field. Informational only, decoding does not depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Format category
    pub kind: NumberFormatType,
    /// Number of decimals (`nDec`)
    pub decimals: Option<i64>,
    /// Whether a thousands separator is used (`UseThou`)
    pub use_thousands: bool,
    /// Format pattern (`Fmt`)
    pub pattern: Option<String>,
    /// Decimal separator (`Dec`)
    pub decimal_separator: Option<String>,
    /// Thousands separator (`Thou`)
    pub thousands_separator: Option<String>,
}

impl NumberFormat {
    fn from_element(element: &Element) -> Result<Self> {
        let kind = element
            .optional_text("Type")
            .and_then(|kind| kind.parse().ok())
            .unwrap_or_default();

        Ok(NumberFormat {
            kind,
            decimals: element.optional_number("nDec")?,
            use_thousands: element.optional_number::<i64>("UseThou")?.unwrap_or(0) != 0,
            pattern: element.optional_text("Fmt"),
            decimal_separator: element.optional_text("Dec"),
            thousands_separator: element.optional_text("Thou"),
        })
    }
}

/// Layout of one column, immutable once parsed from the header.
///
/// `bit_offset + bit_width` never exceeds the bit width of an index record; a `bit_width` of 0
/// means every row of the field references symbol 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name
    pub name: String,
    /// Start of the field's symbols, relative to the start of the symbol section
    pub symbol_offset: usize,
    /// Byte length of the field's symbols
    pub symbol_length: usize,
    /// Position of the field's index inside each index record, in bits
    pub bit_offset: usize,
    /// Width of the field's index, in bits
    pub bit_width: usize,
    /// Added to the extracted bits to get the symbol index
    pub bias: i64,
    /// Declared number of distinct symbols (`NoOfSymbols`), if recorded
    pub symbol_count: Option<usize>,
    /// Field comment
    pub comment: Option<String>,
    /// Field tags such as `$numeric` or `$key`
    pub tags: Vec<String>,
    /// Display format recorded by the writer
    pub number_format: Option<NumberFormat>,
}

impl FieldDescriptor {
    /// Reads a descriptor from a `<QvdFieldHeader>` element.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a required element is missing or not a base-10
    /// integer.
    pub(crate) fn from_element(element: &Element) -> Result<Self> {
        let name = element.required_text("FieldName")?.to_string();

        let tags = element
            .child("Tags")
            .map(|tags| {
                tags.children_named("String")
                    .map(|tag| tag.text.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let number_format = match element.child("NumberFormat") {
            Some(format) => Some(NumberFormat::from_element(format)?),
            None => None,
        };

        Ok(FieldDescriptor {
            symbol_offset: element.number("Offset")?,
            symbol_length: element.number("Length")?,
            bit_offset: element.number("BitOffset")?,
            bit_width: element.number("BitWidth")?,
            bias: element.number("Bias")?,
            symbol_count: element.optional_number("NoOfSymbols")?,
            comment: element.optional_text("Comment"),
            tags,
            number_format,
            name,
        })
    }

    /// Exclusive end of the field's symbol range, relative to the symbol section
    #[must_use]
    pub fn symbol_end(&self) -> Option<usize> {
        self.symbol_offset.checked_add(self.symbol_length)
    }

    /// Exclusive end of the field's bit range inside an index record
    #[must_use]
    pub fn bit_end(&self) -> Option<usize> {
        self.bit_offset.checked_add(self.bit_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{header::xml::parse_document, Error};

    #[test]
    fn descriptor() {
        let xml = br#"<QvdFieldHeader>
            <FieldName>Country</FieldName>
            <BitOffset>3</BitOffset>
            <BitWidth>4</BitWidth>
            <Bias>-2</Bias>
            <NumberFormat>
                <Type>INTEGER</Type>
                <nDec>0</nDec>
                <UseThou>1</UseThou>
                <Fmt>###0</Fmt>
                <Dec>.</Dec>
                <Thou>,</Thou>
            </NumberFormat>
            <NoOfSymbols>11</NoOfSymbols>
            <Offset>42</Offset>
            <Length>96</Length>
            <Comment></Comment>
            <Tags><String>$numeric</String><String>$integer</String></Tags>
        </QvdFieldHeader>"#;

        let field = FieldDescriptor::from_element(&parse_document(xml).unwrap()).unwrap();
        assert_eq!(field.name, "Country");
        assert_eq!(field.bit_offset, 3);
        assert_eq!(field.bit_width, 4);
        assert_eq!(field.bit_end(), Some(7));
        assert_eq!(field.bias, -2);
        assert_eq!(field.symbol_count, Some(11));
        assert_eq!(field.symbol_offset, 42);
        assert_eq!(field.symbol_length, 96);
        assert_eq!(field.symbol_end(), Some(138));
        assert_eq!(field.comment, None);
        assert_eq!(field.tags, vec!["$numeric", "$integer"]);

        let format = field.number_format.unwrap();
        assert_eq!(format.kind, NumberFormatType::Integer);
        assert_eq!(format.decimals, Some(0));
        assert!(format.use_thousands);
        assert_eq!(format.pattern.as_deref(), Some("###0"));
        assert_eq!(format.thousands_separator.as_deref(), Some(","));
    }

    #[test]
    fn unknown_format_type() {
        let xml = b"<QvdFieldHeader><FieldName>A</FieldName><BitOffset>0</BitOffset>\
            <BitWidth>0</BitWidth><Bias>0</Bias><Offset>0</Offset><Length>0</Length>\
            <NumberFormat><Type>SOMETHING_NEW</Type></NumberFormat></QvdFieldHeader>";

        let field = FieldDescriptor::from_element(&parse_document(xml).unwrap()).unwrap();
        assert_eq!(field.number_format.unwrap().kind, NumberFormatType::Unknown);
        assert!(field.tags.is_empty());
        assert_eq!(field.symbol_count, None);
    }

    #[test]
    fn missing_required() {
        let xml = b"<QvdFieldHeader><FieldName>A</FieldName><BitOffset>0</BitOffset>\
            <BitWidth>1</BitWidth><Offset>0</Offset><Length>0</Length></QvdFieldHeader>";

        let result = FieldDescriptor::from_element(&parse_document(xml).unwrap());
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn non_numeric() {
        let xml = b"<QvdFieldHeader><FieldName>A</FieldName><BitOffset>zero</BitOffset>\
            <BitWidth>1</BitWidth><Bias>0</Bias><Offset>0</Offset><Length>0</Length></QvdFieldHeader>";

        let result = FieldDescriptor::from_element(&parse_document(xml).unwrap());
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }
}
