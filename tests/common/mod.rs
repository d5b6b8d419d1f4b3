//! Writes QVD byte images for the integration tests.

#![allow(dead_code)]

use std::fmt::Write;

/// One field of a crafted image
pub struct Field {
    pub name: &'static str,
    pub bit_offset: usize,
    pub bit_width: usize,
    pub bias: i64,
    pub symbols: Vec<Vec<u8>>,
}

impl Field {
    pub fn new(name: &'static str, bit_offset: usize, bit_width: usize, bias: i64) -> Self {
        Field {
            name,
            bit_offset,
            bit_width,
            bias,
            symbols: Vec::new(),
        }
    }

    pub fn symbol(mut self, symbol: Vec<u8>) -> Self {
        self.symbols.push(symbol);
        self
    }
}

pub fn int(value: i32) -> Vec<u8> {
    let mut symbol = vec![0x01];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol
}

pub fn double(value: f64) -> Vec<u8> {
    let mut symbol = vec![0x02];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol
}

pub fn string(text: &str) -> Vec<u8> {
    let mut symbol = vec![0x04];
    symbol.extend_from_slice(text.as_bytes());
    symbol.push(0x00);
    symbol
}

pub fn dual_int(value: i32, text: &str) -> Vec<u8> {
    let mut symbol = vec![0x05];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol.extend_from_slice(text.as_bytes());
    symbol.push(0x00);
    symbol
}

pub fn dual_double(value: f64, text: &str) -> Vec<u8> {
    let mut symbol = vec![0x06];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol.extend_from_slice(text.as_bytes());
    symbol.push(0x00);
    symbol
}

/// Assembles header, symbol section and index section into one image.
pub fn image(fields: &[Field], record_byte_size: usize, records: &[u8], record_count: usize) -> Vec<u8> {
    let mut symbols = Vec::new();
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<QvdTableHeader>\r\n",
    );
    xml.push_str("  <QvBuildNo>50699</QvBuildNo>\r\n");
    xml.push_str("  <CreatorDoc>integration</CreatorDoc>\r\n");
    xml.push_str("  <TableName>Fixture</TableName>\r\n");
    xml.push_str("  <Fields>\r\n");

    for field in fields {
        let offset = symbols.len();
        for symbol in &field.symbols {
            symbols.extend_from_slice(symbol);
        }

        let _ = write!(
            xml,
            "    <QvdFieldHeader>\r\n\
             \x20     <FieldName>{}</FieldName>\r\n\
             \x20     <BitOffset>{}</BitOffset>\r\n\
             \x20     <BitWidth>{}</BitWidth>\r\n\
             \x20     <Bias>{}</Bias>\r\n\
             \x20     <NoOfSymbols>{}</NoOfSymbols>\r\n\
             \x20     <Offset>{}</Offset>\r\n\
             \x20     <Length>{}</Length>\r\n\
             \x20   </QvdFieldHeader>\r\n",
            field.name,
            field.bit_offset,
            field.bit_width,
            field.bias,
            field.symbols.len(),
            offset,
            symbols.len() - offset
        );
    }

    xml.push_str("  </Fields>\r\n");
    let _ = write!(xml, "  <RecordByteSize>{record_byte_size}</RecordByteSize>\r\n");
    let _ = write!(xml, "  <NoOfRecords>{record_count}</NoOfRecords>\r\n");
    let _ = write!(xml, "  <Offset>{}</Offset>\r\n", symbols.len());
    let _ = write!(xml, "  <Length>{}</Length>\r\n", records.len());
    xml.push_str("</QvdTableHeader>\r\n\0");

    let mut data = xml.into_bytes();
    data.extend_from_slice(&symbols);
    data.extend_from_slice(records);
    data
}

/// The two-row, one-field table with dual symbols "10" and "20"
pub fn dual_table() -> Vec<u8> {
    image(
        &[Field::new("A", 0, 1, 0)
            .symbol(dual_int(10, "10"))
            .symbol(dual_int(20, "20"))],
        1,
        &[0x00, 0x01],
        2,
    )
}
