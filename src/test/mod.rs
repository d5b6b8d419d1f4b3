
pub use builder::*;

// Helper function to encode a dual integer symbol
pub fn dual_int(value: i32, text: &str) -> Vec<u8> {
    let mut symbol = vec![0x05];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol.extend_from_slice(text.as_bytes());
    symbol.push(0x00);
    symbol
}

// Helper function to encode a string symbol
pub fn string(text: &str) -> Vec<u8> {
    let mut symbol = vec![0x04];
    symbol.extend_from_slice(text.as_bytes());
    symbol.push(0x00);
    symbol
}

// Helper function to encode an integer symbol
pub fn int(value: i32) -> Vec<u8> {
    let mut symbol = vec![0x01];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol
}

// Helper function to encode a double symbol
pub fn double(value: f64) -> Vec<u8> {
    let mut symbol = vec![0x02];
    symbol.extend_from_slice(&value.to_le_bytes());
    symbol
}

// Crafted two-field table used across modules:
//   Id    (3 bits at 0, bias 0): 1, 2, 3
//   Name  (2 bits at 3, bias 0): "alpha", "beta", "gamma"
// Rows: (1, alpha), (2, beta), (3, gamma), (1, gamma)
pub fn crafted_table() -> Vec<u8> {
    QvdBuilder::new()
        .field_with_symbols("Id", 0, 3, 0, &[&int(1), &int(2), &int(3)])
        .field_with_symbols(
            "Name",
            3,
            2,
            0,
            &[&string("alpha"), &string("beta"), &string("gamma")],
        )
        .records(
            1,
            &[
                &[0b00_000_000],
                &[0b00_001_001],
                &[0b00_010_010],
                &[0b00_010_000],
            ],
        )
        .table_name("Crafted")
        .build()
}
