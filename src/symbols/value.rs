//! Symbol values and their on-disk type tags.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Type tag preceding every symbol in the symbol section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumCount)]
#[repr(u8)]
pub enum SymbolType {
    /// 4-byte little-endian signed integer
    Integer = 0x01,
    /// 8-byte little-endian IEEE-754 double
    Double = 0x02,
    /// NUL-terminated byte string
    String = 0x04,
    /// 4-byte integer followed by a NUL-terminated string
    DualInteger = 0x05,
    /// 8-byte double followed by a NUL-terminated string
    DualDouble = 0x06,
}

impl SymbolType {
    /// Maps a tag byte to its symbol type, `None` for tags outside the known set
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<SymbolType> {
        SymbolType::iter().find(|kind| *kind as u8 == tag)
    }

    /// The tag byte of this symbol type
    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A decoded value.
///
/// Symbols carry at most one numeric representation together with an optional string. Rows
/// expose only the [primary](Value::primary) representation of their symbols, which is always
/// one of [`Value::Null`], [`Value::Integer`], [`Value::Double`] or [`Value::String`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value
    Null,
    /// Integer symbol
    Integer(i32),
    /// Double symbol
    Double(f64),
    /// String symbol
    String(String),
    /// Integer with a textual representation
    DualInteger(i32, String),
    /// Double with a textual representation
    DualDouble(f64, String),
}

impl Value {
    /// Resolves the single representative value of this symbol.
    ///
    /// Picks the string if present, else the integer, else the double, else null. Dual values
    /// therefore always surface their text.
    #[must_use]
    pub fn primary(&self) -> Value {
        match self {
            Value::String(text) | Value::DualInteger(_, text) | Value::DualDouble(_, text) => {
                Value::String(text.clone())
            }
            Value::Integer(value) => Value::Integer(*value),
            Value::Double(value) => Value::Double(*value),
            Value::Null => Value::Null,
        }
    }

    /// The symbol type this value was decoded from, `None` for null
    #[must_use]
    pub fn symbol_type(&self) -> Option<SymbolType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(SymbolType::Integer),
            Value::Double(_) => Some(SymbolType::Double),
            Value::String(_) => Some(SymbolType::String),
            Value::DualInteger(..) => Some(SymbolType::DualInteger),
            Value::DualDouble(..) => Some(SymbolType::DualDouble),
        }
    }

    /// True for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The textual representation, if the value has one
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) | Value::DualInteger(_, text) | Value::DualDouble(_, text) => {
                Some(text)
            }
            _ => None,
        }
    }

    /// The integer representation, if the value has one
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(value) | Value::DualInteger(value, _) => Some(*value),
            _ => None,
        }
    }

    /// The double representation, if the value has one
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(value) | Value::DualDouble(value, _) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value usable for ordering, integers widened to `f64`
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        self.as_integer()
            .map(f64::from)
            .or_else(|| self.as_double())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(text) | Value::DualInteger(_, text) | Value::DualDouble(_, text) => {
                f.write_str(text)
            }
            Value::Integer(value) => write!(f, "{value}"),
            Value::Double(value) => write!(f, "{value}"),
        }
    }
}
