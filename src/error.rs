use thiserror::Error;

use crate::worker::JobId;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every decode phase aborts on its first error and hands it to the caller unchanged; no partial
/// or default table is ever produced. The variants are grouped the way a presentation layer
/// usually needs to tell them apart ("file not found" vs. "corrupted or unsupported file").
///
/// # Error Categories
///
/// ## Format Errors
/// - [`Error::MissingDelimiter`] - The `CR LF NUL` header terminator is absent
/// - [`Error::Malformed`] - Header XML or numeric attributes are missing or invalid
/// - [`Error::UnknownSymbolType`] - A symbol tag outside the known set was found
///
/// ## Consistency Errors
/// - [`Error::SymbolOverrun`] - A symbol runs past the end of its field's symbol range
/// - [`Error::RecordCountMismatch`] - The index section holds a different number of records
/// - [`Error::SymbolIndexOutOfRange`] - A row references a symbol its field does not have
///
/// ## Access Errors
/// - [`Error::RowOutOfRange`] - A row outside `[0, row_count)` was requested
/// - [`Error::ColumnOutOfRange`] / [`Error::ColumnNotFound`] - Unknown column
///
/// ## I/O and Transport Errors
/// - [`Error::FileError`] - Filesystem I/O errors, surfaced before any parsing
/// - [`Error::Empty`] - Zero-length input
/// - [`Error::Transfer`] - Failure crossing the serialization boundary
///
/// # Examples
///
/// ```rust,no_run
/// use qvdscope::{decode, Error};
///
/// match decode("data/orders.qvd") {
///     Ok(table) => println!("{} rows", table.row_count()),
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(Error::MissingDelimiter) => eprintln!("Not a QVD file"),
///     Err(e) => eprintln!("Corrupted or unsupported file: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Format errors
    /// The header/body delimiter (`CR LF NUL`) could not be found.
    ///
    /// The input is rejected outright, it is not a file of this format.
    #[error("No header delimiter found - not a valid QVD file")]
    MissingDelimiter,

    /// The file is damaged and could not be parsed.
    ///
    /// Raised for malformed header XML, missing or non-numeric required attributes and layouts
    /// that point outside the file. The error includes the source location where the
    /// malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A symbol carried a type tag outside the known set.
    #[error("Unknown symbol type {tag:#04x} in field '{field}' at offset {offset}")]
    UnknownSymbolType {
        /// The offending tag byte
        tag: u8,
        /// Byte offset of the tag, relative to the field's symbol range
        offset: usize,
        /// Name of the field being decoded
        field: String,
    },

    // Consistency errors
    /// A symbol of a field runs past the field's declared symbol length.
    #[error("Symbol at offset {offset} of field '{field}' runs past the declared length of {expected} bytes")]
    SymbolOverrun {
        /// Name of the field being decoded
        field: String,
        /// Declared byte length of the field's symbol range
        expected: usize,
        /// Byte offset of the truncated symbol, relative to the field's symbol range
        offset: usize,
    },

    /// The number of index records differs from the header's declared row count.
    #[error("Record count mismatch: header declares {expected}, index section holds {found}")]
    RecordCountMismatch {
        /// Row count declared in the header
        expected: usize,
        /// Records actually present in the index section
        found: usize,
    },

    /// An index record referenced a symbol beyond the end of its field's symbol table.
    #[error("Row {row} references symbol {index} of field '{field}', which only has {symbols}")]
    SymbolIndexOutOfRange {
        /// Name of the field
        field: String,
        /// Row holding the reference
        row: usize,
        /// The biased symbol index
        index: i64,
        /// Number of symbols the field has
        symbols: usize,
    },

    // Access errors
    /// A row outside `[0, row_count)` was requested.
    #[error("Row {index} is out of range for a table with {row_count} rows")]
    RowOutOfRange {
        /// The requested row
        index: usize,
        /// Number of rows in the table
        row_count: usize,
    },

    /// A column outside `[0, column_count)` was requested.
    #[error("Column {index} is out of range for a table with {column_count} columns")]
    ColumnOutOfRange {
        /// The requested column
        index: usize,
        /// Number of columns in the table
        column_count: usize,
    },

    /// A column was referenced by a name the table does not have.
    #[error("Column '{0}' does not exist")]
    ColumnNotFound(String),

    /// An out of bound access was attempted while parsing the file.
    ///
    /// This error occurs when trying to read data beyond the end of the file or a section.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors such as missing files or permission issues.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The table could not be moved across the serialization boundary.
    #[error("Transfer encoding failed - {0}")]
    Transfer(String),

    // Worker errors
    /// A job with this identifier has not completed yet.
    #[error("Job {0} is already in flight")]
    JobInFlight(JobId),

    /// The job was cancelled before its result was published.
    #[error("Job {0} was cancelled")]
    Cancelled(JobId),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external library errors with additional context.
    #[error("{0}")]
    Error(String),
}

impl From<bincode::Error> for Error {
    fn from(error: bincode::Error) -> Self {
        Error::Transfer(error.to_string())
    }
}
