// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # qvdscope
//!
//! A fast, read-only decoder for QVD files, the columnar data-exchange format written by
//! QlikView and Qlik Sense.
//!
//! A QVD file consists of three consecutive parts:
//!
//! ```text
//! +---------------------------+------+----------------+---------------------------+
//! | XML header                | CRLF | symbol section | index section             |
//! | (fields, layout, counts)  | NUL  | (per field)    | (NoOfRecords x RecordSize)|
//! +---------------------------+------+----------------+---------------------------+
//! ```
//!
//! The header describes every field: where its distinct values ("symbols") live in the symbol
//! section, and which bits of each fixed-size index record select one of them. Decoding turns
//! the file into a [`QvdTable`] whose rows resolve to plain [`Value`]s.
//!
//! ## Features
//!
//! - **Memory-mapped input** - Files are mapped read-only and never copied
//! - **Parallel decoding** - Symbol fields and index records decode on the rayon pool
//! - **Strict validation** - Corrupted files fail with a typed [`Error`], never a partial table
//! - **Background jobs** - [`Worker`] decodes files off the calling thread with a completion channel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qvdscope::prelude::*;
//!
//! let table = QvdTable::from_file("data/orders.qvd")?;
//! println!("Columns: {:?}", table.field_names());
//!
//! for row in 0..table.row_count().min(5) {
//!     let values: Vec<String> = table.row(row)?.iter().map(ToString::to_string).collect();
//!     println!("{}", values.join(" | "));
//! }
//! # Ok::<(), qvdscope::Error>(())
//! ```
//!
//! ### Filtering and sorting
//!
//! ```rust,no_run
//! use qvdscope::{Filter, FilterOperation, Value};
//!
//! let frame = qvdscope::decode("data/orders.qvd")?.to_frame()?;
//! let large = frame
//!     .filter(&Filter::new("Amount", FilterOperation::GreaterThan, Value::Integer(1000)))?
//!     .sort_by("Amount", false)?;
//! println!("{} large orders", large.row_count());
//! # Ok::<(), qvdscope::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never installs a logger.
//! `info` reports decode start and finish, `debug` the section layout and symbol counts, `trace`
//! the bit layout of each field.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use qvdscope::prelude::*;
///
/// let table = decode("data/orders.qvd")?;
/// let frame: TableFrame = table.to_frame()?;
/// # Ok::<(), qvdscope::Error>(())
/// ```
pub mod prelude;

/// Decode configuration presets
pub mod config;

/// Header parsing: section layout, field descriptors and table metadata
///
/// # Key Types
///
/// - [`header::QvdHeader`] - Table metadata and section offsets
/// - [`header::FieldDescriptor`] - Symbol range and bit layout of one field
///
/// # Examples
///
/// ```rust,no_run
/// let data = std::fs::read("data/orders.qvd")?;
/// let header = qvdscope::header::parse(&data)?;
/// for field in &header.fields {
///     println!("{}: {} bits at {}", field.name, field.bit_width, field.bit_offset);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod header;

/// Symbol section decoding and the [`Value`] model
pub mod symbols;

/// Index section decoding: bit-packed symbol indices per row
pub mod index;

/// The assembled table, its materialized frame, filtering and sorting
pub mod table;

/// Background decoding on a dedicated thread pool
pub mod worker;

mod decoder;

/// `qvdscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust,no_run
/// use qvdscope::{QvdTable, Result};
///
/// fn load(path: &str) -> Result<QvdTable> {
///     QvdTable::from_file(path)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `qvdscope` Error type
///
/// The main error type for all operations in this crate. Distinguishes I/O failures from
/// corrupted or unsupported files, and both from invalid row or column access.
///
/// # Examples
///
/// ```rust,no_run
/// use qvdscope::{decode, Error};
///
/// match decode("data/orders.qvd") {
///     Ok(table) => println!("Loaded {} rows", table.row_count()),
///     Err(Error::FileError(error)) => println!("Could not read file: {}", error),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Controls how much of a decode runs in parallel.
///
/// See [`config::DecodeConfig`] for the available presets.
pub use config::DecodeConfig;

/// Whole-file decoding entry points.
pub use decoder::{
    decode, decode_bytes, decode_bytes_with_config, decode_file, decode_with_config,
};

/// Low-level input handling: the immutable input buffer and the cursor used to read it.
///
/// # Examples
///
/// ```rust,no_run
/// use qvdscope::{decode_file, DecodeConfig, File};
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("data/orders.qvd"))?;
/// let table = decode_file(&file, DecodeConfig::sequential())?;
/// # Ok::<(), qvdscope::Error>(())
/// ```
pub use file::{parser::Parser, File};

/// Table metadata types.
pub use header::{FieldDescriptor, QvdHeader};

/// Decoded symbol values.
pub use symbols::{SymbolType, Value};

/// The decoded table and its materialized, filterable form.
pub use table::{Filter, FilterOperation, QvdTable, TableFrame};

/// Background decoding.
pub use worker::{JobCompletion, JobId, Worker};
