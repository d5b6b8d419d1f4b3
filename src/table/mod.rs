//! Assembled QVD tables.
//!
//! [`QvdTable`] combines the symbol table and the index table of a decoded file into a
//! row/column addressable view. Rows are materialized on request by resolving every symbol
//! index to the [primary](crate::Value::primary) value of its symbol; raw symbol indices never
//! leave the table.
//!
//! A table is read-only once constructed. All accessors take `&self`, so any number of threads
//! may materialize different row ranges at the same time.
//!
//! # Examples
//!
//! ```rust,no_run
//! use qvdscope::QvdTable;
//!
//! let table = QvdTable::from_file("data/orders.qvd")?;
//! println!("{:?}", table.field_names());
//! for row in 0..table.row_count().min(10) {
//!     println!("{:?}", table.row(row)?);
//! }
//! # Ok::<(), qvdscope::Error>(())
//! ```

mod transform;

pub use transform::{Filter, FilterOperation, TableFrame};

use std::{ops::Range, path::Path};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    header::QvdHeader, index::IndexTable, symbols::SymbolTable, symbols::Value, DecodeConfig,
    Error, Result,
};

/// A decoded QVD table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QvdTable {
    header: QvdHeader,
    field_names: Vec<String>,
    symbols: SymbolTable,
    index: IndexTable,
}

impl QvdTable {
    /// Assembles a table from its decoded parts.
    ///
    /// # Errors
    /// - [`crate::Error::Malformed`] if the parts disagree on the number of fields
    /// - [`crate::Error::RecordCountMismatch`] if the index does not hold the declared row count
    /// - [`crate::Error::SymbolIndexOutOfRange`] if a row references a symbol its field lacks
    pub fn new(header: QvdHeader, symbols: SymbolTable, index: IndexTable) -> Result<Self> {
        let field_count = header.fields.len();
        if symbols.field_count() != field_count || index.field_count() != field_count {
            return Err(malformed_error!(
                "Field count mismatch: header {}, symbols {}, index {}",
                field_count,
                symbols.field_count(),
                index.field_count()
            ));
        }

        if index.row_count() != header.record_count {
            return Err(Error::RecordCountMismatch {
                expected: header.record_count,
                found: index.row_count(),
            });
        }

        // Constant indices share one record
        let checked_rows = if index.is_constant() {
            index.row_count().min(1)
        } else {
            index.row_count()
        };

        (0..checked_rows).into_par_iter().try_for_each(|row| {
            let Some(record) = index.record(row) else {
                return Ok(());
            };

            for (field, &symbol) in record.iter().enumerate() {
                // A width-0 field without symbols is null in every row
                if header.fields[field].bit_width == 0 {
                    continue;
                }

                let available = symbols.symbols(field).map_or(0, <[Value]>::len);
                if usize::try_from(symbol).is_ok_and(|symbol| symbol >= available) {
                    return Err(Error::SymbolIndexOutOfRange {
                        field: header.fields[field].name.clone(),
                        row,
                        index: symbol,
                        symbols: available,
                    });
                }
            }
            Ok(())
        })?;

        let field_names = header.fields.iter().map(|field| field.name.clone()).collect();

        Ok(QvdTable {
            header,
            field_names,
            symbols,
            index,
        })
    }

    /// Decodes the QVD file at `path` with the default configuration.
    ///
    /// # Errors
    /// See [`crate::decode`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        crate::decode(path)
    }

    /// Decodes a QVD image held in memory with the default configuration.
    ///
    /// # Errors
    /// See [`crate::decode_bytes`].
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        crate::decoder::decode_file(&crate::File::from_mem(data)?, DecodeConfig::default())
    }

    /// Table metadata parsed from the header
    #[must_use]
    pub fn header(&self) -> &QvdHeader {
        &self.header
    }

    /// Column names in declaration order
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of columns
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.field_names.len()
    }

    /// Number of rows, always the header's declared record count
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.index.row_count()
    }

    /// Position of the column named `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.field_names.iter().position(|field| field == name)
    }

    /// The decoded symbols of every field
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The decoded symbol indices of every row
    #[must_use]
    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Primary values of one row, in column order.
    ///
    /// # Errors
    /// Returns [`crate::Error::RowOutOfRange`] if `index >= row_count()`.
    pub fn row(&self, index: usize) -> Result<Vec<Value>> {
        let Some(record) = self.index.record(index) else {
            return Err(Error::RowOutOfRange {
                index,
                row_count: self.row_count(),
            });
        };

        Ok(record
            .iter()
            .enumerate()
            .map(|(field, &symbol)| self.resolve(field, symbol))
            .collect())
    }

    /// Primary value of one cell.
    ///
    /// # Errors
    /// Returns [`crate::Error::RowOutOfRange`] or [`crate::Error::ColumnOutOfRange`].
    pub fn value(&self, row: usize, column: usize) -> Result<Value> {
        let Some(record) = self.index.record(row) else {
            return Err(Error::RowOutOfRange {
                index: row,
                row_count: self.row_count(),
            });
        };

        match record.get(column) {
            Some(&symbol) => Ok(self.resolve(column, symbol)),
            None => Err(Error::ColumnOutOfRange {
                index: column,
                column_count: self.column_count(),
            }),
        }
    }

    /// Primary values of one column, in row order.
    ///
    /// # Errors
    /// Returns [`crate::Error::ColumnOutOfRange`] if `column >= column_count()`.
    pub fn column(&self, column: usize) -> Result<Vec<Value>> {
        if column >= self.column_count() {
            return Err(Error::ColumnOutOfRange {
                index: column,
                column_count: self.column_count(),
            });
        }

        Ok(self
            .index
            .iter()
            .map(|record| self.resolve(column, record[column]))
            .collect())
    }

    /// Materializes a contiguous range of rows, in row order.
    ///
    /// # Errors
    /// Returns [`crate::Error::RowOutOfRange`] if the range extends past the last row.
    pub fn rows(&self, range: Range<usize>) -> Result<Vec<Vec<Value>>> {
        if range.end > self.row_count() {
            return Err(Error::RowOutOfRange {
                index: range.end.saturating_sub(1).max(range.start),
                row_count: self.row_count(),
            });
        }

        range.into_par_iter().map(|row| self.row(row)).collect()
    }

    /// Iterates all rows in order
    pub fn iter(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.index.iter().map(move |record| {
            record
                .iter()
                .enumerate()
                .map(|(field, &symbol)| self.resolve(field, symbol))
                .collect()
        })
    }

    /// Materializes the whole table for hand-off to a presentation layer.
    ///
    /// # Errors
    /// Returns the first row error; a table built through [`QvdTable::new`] yields none.
    pub fn to_frame(&self) -> Result<TableFrame> {
        let data = self.rows(0..self.row_count())?;

        Ok(TableFrame {
            columns: self.field_names.clone(),
            data,
        })
    }

    /// Encodes the table for transfer across a process boundary.
    ///
    /// Field order, symbol order and every populated component of every symbol are preserved
    /// bit for bit.
    ///
    /// # Errors
    /// Returns [`crate::Error::Transfer`] if encoding fails.
    pub fn to_transfer_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decodes a table produced by [`QvdTable::to_transfer_bytes`].
    ///
    /// The parts are re-assembled, so a corrupted transfer cannot yield a table that violates
    /// the invariants of [`QvdTable::new`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Transfer`] if the bytes cannot be decoded, or any error of
    /// [`QvdTable::new`].
    pub fn from_transfer_bytes(data: &[u8]) -> Result<Self> {
        let table: QvdTable = bincode::deserialize(data)?;
        QvdTable::new(table.header, table.symbols, table.index)
    }

    fn resolve(&self, field: usize, symbol: i64) -> Value {
        usize::try_from(symbol)
            .ok()
            .and_then(|symbol| self.symbols.get(field, symbol))
            .map_or(Value::Null, Value::primary)
    }
}
