//! Filtering and sorting of materialized tables.
//!
//! A [`TableFrame`] is the fully materialized form of a [`super::QvdTable`], the shape a
//! presentation layer consumes. Transformations never modify the frame they are applied to,
//! they return a new one.
//!
//! Cells are compared by kind when a column holds a single value kind: numbers numerically,
//! strings lexically. Columns mixing kinds, and the string operations
//! [`FilterOperation::BeginsWith`] / [`FilterOperation::EndsWith`], compare the display text of
//! the cells instead.

use std::{cmp::Ordering, collections::HashSet, mem};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{symbols::Value, Error, Result};

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum FilterOperation {
    /// Cell equals the value
    #[strum(serialize = "eq")]
    Equal,
    /// Cell differs from the value
    #[strum(serialize = "ne")]
    NotEqual,
    /// Cell is greater than the value
    #[strum(serialize = "gt")]
    GreaterThan,
    /// Cell is greater than or equal to the value
    #[strum(serialize = "ge")]
    GreaterThanOrEqual,
    /// Cell is less than the value
    #[strum(serialize = "lt")]
    LessThan,
    /// Cell is less than or equal to the value
    #[strum(serialize = "le")]
    LessThanOrEqual,
    /// Cell text starts with the value text
    #[strum(serialize = "bw")]
    BeginsWith,
    /// Cell text ends with the value text
    #[strum(serialize = "ew")]
    EndsWith,
}

impl FilterOperation {
    /// True for operations that are only defined on text
    #[must_use]
    pub fn is_textual(self) -> bool {
        matches!(self, FilterOperation::BeginsWith | FilterOperation::EndsWith)
    }

    fn accepts(self, ordering: Option<Ordering>) -> bool {
        match self {
            FilterOperation::Equal => ordering == Some(Ordering::Equal),
            FilterOperation::NotEqual => ordering != Some(Ordering::Equal),
            FilterOperation::GreaterThan => ordering == Some(Ordering::Greater),
            FilterOperation::GreaterThanOrEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOperation::LessThan => ordering == Some(Ordering::Less),
            FilterOperation::LessThanOrEqual => {
                matches!(ordering, Some(Ordering::Less | Ordering::Equal))
            }
            FilterOperation::BeginsWith | FilterOperation::EndsWith => false,
        }
    }
}

/// A single row predicate on a named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Name of the column to test
    pub column: String,
    /// Comparison to apply
    pub operation: FilterOperation,
    /// Right-hand side of the comparison
    pub value: Value,
}

impl Filter {
    /// Creates a new filter
    #[must_use]
    pub fn new(column: impl Into<String>, operation: FilterOperation, value: Value) -> Self {
        Filter {
            column: column.into(),
            operation,
            value,
        }
    }
}

/// A fully materialized table: column names and rows of primary values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableFrame {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows in order, each holding one value per column
    pub data: Vec<Vec<Value>>,
}

impl TableFrame {
    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Position of the column named `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Keeps the rows matching `filter`, in their current order.
    ///
    /// Filtering with [`FilterOperation::Equal`] or [`FilterOperation::NotEqual`] against
    /// [`Value::Null`] selects the null or the non-null rows of the column.
    ///
    /// # Errors
    /// Returns [`crate::Error::ColumnNotFound`] if the frame has no such column.
    pub fn filter(&self, filter: &Filter) -> Result<TableFrame> {
        let column = self.require_column(&filter.column)?;
        let value = filter.value.primary();

        let keep: Box<dyn Fn(&Value) -> bool> = if value.is_null()
            && matches!(
                filter.operation,
                FilterOperation::Equal | FilterOperation::NotEqual
            ) {
            let wanted = filter.operation == FilterOperation::Equal;
            Box::new(move |cell: &Value| cell.is_null() == wanted)
        } else if filter.operation.is_textual() || self.is_mixed(column) {
            let operation = filter.operation;
            let text = value.to_string();
            Box::new(move |cell: &Value| {
                // Nulls only pass a not-equal comparison
                if cell.is_null() {
                    return operation == FilterOperation::NotEqual;
                }

                let cell = cell.to_string();
                match operation {
                    FilterOperation::BeginsWith => cell.starts_with(&text),
                    FilterOperation::EndsWith => cell.ends_with(&text),
                    _ => operation.accepts(Some(cell.as_str().cmp(text.as_str()))),
                }
            })
        } else {
            let operation = filter.operation;
            Box::new(move |cell: &Value| operation.accepts(compare(cell, &value)))
        };

        let data = self
            .data
            .iter()
            .filter(|row| row.get(column).is_some_and(|cell| keep(cell)))
            .cloned()
            .collect();

        Ok(TableFrame {
            columns: self.columns.clone(),
            data,
        })
    }

    /// Applies every filter in turn, keeping rows that match all of them.
    ///
    /// # Errors
    /// Returns [`crate::Error::ColumnNotFound`] for the first unknown column.
    pub fn filter_all(&self, filters: &[Filter]) -> Result<TableFrame> {
        filters
            .iter()
            .try_fold(self.clone(), |frame, filter| frame.filter(filter))
    }

    /// Sorts the rows by one column.
    ///
    /// The sort is stable. Null cells are placed after all other cells in both directions.
    ///
    /// # Errors
    /// Returns [`crate::Error::ColumnNotFound`] if the frame has no such column.
    pub fn sort_by(&self, column: &str, ascending: bool) -> Result<TableFrame> {
        let column = self.require_column(column)?;
        let textual = self.is_mixed(column);

        let mut data = self.data.clone();
        data.sort_by(|left, right| {
            let (left, right) = (&left[column], &right[column]);
            match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = if textual {
                        left.to_string().cmp(&right.to_string())
                    } else {
                        compare(left, right).unwrap_or(Ordering::Equal)
                    };

                    if ascending {
                        ordering
                    } else {
                        ordering.reverse()
                    }
                }
            }
        });

        Ok(TableFrame {
            columns: self.columns.clone(),
            data,
        })
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    fn is_mixed(&self, column: usize) -> bool {
        let kinds: HashSet<_> = self
            .data
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|cell| !cell.is_null())
            .map(mem::discriminant)
            .collect();

        kinds.len() > 1
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::String(_), _) | (_, Value::String(_)) => None,
        _ => left.as_number()?.partial_cmp(&right.as_number()?),
    }
}
