//! # qvdscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the qvdscope
//! library. Import this module to get quick access to everything needed to decode, inspect and
//! transform QVD tables.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all qvdscope operations
pub use crate::Error;

/// The result type used throughout qvdscope
pub use crate::Result;

/// Configuration for parallelism during decoding
pub use crate::DecodeConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Whole-file decoding
pub use crate::{decode, decode_bytes, decode_with_config};

/// The decoded table
pub use crate::QvdTable;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Header and Values
// ================================================================================================

/// Table metadata and field layout
pub use crate::header::{FieldDescriptor, NumberFormat, NumberFormatType, QvdHeader};

/// Decoded values and their on-disk tags
pub use crate::symbols::{SymbolType, Value};

// ================================================================================================
// Transformations
// ================================================================================================

/// Materialized rows, filtering and sorting
pub use crate::table::{Filter, FilterOperation, TableFrame};

// ================================================================================================
// Background Decoding
// ================================================================================================

/// Job submission and completion
pub use crate::worker::{JobCompletion, JobId, Worker};
