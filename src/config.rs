//! Decode configuration
//!
//! Controls how much of the decode runs on the rayon pool. The result of a decode never depends
//! on the configuration; only its scheduling does.

/// Configuration for decoding a QVD file
///
/// Symbol decoding (per field) and index decoding (per record) operate on disjoint, read-only
/// ranges of the same buffer and may run concurrently. Small tables are faster to decode on the
/// calling thread, so index decoding falls back to a sequential pass below a row threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Decode the symbol table and the index table concurrently on the rayon pool
    pub parallel: bool,

    /// Minimum number of rows before index records are split across worker threads
    pub parallel_row_threshold: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_row_threshold: 4096,
        }
    }
}

impl DecodeConfig {
    /// Creates a configuration that decodes everything on the calling thread
    ///
    /// Useful when the caller already runs on a dedicated worker, or inside a pool it does not
    /// want to oversubscribe.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            parallel_row_threshold: usize::MAX,
        }
    }

    /// Creates a configuration that parallelizes regardless of table size
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            parallel_row_threshold: 0,
        }
    }

    /// Returns true if `rows` index records should be decoded in parallel
    #[must_use]
    pub fn parallel_rows(&self, rows: usize) -> bool {
        self.parallel && rows >= self.parallel_row_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let default = DecodeConfig::default();
        assert!(default.parallel);
        assert!(!default.parallel_rows(10));
        assert!(default.parallel_rows(4096));

        let sequential = DecodeConfig::sequential();
        assert!(!sequential.parallel_rows(usize::MAX));

        let parallel = DecodeConfig::parallel();
        assert!(parallel.parallel_rows(0));
    }
}
