//! # Data Loading Errors
//!
//! Failures reading bank master data or mapping files. Validation outcomes
//! are never errors; they are [`blz_core::ResultCode`] values.
//!
//! Parsers skip individual malformed lines with a warning. Only conditions
//! that make a whole file unusable surface as [`DataError`].

use std::path::PathBuf;

use thiserror::Error;

/// Error loading bank directory or mapping data.
#[derive(Error, Debug)]
pub enum DataError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A mapping directive is unusable, so its data lines cannot be read.
    #[error("line {line}: invalid directive: {reason}")]
    InvalidDirective {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the directive.
        reason: String,
    },

    /// The input contained no usable records.
    #[error("no usable records in {0}")]
    Empty(String),
}
