//! Error types for row sampling sessions

use std::io;
use thiserror::Error;

use crate::schema::SourceKind;

/// Result type for sampling session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sampling session operations
#[derive(Error, Debug)]
pub enum Error {
    /// A declared column type has no semantic classification
    #[error("Unsupported column type {kind} for column '{column}'")]
    UnsupportedColumnType {
        /// Name of the offending column
        column: String,
        /// Declared source kind
        kind: SourceKind,
    },

    /// A dictionary was observed after it had been frozen
    #[error("Categorical dictionaries are already finalized")]
    DictionaryAlreadyFinalized,

    /// The session has already produced its dataset
    #[error("Session is finalized")]
    SessionFinalized,

    /// The session has no schema bound yet
    #[error("No schema bound to session")]
    NoSchemaBound,

    /// A schema was bound twice
    #[error("A schema is already bound to this session")]
    SchemaAlreadyBound,

    /// A row does not have one value per schema column
    #[error("Row arity mismatch: expected {expected} values, got {actual}")]
    ArityMismatch {
        /// Number of columns in the bound schema
        expected: usize,
        /// Number of values in the row
        actual: usize,
    },

    /// A retained row could not be converted into a typed record
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Failure converting a raw field into its typed encoding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// A categorical value was never observed by the classifier.
    ///
    /// This means a row reached the sampler without passing through the
    /// classifier, which is a wiring bug rather than bad input.
    #[error("Value '{value}' in column '{column}' is missing from its dictionary")]
    UnknownCategory {
        /// Column name
        column: String,
        /// Canonical string form of the value
        value: String,
    },

    /// A temporal value could not be read with the column's date format
    #[error("Cannot read '{value}' in column '{column}' as a date (format: {format})")]
    BadDateFormat {
        /// Column name
        column: String,
        /// Offending value
        value: String,
        /// Format pattern used, or `ISO-8601` when none was declared
        format: String,
    },

    /// A value variant does not fit the column's kind
    #[error("Column '{column}' expects {expected}, found {found}")]
    TypeMismatch {
        /// Column name
        column: String,
        /// Expected kind
        expected: String,
        /// Description of the value found
        found: String,
    },
}
