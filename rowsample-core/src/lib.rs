//! Single-pass sampling and schema inference for row streams
//!
//! This crate turns an unbounded stream of rows with a declared schema into
//! a fixed-size, typed dataset suitable for plotting. Rows are classified
//! column by column, categorical dictionaries are built over the whole
//! stream, and a reservoir keeps a bounded random sample of the raw rows.
//! At the end of the stream the sample is converted into a
//! [`TypedDataset`] whose categorical cells index the sorted dictionaries.

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod dictionary;
pub mod error;
pub mod reservoir;
pub mod schema;
pub mod session;
pub mod temporal;
pub mod value;

// Re-export key types for convenience
pub use classifier::{Dictionaries, SchemaClassifier};
pub use config::{SamplingMode, SessionConfig};
pub use dataset::{DatasetBuilder, DatasetHeader, TypedDataset, TypedRecord, TypedValue};
pub use dictionary::{CategoricalDictionary, FrozenDictionary};
pub use error::{ConversionError, Error, Result};
pub use reservoir::{ReservoirSampler, SampleBuffer};
pub use schema::{ColumnDescriptor, ColumnSchema, InferredKind, RowSchema, SourceColumn, SourceKind};
pub use session::{SessionState, StreamSession};
pub use value::{parse_bool, FieldValue, RawRow};
