//! Row sources and stream drivers for sampling sessions
//!
//! This crate feeds [`StreamSession`]s from concrete inputs: in-memory rows,
//! CSV text, producer channels and asynchronous streams.

#![warn(missing_docs)]

mod driver;
mod error;
mod source;
mod task;

#[cfg(feature = "csv")]
pub mod csv;

pub use driver::drive;
pub use error::{Error, Result};
pub use source::{MemoryRowSource, RowSource};
pub use task::{drive_stream, finish_in_background, spawn_session, RowSender, SessionHandle};

// Re-export core types
pub use rowsample_core::{
    FieldValue, RawRow, RowSchema, SessionConfig, SourceColumn, SourceKind, StreamSession, TypedDataset,
};
