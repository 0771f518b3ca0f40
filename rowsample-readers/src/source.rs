//! Pull-based row sources

use std::collections::VecDeque;

use rowsample_core::{RawRow, RowSchema};

use crate::error::Result;

/// A pull-based sequence of raw rows with a declared schema
pub trait RowSource: Send {
    /// Get the declared schema of the rows
    fn schema(&self) -> &RowSchema;

    /// Retrieve the next row; `None` at the end of the stream.
    ///
    /// An error means the stream terminated abnormally.
    fn next_row(&mut self) -> Result<Option<RawRow>>;

    /// Provides a hint about the number of remaining rows (if known)
    fn rows_hint(&self) -> Option<usize> {
        None
    }
}

/// A row source over rows held in memory
#[derive(Debug, Clone)]
pub struct MemoryRowSource {
    schema: RowSchema,
    rows: VecDeque<RawRow>,
}

impl MemoryRowSource {
    /// Create a new in-memory source
    pub fn new(schema: RowSchema, rows: Vec<RawRow>) -> Self {
        Self {
            schema,
            rows: rows.into(),
        }
    }
}

impl RowSource for MemoryRowSource {
    fn schema(&self) -> &RowSchema {
        &self.schema
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        Ok(self.rows.pop_front())
    }

    fn rows_hint(&self) -> Option<usize> {
        Some(self.rows.len())
    }
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn schema(&self) -> &RowSchema {
        (**self).schema()
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        (**self).next_row()
    }

    fn rows_hint(&self) -> Option<usize> {
        (**self).rows_hint()
    }
}
