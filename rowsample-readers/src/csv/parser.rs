//! Cell parsing for delimited text

use rowsample_core::{parse_bool, FieldValue, RawRow, RowSchema, SourceKind};

use crate::error::{Error, Result};

/// Parses delimited text cells into raw field values per declared kind
#[derive(Debug, Clone)]
pub struct CsvParser {
    schema: RowSchema,
}

impl CsvParser {
    /// Create a new parser for a schema
    pub fn new(schema: RowSchema) -> Self {
        Self { schema }
    }

    /// Get the schema
    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Parse one record of cells. `row` is the 1-based record number used
    /// in error messages.
    pub fn parse_record(&self, row: u64, cells: &[&str]) -> Result<RawRow> {
        if cells.len() != self.schema.len() {
            return Err(Error::Format(format!(
                "Record {} has {} fields, expected {}",
                row,
                cells.len(),
                self.schema.len()
            )));
        }

        self.schema
            .columns()
            .iter()
            .zip(cells)
            .map(|(column, &text)| {
                parse_cell(column.kind, text).ok_or_else(|| {
                    Error::Format(format!(
                        "Record {} column '{}': cannot read '{}' as {}",
                        row, column.name, text, column.kind
                    ))
                })
            })
            .collect()
    }
}

/// Parse a single cell. Empty cells are null; dates stay textual so the
/// column's date format can be applied later.
pub fn parse_cell(kind: SourceKind, text: &str) -> Option<FieldValue> {
    if text.is_empty() {
        return Some(FieldValue::Null);
    }

    match kind {
        SourceKind::Boolean => parse_bool(text).map(FieldValue::Boolean),
        SourceKind::Integer => text.trim().parse::<i64>().ok().map(FieldValue::Integer),
        SourceKind::Number => text.trim().parse::<f64>().ok().map(FieldValue::Number),
        _ => Some(FieldValue::String(text.to_string())),
    }
}
