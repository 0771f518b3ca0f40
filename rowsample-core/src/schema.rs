//! Declared row schemas and their inferred column kinds

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Type declared for a column by the upstream row producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// True/false values
    Boolean,

    /// Whole numbers
    Integer,

    /// Floating point numbers
    Number,

    /// Free text
    String,

    /// Dates, optionally with a format pattern
    Date,

    /// Arbitrary precision decimals
    BigNumber,

    /// Opaque bytes
    Binary,

    /// High resolution timestamps
    Timestamp,

    /// Network addresses
    InetAddress,

    /// Serialized host objects
    Serializable,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Boolean => "Boolean",
            SourceKind::Integer => "Integer",
            SourceKind::Number => "Number",
            SourceKind::String => "String",
            SourceKind::Date => "Date",
            SourceKind::BigNumber => "BigNumber",
            SourceKind::Binary => "Binary",
            SourceKind::Timestamp => "Timestamp",
            SourceKind::InetAddress => "InetAddress",
            SourceKind::Serializable => "Serializable",
        };
        write!(f, "{}", name)
    }
}

/// Semantic kind inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InferredKind {
    /// Encoded as a double
    Numeric,

    /// Encoded as an index into a sorted dictionary
    Categorical,

    /// Encoded as milliseconds since the UNIX epoch
    Temporal,
}

impl InferredKind {
    /// Check if values of this kind are plotted on a continuous axis
    pub fn is_numeric(&self) -> bool {
        matches!(self, InferredKind::Numeric | InferredKind::Temporal)
    }
}

impl fmt::Display for InferredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredKind::Numeric => write!(f, "Numeric"),
            InferredKind::Categorical => write!(f, "Categorical"),
            InferredKind::Temporal => write!(f, "Temporal"),
        }
    }
}

/// A column as declared by the row producer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceColumn {
    /// Name of the column
    pub name: String,

    /// Declared type
    pub kind: SourceKind,

    /// Date format pattern, meaningful for `Date` columns only
    pub date_format: Option<String>,
}

impl SourceColumn {
    /// Create a new column declaration
    pub fn new(name: &str, kind: SourceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            date_format: None,
        }
    }

    /// Create a date column with a format pattern
    pub fn date(name: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SourceKind::Date,
            date_format: Some(format.to_string()),
        }
    }
}

/// The ordered column declarations of a row stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SourceColumn>", into = "Vec<SourceColumn>")]
pub struct RowSchema {
    columns: Vec<SourceColumn>,
    column_indices: HashMap<String, usize>,
}

impl RowSchema {
    /// Create a new schema with the given columns
    pub fn new(columns: Vec<SourceColumn>) -> Self {
        let column_indices = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name.clone(), i))
            .collect();

        Self {
            columns,
            column_indices,
        }
    }

    /// Get all columns in this schema
    pub fn columns(&self) -> &[SourceColumn] {
        &self.columns
    }

    /// Get a column by index
    pub fn column(&self, index: usize) -> Option<&SourceColumn> {
        self.columns.get(index)
    }

    /// Get the index of a column by name
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.column_indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("Column not found: {}", name)))
    }

    /// Get the number of columns in this schema
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if this schema is empty
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Vec<SourceColumn>> for RowSchema {
    fn from(columns: Vec<SourceColumn>) -> Self {
        Self::new(columns)
    }
}

impl From<RowSchema> for Vec<SourceColumn> {
    fn from(schema: RowSchema) -> Self {
        schema.columns
    }
}

impl FromIterator<SourceColumn> for RowSchema {
    fn from_iter<I: IntoIterator<Item = SourceColumn>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for RowSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RowSchema: {} columns", self.columns.len())?;
        for column in &self.columns {
            writeln!(f, "  {}: {}", column.name, column.kind)?;
        }
        Ok(())
    }
}

/// A classified column: declared kind plus the inferred semantic kind.
///
/// Immutable once created; only the categorical dictionary attached to the
/// column keeps changing while rows stream in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Name of the column
    pub name: String,

    /// Declared source type
    pub source_kind: SourceKind,

    /// Inferred semantic kind
    pub inferred_kind: InferredKind,

    /// Date format captured for temporal columns
    pub date_format: Option<String>,
}

impl ColumnSchema {
    /// Check if this column is plotted on a continuous axis
    pub fn is_numeric(&self) -> bool {
        self.inferred_kind.is_numeric()
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.name, self.inferred_kind, self.source_kind)
    }
}

/// Axis-selector entry for a column: its name and whether it is numeric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Inferred kind
    pub kind: InferredKind,

    /// Whether the column is plotted on a continuous axis
    pub is_numeric: bool,
}

impl From<&ColumnSchema> for ColumnDescriptor {
    fn from(column: &ColumnSchema) -> Self {
        Self {
            name: column.name.clone(),
            kind: column.inferred_kind,
            is_numeric: column.is_numeric(),
        }
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_numeric { "Numeric" } else { "Categorical" };
        write!(f, "({}) {}", kind, self.name)
    }
}
