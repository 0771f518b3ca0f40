//! Typed datasets built from sampled rows
//!
//! Every cell of a [`TypedDataset`] is a double or [`TypedValue::Missing`]:
//! numeric columns hold their value, categorical columns hold the index of
//! the value in the column's frozen dictionary, temporal columns hold epoch
//! milliseconds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::Dictionaries;
use crate::dictionary::FrozenDictionary;
use crate::error::{ConversionError, Error, Result};
use crate::reservoir::SampleBuffer;
use crate::schema::{ColumnDescriptor, ColumnSchema, InferredKind, SourceKind};
use crate::temporal::DateParser;
use crate::value::{parse_bool, FieldValue};

/// Default relation name given to built datasets
pub const DEFAULT_RELATION_NAME: &str = "rowsample";

/// A single typed cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    /// No data point for this dimension
    Missing,

    /// Numeric encoding of the value
    Value(f64),
}

impl TypedValue {
    /// Get the encoded value, or `None` if missing
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Missing => None,
            TypedValue::Value(v) => Some(*v),
        }
    }

    /// Check if this cell is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, TypedValue::Missing)
    }
}

/// One converted row
pub type TypedRecord = Vec<TypedValue>;

/// Column layout and frozen dictionaries of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetHeader {
    /// Relation name
    pub relation: String,

    /// Classified columns in schema order
    pub columns: Vec<ColumnSchema>,

    /// Frozen dictionary per column; `None` for non-categorical columns
    pub dictionaries: Dictionaries,
}

impl DatasetHeader {
    /// Create a header with the default relation name
    pub fn new(columns: Vec<ColumnSchema>, dictionaries: Dictionaries) -> Self {
        Self {
            relation: DEFAULT_RELATION_NAME.to_string(),
            columns,
            dictionaries,
        }
    }

    /// Get the number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the header has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Immutable typed dataset handed to presentation layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedDataset {
    header: DatasetHeader,
    records: Vec<TypedRecord>,
}

impl TypedDataset {
    /// Get the header
    pub fn header(&self) -> &DatasetHeader {
        &self.header
    }

    /// Get all records in buffer slot order
    pub fn records(&self) -> &[TypedRecord] {
        &self.records
    }

    /// Get the number of records
    pub fn num_rows(&self) -> usize {
        self.records.len()
    }

    /// Get the number of columns
    pub fn num_columns(&self) -> usize {
        self.header.len()
    }

    /// Check if the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get one column as a vector of cells
    pub fn column(&self, index: usize) -> Option<Vec<TypedValue>> {
        (index < self.num_columns()).then(|| self.records.iter().map(|r| r[index]).collect())
    }

    /// Count the missing cells of a column
    pub fn missing_count(&self, index: usize) -> usize {
        self.records
            .iter()
            .filter(|r| r.get(index).is_some_and(TypedValue::is_missing))
            .count()
    }

    /// Get the frozen dictionary of a categorical column
    pub fn dictionary(&self, index: usize) -> Option<&FrozenDictionary> {
        self.header.dictionaries.get(index)?.as_deref()
    }

    /// Resolve a categorical cell back to its string value
    pub fn category_label(&self, column: usize, value: TypedValue) -> Option<&str> {
        let index = value.as_f64()?;
        if index < 0.0 || index.fract() != 0.0 {
            return None;
        }
        self.dictionary(column)?.value(index as u32)
    }

    /// Column descriptors for axis selection, in schema order
    pub fn column_descriptors(&self) -> Vec<ColumnDescriptor> {
        self.header.columns.iter().map(ColumnDescriptor::from).collect()
    }

    /// Clamp a preferred axis column to the available columns
    pub fn default_axis(&self, preferred: usize) -> Option<usize> {
        let last = self.num_columns().checked_sub(1)?;
        Some(preferred.min(last))
    }
}

/// Converts sampled raw rows into a [`TypedDataset`]
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    header: DatasetHeader,
    parsers: Vec<Option<DateParser>>,
}

impl DatasetBuilder {
    /// Create a builder from classified columns and frozen dictionaries
    pub fn new(columns: Vec<ColumnSchema>, dictionaries: Dictionaries) -> Result<Self> {
        if columns.len() != dictionaries.len() {
            return Err(Error::InvalidArgument(format!(
                "{} columns but {} dictionary slots",
                columns.len(),
                dictionaries.len()
            )));
        }

        let parsers = columns
            .iter()
            .map(|c| {
                (c.inferred_kind == InferredKind::Temporal)
                    .then(|| DateParser::new(c.date_format.as_deref()))
            })
            .collect();

        Ok(Self {
            header: DatasetHeader::new(columns, dictionaries),
            parsers,
        })
    }

    /// Set the relation name of the built dataset
    pub fn relation(mut self, name: &str) -> Self {
        self.header.relation = name.to_string();
        self
    }

    /// Convert one raw row
    pub fn convert_row(&self, row: &[FieldValue]) -> Result<TypedRecord> {
        if row.len() != self.header.len() {
            return Err(Error::ArityMismatch {
                expected: self.header.len(),
                actual: row.len(),
            });
        }

        row.iter()
            .enumerate()
            .map(|(i, value)| self.convert_value(i, value).map_err(Error::from))
            .collect()
    }

    fn convert_value(&self, index: usize, value: &FieldValue) -> std::result::Result<TypedValue, ConversionError> {
        if value.is_missing() {
            return Ok(TypedValue::Missing);
        }

        let column = &self.header.columns[index];
        let encoded = match column.inferred_kind {
            InferredKind::Numeric => numeric_value(column, value)?,
            InferredKind::Categorical => {
                let key = value.canonical_string().unwrap_or_default();
                let position = self.header.dictionaries[index]
                    .as_ref()
                    .and_then(|d| d.index_of(&key))
                    .ok_or_else(|| ConversionError::UnknownCategory {
                        column: column.name.clone(),
                        value: key,
                    })?;
                f64::from(position)
            }
            InferredKind::Temporal => {
                let parser = self.parsers[index]
                    .as_ref()
                    .ok_or_else(|| bad_date(column, value, "ISO-8601"))?;
                parser
                    .epoch_millis(value)
                    .ok_or_else(|| bad_date(column, value, parser.describe()))?
            }
        };

        Ok(TypedValue::Value(encoded))
    }

    /// Convert every occupied slot of a sample buffer, in slot order.
    ///
    /// Fails on the first row that cannot be converted.
    pub fn build(self, buffer: SampleBuffer) -> Result<TypedDataset> {
        let records = buffer
            .rows()
            .map(|row| self.convert_row(row))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            relation = %self.header.relation,
            rows = records.len(),
            columns = self.header.len(),
            "built typed dataset"
        );

        Ok(TypedDataset {
            header: self.header,
            records,
        })
    }
}

fn numeric_value(column: &ColumnSchema, value: &FieldValue) -> std::result::Result<f64, ConversionError> {
    match (column.source_kind, value) {
        (_, FieldValue::Boolean(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        (_, FieldValue::Integer(i)) => Ok(*i as f64),
        (_, FieldValue::Number(n)) => Ok(*n),
        (SourceKind::Boolean, FieldValue::String(s)) => parse_bool(s)
            .map(|b| if b { 1.0 } else { 0.0 })
            .ok_or_else(|| type_mismatch(column, value)),
        (_, FieldValue::String(s)) => s.trim().parse::<f64>().map_err(|_| type_mismatch(column, value)),
        _ => Err(type_mismatch(column, value)),
    }
}

fn type_mismatch(column: &ColumnSchema, value: &FieldValue) -> ConversionError {
    ConversionError::TypeMismatch {
        column: column.name.clone(),
        expected: column.source_kind.to_string(),
        found: format!("{} '{}'", value.variant_name(), value),
    }
}

fn bad_date(column: &ColumnSchema, value: &FieldValue, format: &str) -> ConversionError {
    ConversionError::BadDateFormat {
        column: column.name.clone(),
        value: value.to_string(),
        format: format.to_string(),
    }
}
