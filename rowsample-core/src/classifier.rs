//! Column classification and full-population dictionary building

use std::sync::Arc;

use tracing::debug;

use crate::dictionary::{CategoricalDictionary, FrozenDictionary};
use crate::error::{Error, Result};
use crate::schema::{ColumnSchema, InferredKind, RowSchema, SourceColumn, SourceKind};
use crate::value::FieldValue;

/// Frozen dictionaries indexed by column; `None` for non-categorical columns
pub type Dictionaries = Vec<Option<Arc<FrozenDictionary>>>;

/// Map a declared column onto its inferred semantic kind
pub fn classify_column(column: &SourceColumn) -> Result<ColumnSchema> {
    let (inferred_kind, date_format) = match column.kind {
        SourceKind::Boolean | SourceKind::Integer | SourceKind::Number => (InferredKind::Numeric, None),
        SourceKind::String => (InferredKind::Categorical, None),
        SourceKind::Date => (InferredKind::Temporal, column.date_format.clone()),
        other => {
            return Err(Error::UnsupportedColumnType {
                column: column.name.clone(),
                kind: other,
            })
        }
    };

    Ok(ColumnSchema {
        name: column.name.clone(),
        source_kind: column.kind,
        inferred_kind,
        date_format,
    })
}

/// Map every declared column onto its inferred kind, failing on the first
/// unsupported declaration
pub fn classify(schema: &RowSchema) -> Result<Vec<ColumnSchema>> {
    schema.columns().iter().map(classify_column).collect()
}

/// Owns the classified columns and the per-column categorical dictionaries
/// of one stream
#[derive(Debug)]
pub struct SchemaClassifier {
    columns: Vec<ColumnSchema>,

    /// One growing dictionary per categorical column
    dictionaries: Vec<Option<CategoricalDictionary>>,

    /// Set once `finalize_dictionaries` has run
    frozen: Option<Dictionaries>,
}

impl SchemaClassifier {
    /// Classify a declared schema and allocate empty dictionaries for its
    /// categorical columns
    pub fn new(schema: &RowSchema) -> Result<Self> {
        let columns = classify(schema)?;
        let dictionaries = columns
            .iter()
            .map(|c| (c.inferred_kind == InferredKind::Categorical).then(CategoricalDictionary::new))
            .collect();

        Ok(Self {
            columns,
            dictionaries,
            frozen: None,
        })
    }

    /// Get the classified columns in schema order
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Check if the dictionaries have been frozen
    pub fn is_finalized(&self) -> bool {
        self.frozen.is_some()
    }

    /// Record a value seen in a column.
    ///
    /// Must be called for every row of the stream, sampled or not, so that
    /// dictionaries cover the whole population. Non-categorical columns and
    /// missing values are ignored.
    pub fn observe(&mut self, column: usize, value: &FieldValue) -> Result<()> {
        if self.frozen.is_some() {
            return Err(Error::DictionaryAlreadyFinalized);
        }

        let slot = self.dictionaries.get_mut(column).ok_or_else(|| {
            Error::InvalidArgument(format!("Column index {} out of range", column))
        })?;

        if let Some(dictionary) = slot {
            if let Some(key) = value.canonical_string() {
                dictionary.insert(&key);
            }
        }
        Ok(())
    }

    /// Record every value of a row
    pub fn observe_row(&mut self, row: &[FieldValue]) -> Result<()> {
        for (column, value) in row.iter().enumerate() {
            self.observe(column, value)?;
        }
        Ok(())
    }

    /// Freeze every dictionary into sorted, index-addressable form.
    ///
    /// Calling this again returns the same frozen dictionaries.
    pub fn finalize_dictionaries(&mut self) -> &Dictionaries {
        if self.frozen.is_none() {
            let frozen: Dictionaries = self
                .dictionaries
                .iter()
                .map(|d| d.as_ref().map(|d| Arc::new(d.freeze())))
                .collect();

            for (column, dictionary) in self.columns.iter().zip(&frozen) {
                if let Some(dictionary) = dictionary {
                    debug!(column = %column.name, values = dictionary.len(), "froze categorical dictionary");
                }
            }

            self.frozen = Some(frozen);
        }

        self.frozen.get_or_insert_with(Vec::new)
    }
}
