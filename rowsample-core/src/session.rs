//! Stream session lifecycle
//!
//! A [`StreamSession`] drives one single-pass stream:
//!
//! ```text
//! Idle --bind_schema--> SchemaBound --push_row--> Streaming --finish--> Finalized
//! ```
//!
//! A finalized session cannot be reused; create a new one per stream.

use std::fmt;

use static_assertions::assert_impl_all;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::classifier::SchemaClassifier;
use crate::config::SessionConfig;
use crate::dataset::{DatasetBuilder, TypedDataset};
use crate::error::{Error, Result};
use crate::reservoir::ReservoirSampler;
use crate::schema::{ColumnDescriptor, RowSchema};
use crate::value::RawRow;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No schema bound yet
    Idle,

    /// Schema bound, no rows yet
    SchemaBound,

    /// At least one row pushed
    Streaming,

    /// Dataset produced; terminal
    Finalized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::SchemaBound => write!(f, "SchemaBound"),
            SessionState::Streaming => write!(f, "Streaming"),
            SessionState::Finalized => write!(f, "Finalized"),
        }
    }
}

/// Samples one row stream and builds a typed dataset from it
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    config: SessionConfig,
    state: SessionState,
    classifier: Option<SchemaClassifier>,
    sampler: ReservoirSampler,
    rows_dropped: u64,
}

assert_impl_all!(StreamSession: Send);

impl StreamSession {
    /// Create an idle session. Sample slots are allocated when the schema
    /// is bound.
    pub fn new(config: SessionConfig) -> Self {
        let sampler = ReservoirSampler::new(0, config.seed);
        Self {
            id: Uuid::new_v4(),
            config,
            state: SessionState::Idle,
            classifier: None,
            sampler,
            rows_dropped: 0,
        }
    }

    /// Get the session id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of rows that went through the classifier and sampler
    pub fn rows_seen(&self) -> u64 {
        self.sampler.rows_seen()
    }

    /// Number of rows ignored because the row cap was reached
    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped
    }

    /// Check if the row cap has been reached; further rows are ignored
    pub fn is_capped(&self) -> bool {
        self.config
            .row_cap()
            .is_some_and(|cap| self.sampler.rows_seen() >= cap)
    }

    /// Column descriptors for axis selection, once a schema is bound
    pub fn column_descriptors(&self) -> Option<Vec<ColumnDescriptor>> {
        self.classifier
            .as_ref()
            .map(|c| c.columns().iter().map(ColumnDescriptor::from).collect())
    }

    /// Bind the declared schema of the stream.
    ///
    /// Classifies every column and resets the sampler with the configured
    /// sample size and seed. An unsupported column type aborts the session.
    pub fn bind_schema(&mut self, schema: &RowSchema) -> Result<()> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Finalized => return Err(Error::SessionFinalized),
            SessionState::SchemaBound | SessionState::Streaming => return Err(Error::SchemaAlreadyBound),
        }

        let classifier = match SchemaClassifier::new(schema) {
            Ok(classifier) => classifier,
            Err(e) => {
                warn!(session = %self.id, error = %e, "schema rejected");
                self.state = SessionState::Finalized;
                return Err(e);
            }
        };

        self.sampler.configure(self.config.sample_size, self.config.seed);
        self.rows_dropped = 0;
        self.classifier = Some(classifier);
        self.state = SessionState::SchemaBound;

        debug!(
            session = %self.id,
            columns = schema.len(),
            sample_size = self.config.sample_size,
            seed = self.config.seed,
            mode = ?self.config.mode,
            "schema bound"
        );
        Ok(())
    }

    /// Push the next row of the stream.
    ///
    /// Every row updates the categorical dictionaries before it is offered
    /// to the reservoir. Once the row cap is reached, rows are ignored.
    pub fn push_row(&mut self, row: RawRow) -> Result<()> {
        match self.state {
            SessionState::Idle => return Err(Error::NoSchemaBound),
            SessionState::Finalized => return Err(Error::SessionFinalized),
            SessionState::SchemaBound | SessionState::Streaming => {}
        }

        if self.is_capped() {
            if self.rows_dropped == 0 {
                debug!(session = %self.id, rows = self.sampler.rows_seen(), "row cap reached");
            }
            self.rows_dropped += 1;
            return Ok(());
        }

        let classifier = self.classifier.as_mut().ok_or(Error::NoSchemaBound)?;
        let expected = classifier.columns().len();
        if row.len() != expected {
            return Err(Error::ArityMismatch {
                expected,
                actual: row.len(),
            });
        }

        classifier.observe_row(&row)?;
        self.sampler.offer(row);
        self.state = SessionState::Streaming;

        trace!(session = %self.id, rows = self.sampler.rows_seen(), "row offered");
        Ok(())
    }

    /// Freeze the dictionaries and convert the sample into a typed dataset.
    ///
    /// The session is finalized afterwards whether or not the build succeeds.
    pub fn finish(&mut self) -> Result<TypedDataset> {
        match self.state {
            SessionState::Idle => return Err(Error::NoSchemaBound),
            SessionState::Finalized => return Err(Error::SessionFinalized),
            SessionState::SchemaBound | SessionState::Streaming => {}
        }
        self.state = SessionState::Finalized;

        let mut classifier = self.classifier.take().ok_or(Error::NoSchemaBound)?;
        let dictionaries = classifier.finalize_dictionaries().clone();
        let buffer = self.sampler.take_buffer();
        let retained = buffer.len();

        let dataset = DatasetBuilder::new(classifier.columns().to_vec(), dictionaries)?
            .build(buffer)
            .map_err(|e| {
                warn!(session = %self.id, error = %e, "dataset build failed");
                e
            })?;

        info!(
            session = %self.id,
            rows_seen = self.sampler.rows_seen(),
            rows_dropped = self.rows_dropped,
            retained,
            "session finished"
        );
        Ok(dataset)
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingMode;
    use crate::schema::{SourceColumn, SourceKind};
    use crate::value::FieldValue;

    fn schema() -> RowSchema {
        RowSchema::new(vec![
            SourceColumn::new("a", SourceKind::Number),
            SourceColumn::new("b", SourceKind::String),
        ])
    }

    fn row(a: f64, b: &str) -> RawRow {
        vec![FieldValue::Number(a), FieldValue::from(b)]
    }

    #[test]
    fn test_state_transitions() {
        let mut session = StreamSession::new(SessionConfig::reservoir(10, 1));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.column_descriptors().is_none());

        session.bind_schema(&schema()).unwrap();
        assert_eq!(session.state(), SessionState::SchemaBound);
        assert_eq!(session.column_descriptors().unwrap().len(), 2);

        session.push_row(row(1.0, "x")).unwrap();
        assert_eq!(session.state(), SessionState::Streaming);

        session.finish().unwrap();
        assert_eq!(session.state(), SessionState::Finalized);
    }

    #[test]
    fn test_slots_allocated_on_bind() {
        let mut session = StreamSession::new(SessionConfig::reservoir(5000, 1));
        assert_eq!(session.sampler.buffer().slot_count(), 0);

        session.bind_schema(&schema()).unwrap();
        assert_eq!(session.sampler.capacity(), 5000);
        assert_eq!(session.sampler.buffer().slot_count(), 5000);
    }

    #[test]
    fn test_protocol_errors() {
        let mut session = StreamSession::default();
        assert!(matches!(session.finish(), Err(Error::NoSchemaBound)));
        assert!(matches!(session.push_row(row(1.0, "x")), Err(Error::NoSchemaBound)));

        session.bind_schema(&schema()).unwrap();
        assert!(matches!(session.bind_schema(&schema()), Err(Error::SchemaAlreadyBound)));
        assert!(matches!(
            session.push_row(vec![FieldValue::Null]),
            Err(Error::ArityMismatch { expected: 2, actual: 1 })
        ));

        session.finish().unwrap();
        assert!(matches!(session.push_row(row(1.0, "x")), Err(Error::SessionFinalized)));
        assert!(matches!(session.finish(), Err(Error::SessionFinalized)));
        assert!(matches!(session.bind_schema(&schema()), Err(Error::SessionFinalized)));
    }

    #[test]
    fn test_unsupported_schema_aborts_session() {
        let mut session = StreamSession::default();
        let schema = RowSchema::new(vec![SourceColumn::new("blob", SourceKind::Binary)]);
        assert!(matches!(
            session.bind_schema(&schema),
            Err(Error::UnsupportedColumnType { .. })
        ));
        assert_eq!(session.state(), SessionState::Finalized);
    }

    #[test]
    fn test_finish_without_rows() {
        let mut session = StreamSession::default();
        session.bind_schema(&schema()).unwrap();
        let dataset = session.finish().unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.num_columns(), 2);
        assert!(dataset.dictionary(1).unwrap().is_empty());
    }

    #[test]
    fn test_row_cap_drops_rows() {
        let mut session = StreamSession::new(SessionConfig::first_rows(2));
        assert_eq!(session.config().mode, SamplingMode::FirstRows);
        session.bind_schema(&schema()).unwrap();

        session.push_row(row(1.0, "x")).unwrap();
        assert!(!session.is_capped());
        session.push_row(row(2.0, "y")).unwrap();
        assert!(session.is_capped());

        session.push_row(row(3.0, "z")).unwrap();
        assert_eq!(session.rows_seen(), 2);
        assert_eq!(session.rows_dropped(), 1);

        let dataset = session.finish().unwrap();
        assert_eq!(dataset.num_rows(), 2);
        // dropped rows never reach the dictionary
        assert_eq!(dataset.dictionary(1).unwrap().values(), &["x", "y"]);
    }

    #[test]
    fn test_conversion_failure_still_finalizes() {
        let schema = RowSchema::new(vec![SourceColumn::date("d", "yyyy-MM-dd")]);
        let mut session = StreamSession::default();
        session.bind_schema(&schema).unwrap();
        session.push_row(vec![FieldValue::from("yesterday")]).unwrap();

        assert!(matches!(session.finish(), Err(Error::Conversion(_))));
        assert_eq!(session.state(), SessionState::Finalized);
    }
}
