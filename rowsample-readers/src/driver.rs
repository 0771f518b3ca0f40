//! Pull-based stream driver

use rowsample_core::{StreamSession, TypedDataset};
use tracing::{debug, warn};

use crate::error::Result;
use crate::source::RowSource;

/// Run a whole stream through a session and return the built dataset.
///
/// Binds the source's schema, pulls rows until the source ends or the
/// session's row cap is reached, then finishes the session. A failing
/// source aborts the stream without finishing the session.
pub fn drive<S: RowSource + ?Sized>(source: &mut S, session: &mut StreamSession) -> Result<TypedDataset> {
    session.bind_schema(source.schema())?;

    loop {
        if session.is_capped() {
            debug!(session = %session.id(), rows = session.rows_seen(), "row cap reached, stopping source");
            break;
        }

        match source.next_row() {
            Ok(Some(row)) => session.push_row(row)?,
            Ok(None) => break,
            Err(e) => {
                warn!(session = %session.id(), error = %e, "row source failed");
                return Err(e);
            }
        }
    }

    Ok(session.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsample_core::{FieldValue, RawRow, RowSchema, SessionConfig, SourceColumn, SourceKind};

    use crate::error::Error;
    use crate::source::MemoryRowSource;

    fn schema() -> RowSchema {
        RowSchema::new(vec![SourceColumn::new("n", SourceKind::Integer)])
    }

    fn rows(n: i64) -> Vec<RawRow> {
        (0..n).map(|i| vec![FieldValue::Integer(i)]).collect()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    /// Yields a few rows, then fails
    struct FailingSource {
        schema: RowSchema,
        remaining: u32,
    }

    impl RowSource for FailingSource {
        fn schema(&self) -> &RowSchema {
            &self.schema
        }

        fn next_row(&mut self) -> Result<Option<RawRow>> {
            if self.remaining == 0 {
                return Err(Error::Source("connection reset".into()));
            }
            self.remaining -= 1;
            Ok(Some(vec![FieldValue::Integer(1)]))
        }
    }

    #[test]
    fn test_drive_memory_source() {
        let mut source = MemoryRowSource::new(schema(), rows(50));
        let mut session = StreamSession::new(SessionConfig::reservoir(10, 1));

        let dataset = drive(&mut source, &mut session).unwrap();
        assert_eq!(dataset.num_rows(), 10);
        assert_eq!(session.rows_seen(), 50);
    }

    #[test]
    fn test_drive_stops_at_cap() {
        init_tracing();
        let mut source = MemoryRowSource::new(schema(), rows(50));
        let mut session = StreamSession::new(SessionConfig::first_rows(5));

        let dataset = drive(&mut source, &mut session).unwrap();
        assert_eq!(dataset.num_rows(), 5);
        assert_eq!(source.rows_hint(), Some(45));
        assert_eq!(session.rows_dropped(), 0);
    }

    #[test]
    fn test_source_failure_propagates() {
        init_tracing();
        let mut source = FailingSource {
            schema: schema(),
            remaining: 3,
        };
        let mut session = StreamSession::default();

        assert!(matches!(drive(&mut source, &mut session), Err(Error::Source(_))));
        assert_eq!(session.rows_seen(), 3);
    }

    #[test]
    fn test_core_errors_are_wrapped() {
        let schema = RowSchema::new(vec![SourceColumn::new("b", SourceKind::Binary)]);
        let mut source = MemoryRowSource::new(schema, Vec::new());
        let mut session = StreamSession::default();

        assert!(matches!(
            drive(&mut source, &mut session),
            Err(Error::Core(rowsample_core::Error::UnsupportedColumnType { .. }))
        ));
    }
}
