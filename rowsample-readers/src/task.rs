//! Channel-fed session tasks and background finalization
//!
//! Rows produced concurrently are serialized through an mpsc channel into a
//! single consumer task that owns the [`StreamSession`]. Building the final
//! dataset runs on tokio's blocking pool, and the result is published once
//! through a [`SessionHandle`] or a oneshot receiver.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use rowsample_core::{RawRow, RowSchema, StreamSession, TypedDataset};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};

enum Message {
    Row(RawRow),
    Abort(String),
}

/// Producer side of a session task. Clone it to feed from several producers.
///
/// The stream ends when every sender has been dropped.
#[derive(Debug, Clone)]
pub struct RowSender {
    tx: mpsc::Sender<Message>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Row(row) => write!(f, "Row({} values)", row.len()),
            Message::Abort(reason) => write!(f, "Abort({})", reason),
        }
    }
}

impl RowSender {
    /// Send the next row, waiting for channel capacity
    pub async fn send(&self, row: RawRow) -> Result<()> {
        self.tx.send(Message::Row(row)).await.map_err(|_| Error::Closed)
    }

    /// Send the next row from a synchronous producer thread
    pub fn blocking_send(&self, row: RawRow) -> Result<()> {
        self.tx.blocking_send(Message::Row(row)).map_err(|_| Error::Closed)
    }

    /// Terminate the stream abnormally; the session is not finished
    pub async fn abort(&self, reason: impl Into<String>) -> Result<()> {
        self.tx
            .send(Message::Abort(reason.into()))
            .await
            .map_err(|_| Error::Closed)
    }
}

/// Resolves once to the dataset built by a session task
#[derive(Debug)]
pub struct SessionHandle {
    join: JoinHandle<Result<TypedDataset>>,
}

impl Future for SessionHandle {
    type Output = Result<TypedDataset>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.join).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(Error::TaskFailed(e.to_string())),
        })
    }
}

/// Bind a schema and hand the session to a consumer task fed over a channel
/// of `capacity` rows.
///
/// Schema errors are returned immediately. Must be called within a tokio
/// runtime.
pub fn spawn_session(
    mut session: StreamSession,
    schema: &RowSchema,
    capacity: usize,
) -> Result<(RowSender, SessionHandle)> {
    session.bind_schema(schema)?;
    let (tx, mut rx) = mpsc::channel(capacity.max(1));

    let join = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message {
                Message::Row(row) => session.push_row(row)?,
                Message::Abort(reason) => {
                    warn!(session = %session.id(), %reason, "stream aborted by producer");
                    return Err(Error::Source(reason));
                }
            }
        }

        debug!(session = %session.id(), rows = session.rows_seen(), "all producers done");
        finish_blocking(session).await
    });

    Ok((RowSender { tx }, SessionHandle { join }))
}

/// Drive a session from an asynchronous stream of rows
pub async fn drive_stream<S>(schema: &RowSchema, mut stream: S, mut session: StreamSession) -> Result<TypedDataset>
where
    S: Stream<Item = Result<RawRow>> + Unpin,
{
    session.bind_schema(schema)?;

    while !session.is_capped() {
        match stream.next().await {
            Some(Ok(row)) => session.push_row(row)?,
            Some(Err(e)) => {
                warn!(session = %session.id(), error = %e, "row stream failed");
                return Err(e);
            }
            None => break,
        }
    }

    finish_blocking(session).await
}

/// Finish a session on the blocking pool and publish the result once.
///
/// Must be called within a tokio runtime. If the receiver is dropped the
/// result is discarded.
pub fn finish_in_background(mut session: StreamSession) -> oneshot::Receiver<Result<TypedDataset>> {
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        let result = session.finish().map_err(Error::from);
        let _ = tx.send(result);
    });
    rx
}

async fn finish_blocking(mut session: StreamSession) -> Result<TypedDataset> {
    tokio::task::spawn_blocking(move || session.finish())
        .await
        .map_err(|e| Error::TaskFailed(e.to_string()))?
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsample_core::{FieldValue, SessionConfig, SessionState, SourceColumn, SourceKind};

    fn schema() -> RowSchema {
        RowSchema::new(vec![
            SourceColumn::new("n", SourceKind::Integer),
            SourceColumn::new("tag", SourceKind::String),
        ])
    }

    fn row(i: i64) -> RawRow {
        vec![FieldValue::Integer(i), FieldValue::from(format!("t{}", i % 3))]
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn test_many_producers_one_session() {
        let session = StreamSession::new(SessionConfig::reservoir(0, 1));
        let (sender, handle) = spawn_session(session, &schema(), 8).unwrap();

        let mut producers = Vec::new();
        for p in 0..4 {
            let sender = sender.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..25 {
                    sender.send(row(p * 25 + i)).await.unwrap();
                }
            }));
        }
        drop(sender);
        for producer in producers {
            producer.await.unwrap();
        }

        let dataset = handle.await.unwrap();
        assert_eq!(dataset.num_rows(), 100);
        assert_eq!(dataset.dictionary(1).unwrap().values(), &["t0", "t1", "t2"]);
    }

    #[tokio::test]
    async fn test_blocking_producer_thread() {
        let session = StreamSession::new(SessionConfig::reservoir(5, 2));
        let (sender, handle) = spawn_session(session, &schema(), 4).unwrap();

        let producer = std::thread::spawn(move || {
            for i in 0..40 {
                sender.blocking_send(row(i)).unwrap();
            }
        });

        let dataset = handle.await.unwrap();
        producer.join().unwrap();
        assert_eq!(dataset.num_rows(), 5);
    }

    #[tokio::test]
    async fn test_abort_fails_handle() {
        init_tracing();
        let session = StreamSession::default();
        let (sender, handle) = spawn_session(session, &schema(), 4).unwrap();

        sender.send(row(1)).await.unwrap();
        sender.abort("upstream query failed").await.unwrap();

        assert!(matches!(handle.await, Err(Error::Source(reason)) if reason == "upstream query failed"));
        assert!(matches!(sender.send(row(2)).await, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn test_spawn_rejects_bad_schema() {
        let schema = RowSchema::new(vec![SourceColumn::new("x", SourceKind::Timestamp)]);
        let result = spawn_session(StreamSession::default(), &schema, 4);
        assert!(matches!(result, Err(Error::Core(_))));
    }

    #[tokio::test]
    async fn test_drive_stream_with_cap() {
        init_tracing();
        let rows = futures::stream::iter((0..100).map(|i| Ok(row(i))));
        let session = StreamSession::new(SessionConfig::first_rows(10));

        let dataset = drive_stream(&schema(), rows, session).await.unwrap();
        let first: Vec<f64> = dataset
            .column(0)
            .unwrap()
            .iter()
            .filter_map(|v| v.as_f64())
            .collect();
        assert_eq!(first, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_drive_stream_error() {
        let rows = futures::stream::iter(vec![Ok(row(1)), Err(Error::Source("eof".into()))]);
        let result = drive_stream(&schema(), rows, StreamSession::default()).await;
        assert!(matches!(result, Err(Error::Source(_))));
    }

    #[tokio::test]
    async fn test_finish_in_background() {
        init_tracing();
        let mut session = StreamSession::default();
        session.bind_schema(&schema()).unwrap();
        session.push_row(row(7)).unwrap();
        assert_eq!(session.state(), SessionState::Streaming);

        let dataset = finish_in_background(session).await.unwrap().unwrap();
        assert_eq!(dataset.num_rows(), 1);
        assert_eq!(dataset.category_label(1, dataset.records()[0][1]), Some("t1"));
    }
}
