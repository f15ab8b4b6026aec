//! Sync worker thread implementation.
//!
//! The worker owns the [`DocumentStore`] and runs on its own thread so store
//! I/O never blocks the host loop that drives the list engine. Messages and
//! responses travel over `std::sync::mpsc` channels; each message carries the
//! poster's trace context so worker spans join the host's trace.

use crate::domain::error::{Result, ShoplistError};
use crate::storage::backend::DocumentStore;
use crate::storage::models::ItemDocument;
use crate::worker::{SyncMessage, SyncResponse};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Worker state: the store it drives.
pub struct SyncWorker {
    store: Box<dyn DocumentStore>,
}

impl std::fmt::Debug for SyncWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncWorker").finish_non_exhaustive()
    }
}

impl SyncWorker {
    #[must_use]
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Moves a worker for `store` onto a new thread and returns the host's
    /// handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::Io`] if the thread cannot be spawned.
    pub fn spawn(store: Box<dyn DocumentStore>) -> Result<SyncHandle> {
        let (sender, inbox) = mpsc::channel::<SyncMessage>();
        let (outbox, responses) = mpsc::channel::<SyncResponse>();

        let join = std::thread::Builder::new()
            .name("shoplist-sync".to_string())
            .spawn(move || {
                let mut worker = Self::new(store);
                tracing::debug!("sync worker started");
                for message in inbox {
                    let response = worker.handle_message(message);
                    if outbox.send(response).is_err() {
                        tracing::debug!("host dropped response channel, stopping");
                        break;
                    }
                }
                tracing::debug!("sync worker stopped");
            })?;

        Ok(SyncHandle {
            sender: Some(sender),
            responses,
            join: Some(join),
        })
    }

    /// Standardizes error handling and success logging across store calls.
    fn handle_db_result<T, F>(operation: &str, result: Result<T>, on_success: F) -> SyncResponse
    where
        F: FnOnce(T) -> SyncResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "store operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::debug!(operation = operation, error = %e, "store operation failed");
                SyncResponse::Error {
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    fn handle_upsert(&mut self, document: &ItemDocument) -> SyncResponse {
        let id = document.id;
        Self::handle_db_result("upsert", self.store.upsert(document), |()| {
            SyncResponse::Upserted { id }
        })
    }

    fn handle_update_text(&mut self, id: i64, text: &str) -> SyncResponse {
        Self::handle_db_result("update text", self.store.update_text(id, text), |()| {
            SyncResponse::TextUpdated { id }
        })
    }

    fn handle_remove(&mut self, id: i64) -> SyncResponse {
        Self::handle_db_result("remove", self.store.remove(id), |existed| {
            SyncResponse::Removed { id, existed }
        })
    }

    fn handle_poll(&mut self) -> SyncResponse {
        Self::handle_db_result("poll", self.store.take_changes(), |changes| {
            tracing::debug!(count = changes.len(), "change feed drained");
            SyncResponse::Changes { changes }
        })
    }

    /// Rebuilds the poster's OpenTelemetry context on this thread.
    ///
    /// The returned guard must be held while the message is handled.
    fn attach_parent_trace_context(message: &SyncMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;

        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);

        Some(otel_context.attach())
    }

    /// Processes one message and returns its response.
    pub fn handle_message(&mut self, message: SyncMessage) -> SyncResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let span = tracing::debug_span!("sync_handle_message", operation = message.operation());
        let _guard = span.entered();

        match message {
            SyncMessage::Upsert { document, .. } => self.handle_upsert(&document),
            SyncMessage::UpdateText { id, text, .. } => self.handle_update_text(id, &text),
            SyncMessage::Remove { id, .. } => self.handle_remove(id),
            SyncMessage::Poll { .. } => self.handle_poll(),
        }
    }
}

/// Host-side handle to a running [`SyncWorker`].
///
/// Dropping the handle closes the message channel and joins the thread.
#[derive(Debug)]
pub struct SyncHandle {
    sender: Option<Sender<SyncMessage>>,
    responses: Receiver<SyncResponse>,
    join: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Queues a message for the worker.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::Sync`] if the worker thread has exited.
    pub fn post(&self, message: SyncMessage) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| ShoplistError::Sync("worker is shut down".to_string()))?;
        sender
            .send(message)
            .map_err(|_| ShoplistError::Sync("worker thread is gone".to_string()))
    }

    /// Returns every response already available without blocking.
    #[must_use]
    pub fn try_recv_all(&self) -> Vec<SyncResponse> {
        self.responses.try_iter().collect()
    }

    /// Waits up to `timeout` for the next response.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::Sync`] on timeout or when the worker has
    /// exited.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SyncResponse> {
        self.responses.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ShoplistError::Sync(format!("no response within {timeout:?}")),
            RecvTimeoutError::Disconnected => ShoplistError::Sync("worker thread is gone".to_string()),
        })
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                tracing::error!("sync worker thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentChange, JsonStore};
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    fn doc(id: i64, text: &str) -> ItemDocument {
        ItemDocument {
            id,
            text: text.to_string(),
            importance: "NORMAL".to_string(),
            is_new_entry: true,
            is_options_expanded: false,
        }
    }

    fn worker(dir: &TempDir) -> SyncWorker {
        let store = JsonStore::open(dir.path().join("store.json"), "UserID-0000").unwrap();
        SyncWorker::new(Box::new(store))
    }

    #[test]
    fn upsert_then_poll_echoes_change() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);

        assert_eq!(
            worker.handle_message(SyncMessage::upsert(doc(1, "milk"))),
            SyncResponse::Upserted { id: 1 }
        );
        assert_eq!(
            worker.handle_message(SyncMessage::poll()),
            SyncResponse::Changes {
                changes: vec![DocumentChange::Added(doc(1, "milk"))]
            }
        );
    }

    #[test]
    fn store_failures_become_error_responses() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);

        let response = worker.handle_message(SyncMessage::update_text(42, "ghost".into()));
        match response {
            SyncResponse::Error { message } => assert!(message.starts_with("update text:")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn remove_reports_existence() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);
        worker.handle_message(SyncMessage::upsert(doc(2, "eggs")));

        assert_eq!(
            worker.handle_message(SyncMessage::remove(2)),
            SyncResponse::Removed { id: 2, existed: true }
        );
        assert_eq!(
            worker.handle_message(SyncMessage::remove(2)),
            SyncResponse::Removed { id: 2, existed: false }
        );
    }

    #[test]
    fn spawned_worker_answers_in_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("store.json"), "UserID-0000").unwrap();
        let handle = SyncWorker::spawn(Box::new(store)).unwrap();

        handle.post(SyncMessage::upsert(doc(5, "tea"))).unwrap();
        handle.post(SyncMessage::update_text(5, "green tea".into())).unwrap();

        assert_eq!(handle.recv_timeout(WAIT).unwrap(), SyncResponse::Upserted { id: 5 });
        assert_eq!(handle.recv_timeout(WAIT).unwrap(), SyncResponse::TextUpdated { id: 5 });
        assert!(handle.try_recv_all().is_empty());
    }

    #[test]
    fn dropping_handle_flushes_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = JsonStore::open(path.clone(), "UserID-0000").unwrap();
            let handle = SyncWorker::spawn(Box::new(store)).unwrap();
            handle.post(SyncMessage::upsert(doc(9, "jam"))).unwrap();
        }

        let store = JsonStore::open(path, "UserID-0000").unwrap();
        assert_eq!(store.find_by_id(9).unwrap(), Some(doc(9, "jam")));
    }
}
