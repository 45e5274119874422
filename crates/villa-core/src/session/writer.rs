//! Write-behind draft persistence
//!
//! Edits update the in-memory draft immediately; the slot write happens on a
//! background task. Requests are numbered (generations) and applied strictly
//! in submission order. The task publishes the last finished generation and
//! its outcome on a watch channel, so callers can tell "shown to the user"
//! apart from "safe on disk" and can wait for the queue to drain.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::error::PersistFailure;
use crate::models::Slot;
use crate::storage::{SlotStore, StorageError};

/// Durability of the most recent draft edit
#[derive(Debug, Clone)]
pub enum PersistState {
    /// Nothing outstanding; every submitted write reached the store
    Persisted,
    /// At least one write has not finished yet
    Pending,
    /// The most recent finished write failed
    Failed(PersistFailure),
}

impl PersistState {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistState::Persisted)
    }

    pub fn failure(&self) -> Option<&PersistFailure> {
        match self {
            PersistState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A single queued draft write
#[derive(Debug)]
struct WriteRequest {
    generation: u64,
    payload: String,
}

/// What the task last reported
#[derive(Debug, Clone)]
struct WriterStatus {
    completed: u64,
    last_failure: Option<PersistFailure>,
}

/// Handle to the draft writer task
pub(crate) struct DraftWriter {
    request_tx: mpsc::UnboundedSender<WriteRequest>,
    status_rx: watch::Receiver<WriterStatus>,
    submitted: u64,
}

impl DraftWriter {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub(crate) fn spawn(slots: Arc<dyn SlotStore>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(WriterStatus {
            completed: 0,
            last_failure: None,
        });

        tokio::spawn(writer_loop(slots, request_rx, status_tx));

        Self {
            request_tx,
            status_rx,
            submitted: 0,
        }
    }

    /// Queue a draft write and return its generation
    pub(crate) fn submit(&mut self, payload: String) -> u64 {
        self.submitted += 1;
        let generation = self.submitted;
        if self
            .request_tx
            .send(WriteRequest {
                generation,
                payload,
            })
            .is_err()
        {
            warn!(generation, "draft writer has stopped; edit kept in memory only");
        }
        generation
    }

    /// Generation of the most recent submission (0 if none)
    pub(crate) fn submitted(&self) -> u64 {
        self.submitted
    }

    pub(crate) fn state(&self) -> PersistState {
        let status = self.status_rx.borrow();
        Self::state_of(&status, self.submitted)
    }

    /// Wait until every submitted write has finished
    pub(crate) async fn flush(&mut self) -> PersistState {
        let target = self.submitted;
        match self.status_rx.wait_for(|s| s.completed >= target).await {
            Ok(status) => Self::state_of(&status, target),
            Err(_) => PersistState::Failed(PersistFailure {
                generation: target,
                error: Arc::new(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "draft writer stopped",
                ))),
            }),
        }
    }

    fn state_of(status: &WriterStatus, submitted: u64) -> PersistState {
        if status.completed < submitted {
            return PersistState::Pending;
        }
        match &status.last_failure {
            Some(failure) if failure.generation == status.completed => {
                PersistState::Failed(failure.clone())
            }
            _ => PersistState::Persisted,
        }
    }
}

/// Apply queued writes until every handle is dropped
async fn writer_loop(
    slots: Arc<dyn SlotStore>,
    mut request_rx: mpsc::UnboundedReceiver<WriteRequest>,
    status_tx: watch::Sender<WriterStatus>,
) {
    while let Some(request) = request_rx.recv().await {
        let failure = match slots.put(Slot::Draft, &request.payload).await {
            Ok(()) => {
                debug!(generation = request.generation, bytes = request.payload.len(), "draft persisted");
                None
            }
            Err(e) => {
                warn!(generation = request.generation, error = %e, "failed to persist draft");
                Some(PersistFailure {
                    generation: request.generation,
                    error: Arc::new(e),
                })
            }
        };

        status_tx.send_modify(|status| {
            status.completed = request.generation;
            if failure.is_some() {
                status.last_failure = failure;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlotStore;

    #[tokio::test]
    async fn test_writes_apply_in_order() {
        let store = Arc::new(MemorySlotStore::new());
        let mut writer = DraftWriter::spawn(store.clone());

        for i in 0..20 {
            writer.submit(format!("draft-{}", i));
        }
        assert_eq!(writer.submitted(), 20);

        assert!(writer.flush().await.is_persisted());
        assert_eq!(
            store.get(Slot::Draft).await.unwrap().as_deref(),
            Some("draft-19")
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_then_cleared() {
        let store = Arc::new(MemorySlotStore::new().with_capacity(8));
        let mut writer = DraftWriter::spawn(store.clone());

        writer.submit("x".repeat(64));
        let state = writer.flush().await;
        let failure = state.failure().expect("write should fail");
        assert!(failure.is_capacity());
        assert_eq!(failure.generation, 1);

        // A later successful write supersedes the failure
        writer.submit("small".to_string());
        assert!(writer.flush().await.is_persisted());
        assert!(writer.state().is_persisted());
    }

    #[tokio::test]
    async fn test_flush_with_nothing_submitted() {
        let store = Arc::new(MemorySlotStore::new());
        let mut writer = DraftWriter::spawn(store);
        assert!(writer.flush().await.is_persisted());
    }
}
