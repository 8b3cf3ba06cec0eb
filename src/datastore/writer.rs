use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::diagnostics::Diagnostics;
use super::error::StoreError;
use super::storage::KeyValueStorage;

enum WriteRequest {
    Store(Vec<u8>),
    Flush(oneshot::Sender<()>),
}

/// Handle to a background task that writes snapshots in submission order.
///
/// The task drains its queue and stops once the handle is dropped.
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<WriteRequest>,
}

impl SnapshotWriter {
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S: KeyValueStorage>(
        storage: Arc<S>,
        key: String,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(storage, key, diagnostics, rx));
        Self { tx }
    }

    /// Queues `payload` without waiting for it to be written.
    pub fn submit(&self, payload: Vec<u8>) {
        if self.tx.send(WriteRequest::Store(payload)).is_err() {
            error!("snapshot writer stopped, dropping write");
        }
    }

    /// Resolves once every write submitted before this call was attempted.
    pub async fn flush(&self) {
        let (done, callback) = oneshot::channel();
        if self.tx.send(WriteRequest::Flush(done)).is_err() {
            return;
        }
        let _ = callback.await;
    }
}

async fn run<S: KeyValueStorage>(
    storage: Arc<S>,
    key: String,
    diagnostics: Arc<dyn Diagnostics>,
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
) {
    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Store(payload) => {
                let bytes = payload.len();
                match storage.set(&key, payload).await {
                    Ok(()) => debug!(key = &*key, bytes, "snapshot written"),
                    Err(source) => diagnostics.report(&StoreError::StorageWrite {
                        key: key.clone(),
                        source,
                    }),
                }
            }
            WriteRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(key = &*key, "snapshot writer stopped");
}
