//! Debounced snapshot persistence.
//!
//! Each cache owns one writer. Every mutation hands the writer a full snapshot;
//! the writer keeps only the latest one and writes it once no new snapshot has
//! arrived for the debounce delay. Write failures are logged and dropped: the
//! in-memory cache stays authoritative for the running process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use heurix_protocols::KeyValueStore;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Snapshot(serde_json::Value),
    Flush(oneshot::Sender<()>),
}

/// Background writer that coalesces snapshots for one storage key.
pub struct DebouncedWriter {
    key: String,
    tx: mpsc::UnboundedSender<Command>,
}

impl DebouncedWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>, key: impl Into<String>, delay: Duration) -> Self {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, store, key.clone(), delay));
        Self { key, tx }
    }

    /// Storage key this writer persists to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue a snapshot. Restarts the debounce timer.
    pub fn schedule(&self, snapshot: serde_json::Value) {
        if self.tx.send(Command::Snapshot(snapshot)).is_err() {
            warn!("Persistence task for '{}' has stopped; snapshot dropped", self.key);
        }
    }

    /// Write any pending snapshot now and wait for it.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Command>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    delay: Duration,
) {
    let mut pending: Option<serde_json::Value> = None;

    loop {
        let command = if pending.is_some() {
            tokio::select! {
                command = rx.recv() => command,
                _ = tokio::time::sleep(delay) => {
                    if let Some(snapshot) = pending.take() {
                        write(store.as_ref(), &key, snapshot).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Snapshot(snapshot)) => pending = Some(snapshot),
            Some(Command::Flush(ack)) => {
                if let Some(snapshot) = pending.take() {
                    write(store.as_ref(), &key, snapshot).await;
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(snapshot) = pending.take() {
                    write(store.as_ref(), &key, snapshot).await;
                }
                break;
            }
        }
    }
}

async fn write(store: &dyn KeyValueStore, key: &str, snapshot: serde_json::Value) {
    let items = HashMap::from([(key.to_string(), snapshot)]);
    match store.set(items).await {
        Ok(()) => debug!("Persisted snapshot for '{}'", key),
        Err(e) => warn!("Failed to persist '{}': {}", key, e),
    }
}
