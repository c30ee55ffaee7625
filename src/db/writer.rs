use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::wishlist_store::WishlistStore;
use crate::models::MovieId;

enum PersistCommand {
    Save(Vec<MovieId>),
    Flush(oneshot::Sender<()>),
}

/// Queues wishlist snapshots for a single background writer
///
/// Snapshots reach the store in the order they were queued. When several are
/// waiting, only the newest is written; the final stored value always matches
/// the last snapshot queued.
#[derive(Clone)]
pub struct PersistenceWriter {
    command_tx: mpsc::UnboundedSender<PersistCommand>,
}

/// Handle for gracefully shutting down the persistence writer
pub struct PersistenceWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl PersistenceWriterHandle {
    /// Stops the writer after every queued snapshot has been written
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Persistence writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Persistence writer task failed");
        }
    }
}

impl PersistenceWriter {
    /// Spawns the writer task on the current tokio runtime
    pub fn spawn(store: WishlistStore) -> (Self, PersistenceWriterHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            Self::writer_task(store, command_rx, shutdown_rx).await;
        });

        (
            Self { command_tx },
            PersistenceWriterHandle { shutdown_tx, task },
        )
    }

    /// Queues a full snapshot for writing. Never blocks.
    pub fn enqueue(&self, entries: Vec<MovieId>) {
        if self.command_tx.send(PersistCommand::Save(entries)).is_err() {
            tracing::error!("Persistence writer is stopped, wishlist change not persisted");
        }
    }

    /// Waits until every snapshot queued before this call has been written
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.command_tx.send(PersistCommand::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    async fn writer_task(
        store: WishlistStore,
        mut command_rx: mpsc::UnboundedReceiver<PersistCommand>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(key = %store.key(), "Persistence writer task started");

        loop {
            tokio::select! {
                Some(command) = command_rx.recv() => {
                    let mut batch = vec![command];
                    while let Ok(next) = command_rx.try_recv() {
                        batch.push(next);
                    }
                    Self::apply_batch(&store, batch).await;
                }
                Some(()) = shutdown_rx.recv() => {
                    command_rx.close();
                    let mut batch = Vec::new();
                    while let Some(next) = command_rx.recv().await {
                        batch.push(next);
                    }
                    tracing::info!(pending = batch.len(), "Persistence writer shutting down, flushing remaining writes");
                    Self::apply_batch(&store, batch).await;
                    break;
                }
                else => break,
            }
        }

        tracing::info!("Persistence writer task stopped");
    }

    /// Writes the newest snapshot before each flush marker and at the end
    async fn apply_batch(store: &WishlistStore, batch: Vec<PersistCommand>) {
        let mut pending: Option<Vec<MovieId>> = None;

        for command in batch {
            match command {
                PersistCommand::Save(entries) => pending = Some(entries),
                PersistCommand::Flush(done_tx) => {
                    if let Some(entries) = pending.take() {
                        Self::write(store, &entries).await;
                    }
                    let _ = done_tx.send(());
                }
            }
        }

        if let Some(entries) = pending {
            Self::write(store, &entries).await;
        }
    }

    async fn write(store: &WishlistStore, entries: &[MovieId]) {
        match store.save(entries).await {
            Ok(()) => tracing::debug!(entries = entries.len(), "Wishlist persisted"),
            Err(e) => tracing::error!(error = %e, "Failed to persist wishlist"),
        }
    }
}
