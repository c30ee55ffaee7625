use tokio::sync::{watch, RwLock};

use crate::{
    db::{PersistenceWriter, PersistenceWriterHandle, WishlistStore},
    models::{MovieId, Wishlist},
};

/// Result of a mutation
#[derive(Debug, Clone)]
pub struct WishlistUpdate {
    /// False for idempotent no-ops
    pub changed: bool,
    /// The wishlist as left by this mutation, before any later one
    pub wishlist: Wishlist,
}

/// Owns the canonical wishlist for the lifetime of the process
///
/// Built once at startup and shared with every view through `AppState`.
/// Each mutation runs under the write lock, which also covers queueing the
/// persistence write and publishing to subscribers, so both observe changes
/// in exactly the order they were applied.
pub struct WishlistService {
    state: RwLock<Wishlist>,
    writer: PersistenceWriter,
    changes: watch::Sender<Wishlist>,
}

impl WishlistService {
    /// Loads the persisted wishlist and starts its persistence writer
    ///
    /// Missing or corrupt persisted state starts an empty wishlist.
    pub async fn initialize(store: WishlistStore) -> (Self, PersistenceWriterHandle) {
        let wishlist = Wishlist::from_entries(store.load().await);
        tracing::info!(key = %store.key(), entries = wishlist.len(), "Wishlist loaded");

        let (writer, handle) = PersistenceWriter::spawn(store);
        let (changes, _) = watch::channel(wishlist.clone());

        let service = Self {
            state: RwLock::new(wishlist),
            writer,
            changes,
        };

        (service, handle)
    }

    /// Adds `id` to the end of the wishlist. Unchanged if it was already present.
    pub async fn add(&self, id: MovieId) -> WishlistUpdate {
        let update = self.mutate(|wishlist| wishlist.add(id)).await;
        if update.changed {
            tracing::info!(movie_id = %id, "Movie added to wishlist");
        }
        update
    }

    /// Removes `id`. Unchanged if it was not present.
    pub async fn remove(&self, id: MovieId) -> WishlistUpdate {
        let update = self.mutate(|wishlist| wishlist.remove(id)).await;
        if update.changed {
            tracing::info!(movie_id = %id, "Movie removed from wishlist");
        }
        update
    }

    /// Flips membership of `id`
    pub async fn toggle(&self, id: MovieId) -> WishlistUpdate {
        let update = self
            .mutate(|wishlist| {
                if wishlist.contains(id) {
                    wishlist.remove(id)
                } else {
                    wishlist.add(id)
                }
            })
            .await;
        tracing::info!(
            movie_id = %id,
            in_wishlist = update.wishlist.contains(id),
            "Wishlist membership toggled"
        );
        update
    }

    pub async fn contains(&self, id: MovieId) -> bool {
        self.state.read().await.contains(id)
    }

    pub async fn size(&self) -> usize {
        self.state.read().await.len()
    }

    /// Read-only copy of the current wishlist
    pub async fn snapshot(&self) -> Wishlist {
        self.state.read().await.clone()
    }

    /// Receiver that observes the wishlist after every change
    pub fn subscribe(&self) -> watch::Receiver<Wishlist> {
        self.changes.subscribe()
    }

    /// Waits until every change made so far has been handed to the store
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    async fn mutate<F>(&self, op: F) -> WishlistUpdate
    where
        F: FnOnce(&mut Wishlist) -> bool,
    {
        let mut wishlist = self.state.write().await;
        let changed = op(&mut *wishlist);
        let snapshot = wishlist.clone();
        if changed {
            self.writer.enqueue(snapshot.entries().to_vec());
            self.changes.send_replace(snapshot.clone());
        }
        WishlistUpdate {
            changed,
            wishlist: snapshot,
        }
    }
}
