use std::sync::Arc;

use super::kv::KeyValueStore;
use crate::error::AppResult;
use crate::models::MovieId;

/// Reads and writes the wishlist as a JSON array of movie ids under one key
///
/// Uniqueness and ordering are the caller's concern; this only moves bytes.
#[derive(Clone)]
pub struct WishlistStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl WishlistStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the stored ids. A missing key, an unreadable backend and a corrupt
    /// value all yield an empty list.
    pub async fn load(&self) -> Vec<MovieId> {
        let raw = match self.backend.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No persisted wishlist found");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to read persisted wishlist"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<MovieId>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Persisted wishlist is malformed");
                Vec::new()
            }
        }
    }

    /// Overwrites the stored value with `entries`
    pub async fn save(&self, entries: &[MovieId]) -> AppResult<()> {
        let raw = serde_json::to_string(entries)?;
        self.backend.set(&self.key, &raw).await
    }
}
