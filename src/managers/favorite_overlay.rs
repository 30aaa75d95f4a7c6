//! Favorite overlay for SmartMark.
//!
//! A set of bookmark ids kept in local storage only. The overlay is never
//! sent to the backend and is not checked against the live collection: ids of
//! bookmarks that no longer exist stay inert until pruned.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::services::local_storage::KeyValueStore;
use crate::types::errors::{OverlayError, StorageError};

/// Local storage key holding the JSON array of favorite ids.
pub const FAVORITES_STORAGE_KEY: &str = "smart-bookmark-favorites";

/// Trait defining favorite overlay operations.
pub trait FavoriteOverlayTrait {
    fn load(&mut self) -> BTreeSet<String>;
    fn toggle(&mut self, id: &str) -> Result<BTreeSet<String>, OverlayError>;
    fn prune(&mut self, id: &str) -> Result<bool, OverlayError>;
    fn contains(&self, id: &str) -> bool;
    fn ids(&self) -> &BTreeSet<String>;
}

/// Favorite overlay persisted through a [`KeyValueStore`].
pub struct FavoriteOverlayStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    ids: BTreeSet<String>,
}

impl FavoriteOverlayStore {
    /// Creates an empty overlay using the default storage key. Call `load` to read it.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, FAVORITES_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            ids: BTreeSet::new(),
        }
    }

    /// Reads the stored overlay, reporting malformed content as an error.
    ///
    /// A missing key is an empty overlay. The in-memory set is replaced only
    /// on success.
    pub fn try_load(&mut self) -> Result<BTreeSet<String>, OverlayError> {
        let ids = match self.storage.get(&self.key)? {
            None => BTreeSet::new(),
            Some(raw) => {
                let list: Vec<String> = serde_json::from_str(&raw)
                    .map_err(|e| OverlayError::Corruption(e.to_string()))?;
                list.into_iter().collect()
            }
        };
        self.ids = ids;
        Ok(self.ids.clone())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn persist(&self, ids: &BTreeSet<String>) -> Result<(), OverlayError> {
        let list: Vec<&String> = ids.iter().collect();
        let json = serde_json::to_string(&list)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.storage.set(&self.key, &json)?;
        Ok(())
    }
}

impl FavoriteOverlayTrait for FavoriteOverlayStore {
    /// Loads the overlay, resetting to empty on malformed or unreadable content.
    fn load(&mut self) -> BTreeSet<String> {
        match self.try_load() {
            Ok(ids) => {
                debug!(count = ids.len(), "favorite overlay loaded");
                ids
            }
            Err(e) => {
                warn!(error = %e, key = %self.key, "failed to load favorites, starting empty");
                self.ids.clear();
                BTreeSet::new()
            }
        }
    }

    /// Flips membership of `id` and persists before returning.
    ///
    /// If persisting fails, membership is left as it was.
    fn toggle(&mut self, id: &str) -> Result<BTreeSet<String>, OverlayError> {
        let mut next = self.ids.clone();
        if !next.remove(id) {
            next.insert(id.to_string());
        }
        self.persist(&next)?;
        self.ids = next;
        Ok(self.ids.clone())
    }

    /// Removes `id`. Returns whether it was present.
    fn prune(&mut self, id: &str) -> Result<bool, OverlayError> {
        if !self.ids.contains(id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.remove(id);
        self.persist(&next)?;
        self.ids = next;
        Ok(true)
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }
}
