//! Bookmark repository for SmartMark.
//!
//! Binds a [`BookmarkBackend`] to one owner and bounds every call with a
//! request timeout. This is the only component that talks to the backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::database::{BookmarkBackend, Subscription};
use crate::types::bookmark::{Bookmark, BookmarkFields};
use crate::types::errors::{RepositoryError, SyncError, ValidationError};

/// Default bound on a single backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote CRUD and change subscription for a single owner.
#[derive(Clone)]
pub struct BookmarkRepository {
    backend: Arc<dyn BookmarkBackend>,
    owner_id: String,
    timeout: Duration,
}

impl BookmarkRepository {
    pub fn new(backend: Arc<dyn BookmarkBackend>, owner_id: impl Into<String>) -> Self {
        Self {
            backend,
            owner_id: owner_id.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, owner_id = %self.owner_id, error = %e, "backend call failed");
                Err(e)
            }
            Err(_) => {
                let ms = self.timeout.as_millis() as u64;
                warn!(op, owner_id = %self.owner_id, timeout_ms = ms, "backend call timed out");
                Err(RepositoryError::Timeout(ms))
            }
        }
    }

    /// All bookmarks of the owner, newest first.
    ///
    /// The descending `created_at` order is re-applied here with a stable
    /// sort, so equal timestamps keep the backend's order.
    pub async fn fetch_all(&self) -> Result<Vec<Bookmark>, RepositoryError> {
        let mut bookmarks = self
            .bounded("fetch_all", self.backend.fetch_all(&self.owner_id))
            .await?;
        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(owner_id = %self.owner_id, count = bookmarks.len(), "fetched bookmarks");
        Ok(bookmarks)
    }

    /// Inserts a bookmark. Empty title or url is rejected before the backend is called.
    pub async fn create(&self, fields: &BookmarkFields) -> Result<Bookmark, SyncError> {
        check_required(fields)?;
        let bookmark = self
            .bounded("insert", self.backend.insert(&self.owner_id, fields))
            .await?;
        debug!(owner_id = %self.owner_id, id = %bookmark.id, "bookmark created");
        Ok(bookmark)
    }

    /// Updates title and url; `tags` and `category` change only when provided.
    pub async fn update(&self, id: &str, fields: &BookmarkFields) -> Result<(), SyncError> {
        check_required(fields)?;
        self.bounded("update", self.backend.update(&self.owner_id, id, fields))
            .await?;
        debug!(owner_id = %self.owner_id, id, "bookmark updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.bounded("delete", self.backend.delete(&self.owner_id, id))
            .await?;
        debug!(owner_id = %self.owner_id, id, "bookmark deleted");
        Ok(())
    }

    /// Registers a change listener for the owner.
    pub async fn subscribe(&self) -> Result<Subscription, RepositoryError> {
        self.bounded("subscribe", self.backend.subscribe(&self.owner_id))
            .await
    }
}

fn check_required(fields: &BookmarkFields) -> Result<(), ValidationError> {
    if fields.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if fields.url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Ok(())
}
