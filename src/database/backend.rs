//! The remote store boundary.

use async_trait::async_trait;

use super::change_hub::Subscription;
use crate::types::bookmark::{Bookmark, BookmarkFields};
use crate::types::errors::RepositoryError;

/// CRUD operations over bookmark records keyed by id and owner, plus a
/// change subscription filtered by owner.
///
/// Implementations enforce the owner filter: records of other owners are
/// never returned, updated or deleted.
#[async_trait]
pub trait BookmarkBackend: Send + Sync {
    /// All bookmarks of `owner_id`, newest first.
    async fn fetch_all(&self, owner_id: &str) -> Result<Vec<Bookmark>, RepositoryError>;

    /// Inserts a record and returns it with the backend-assigned id and timestamp.
    async fn insert(&self, owner_id: &str, fields: &BookmarkFields) -> Result<Bookmark, RepositoryError>;

    /// Overwrites title and url; `tags` and `category` only when provided.
    async fn update(&self, owner_id: &str, id: &str, fields: &BookmarkFields) -> Result<(), RepositoryError>;

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), RepositoryError>;

    /// Registers a listener for changes to `owner_id`'s records.
    async fn subscribe(&self, owner_id: &str) -> Result<Subscription, RepositoryError>;
}
