//! Reference [`BookmarkBackend`] backed by SQLite via `rusqlite`.
//!
//! Every successful write notifies the owner's listeners through the
//! embedded [`ChangeHub`], mirroring a realtime database channel.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::backend::BookmarkBackend;
use super::change_hub::{ChangeHub, Subscription};
use super::connection::Database;
use crate::types::bookmark::{Bookmark, BookmarkFields};
use crate::types::errors::RepositoryError;
use crate::types::sync::ChangeKind;

const SELECT_COLUMNS: &str = "id, user_id, title, url, tags, category, created_at";

/// Bookmark store over a single SQLite connection.
pub struct SqliteBackend {
    db: Mutex<Database>,
    hub: ChangeHub,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            hub: ChangeHub::new(),
        }
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// The hub used to deliver change notices.
    pub fn hub(&self) -> &ChangeHub {
        &self.hub
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn require_owner(owner_id: &str) -> Result<(), RepositoryError> {
        if owner_id.trim().is_empty() {
            return Err(RepositoryError::Unauthorized(
                "no authenticated owner".to_string(),
            ));
        }
        Ok(())
    }

    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        let tags_json: String = row.get(4)?;
        let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Bookmark {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            tags,
            category: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn encode_tags(tags: &[String]) -> Result<String, RepositoryError> {
        serde_json::to_string(tags).map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    /// Reads a single bookmark of `owner_id` by id.
    pub fn get(&self, owner_id: &str, id: &str) -> Result<Option<Bookmark>, RepositoryError> {
        let db = self.db();
        db.connection()
            .query_row(
                &format!("SELECT {} FROM bookmarks WHERE id = ?1 AND user_id = ?2", SELECT_COLUMNS),
                params![id, owner_id],
                Self::row_to_bookmark,
            )
            .optional()
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl BookmarkBackend for SqliteBackend {
    async fn fetch_all(&self, owner_id: &str) -> Result<Vec<Bookmark>, RepositoryError> {
        Self::require_owner(owner_id)?;
        let db = self.db();
        let mut stmt = db
            .connection()
            .prepare(&format!(
                "SELECT {} FROM bookmarks WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
                SELECT_COLUMNS
            ))
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner_id], Self::row_to_bookmark)
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| RepositoryError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    async fn insert(&self, owner_id: &str, fields: &BookmarkFields) -> Result<Bookmark, RepositoryError> {
        Self::require_owner(owner_id)?;
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: fields.title.clone(),
            url: fields.url.clone(),
            tags: fields.tags.clone().unwrap_or_default(),
            category: fields.category.clone(),
            created_at: Self::now(),
        };
        let tags = Self::encode_tags(&bookmark.tags)?;

        self.db()
            .connection()
            .execute(
                "INSERT INTO bookmarks (id, user_id, title, url, tags, category, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bookmark.id,
                    bookmark.owner_id,
                    bookmark.title,
                    bookmark.url,
                    tags,
                    bookmark.category,
                    bookmark.created_at
                ],
            )
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        debug!(owner_id, id = %bookmark.id, "bookmark inserted");
        self.hub.notify(owner_id, ChangeKind::Insert);
        Ok(bookmark)
    }

    async fn update(&self, owner_id: &str, id: &str, fields: &BookmarkFields) -> Result<(), RepositoryError> {
        Self::require_owner(owner_id)?;
        let tags = fields.tags.as_deref().map(Self::encode_tags).transpose()?;

        // COALESCE keeps the stored value for omitted optional fields
        let affected = self
            .db()
            .connection()
            .execute(
                "UPDATE bookmarks SET title = ?1, url = ?2, tags = COALESCE(?3, tags), category = COALESCE(?4, category) \
                 WHERE id = ?5 AND user_id = ?6",
                params![fields.title, fields.url, tags, fields.category, id, owner_id],
            )
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        debug!(owner_id, id, "bookmark updated");
        self.hub.notify(owner_id, ChangeKind::Update);
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), RepositoryError> {
        Self::require_owner(owner_id)?;
        let affected = self
            .db()
            .connection()
            .execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, owner_id],
            )
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        debug!(owner_id, id, "bookmark deleted");
        self.hub.notify(owner_id, ChangeKind::Delete);
        Ok(())
    }

    async fn subscribe(&self, owner_id: &str) -> Result<Subscription, RepositoryError> {
        Self::require_owner(owner_id)?;
        Ok(self.hub.subscribe(owner_id))
    }
}
