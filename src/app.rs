//! App Core for SmartMark.
//!
//! Central struct holding the settings, the backend, local storage and the
//! active user session.

use std::fs;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::database::{BookmarkBackend, Database, SqliteBackend};
use crate::managers::bookmark_repository::BookmarkRepository;
use crate::managers::bookmark_synchronizer::BookmarkSynchronizer;
use crate::managers::favorite_overlay::FavoriteOverlayStore;
use crate::services::local_storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::SyncError;

/// Central application struct.
///
/// At most one session is active at a time; starting a new one disposes the
/// previous synchronizer.
pub struct App {
    pub settings_engine: SettingsEngine,
    backend: Arc<dyn BookmarkBackend>,
    storage: Arc<dyn KeyValueStore>,
    session: Mutex<Option<BookmarkSynchronizer>>,
}

impl App {
    /// Creates an App from loaded settings, opening the SQLite database and
    /// the local storage file they point to.
    pub fn new(settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = settings_engine.database_path();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let db = Database::open(&db_path)?;
        info!(path = %db_path.display(), "database opened");

        let storage_path = settings_engine
            .get_settings()
            .storage
            .local_storage_path
            .clone();
        let storage = Arc::new(FileKeyValueStore::new(storage_path));

        Ok(Self::with_parts(
            settings_engine,
            Arc::new(SqliteBackend::new(db)),
            storage,
        ))
    }

    /// Creates an App over an in-memory database and volatile storage.
    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        let backend = SqliteBackend::open_in_memory()?;
        Ok(Self::with_parts(
            SettingsEngine::new(None),
            Arc::new(backend),
            Arc::new(MemoryKeyValueStore::new()),
        ))
    }

    pub fn with_parts(
        settings_engine: SettingsEngine,
        backend: Arc<dyn BookmarkBackend>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            settings_engine,
            backend,
            storage,
            session: Mutex::new(None),
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<BookmarkSynchronizer>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a session for `owner_id`, disposing any previous one, and
    /// initializes its synchronizer.
    pub async fn start_session(&self, owner_id: &str) -> Result<BookmarkSynchronizer, SyncError> {
        let settings = self.settings_engine.get_settings();
        let repository = BookmarkRepository::new(self.backend.clone(), owner_id)
            .with_timeout(self.settings_engine.request_timeout());
        let overlay =
            FavoriteOverlayStore::with_key(self.storage.clone(), settings.storage.favorites_key.clone());
        let sync = BookmarkSynchronizer::new(repository, overlay);

        let previous = self.lock_session().replace(sync.clone());
        if let Some(previous) = previous {
            previous.dispose();
        }
        info!(owner_id, "session started");

        sync.initialize().await?;
        Ok(sync)
    }

    /// The active session's synchronizer, if any.
    pub fn session(&self) -> Option<BookmarkSynchronizer> {
        self.lock_session().clone()
    }

    /// Ends the active session. Returns whether one was active.
    pub fn sign_out(&self) -> bool {
        let previous = self.lock_session().take();
        match previous {
            Some(sync) => {
                info!(owner_id = %sync.owner_id(), "signed out");
                sync.dispose();
                true
            }
            None => false,
        }
    }
}
