use thiserror::Error;

// === ValidationError ===

/// Errors raised by local validation of user input. Never sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The bookmark title is empty after trimming.
    #[error("Title must not be empty")]
    EmptyTitle,
    /// The bookmark URL is empty after trimming.
    #[error("URL must not be empty")]
    EmptyUrl,
    /// The bookmark URL does not parse as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

// === RepositoryError ===

/// Errors raised by the backend or the repository wrapping it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Bookmark with the given ID was not found for the current owner.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// The caller is not allowed to access the requested records.
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    /// The backend did not answer within the request timeout.
    #[error("Repository request timed out after {0} ms")]
    Timeout(u64),
    /// The backend could not be reached.
    #[error("Repository transport error: {0}")]
    Transport(String),
    /// The backend's storage failed.
    #[error("Repository database error: {0}")]
    DatabaseError(String),
    /// Registering or maintaining a change subscription failed.
    #[error("Subscription error: {0}")]
    Subscription(String),
}

// === StorageError ===

/// Errors related to the local key-value storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(String),
    #[error("Storage serialization error: {0}")]
    SerializationError(String),
}

// === OverlayError ===

/// Errors related to the favorites overlay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Stored overlay content is not a JSON array of id strings.
    #[error("Favorite overlay corrupted: {0}")]
    Corruption(String),
    /// Reading or writing the overlay failed.
    #[error("Favorite overlay storage error: {0}")]
    Storage(#[from] StorageError),
}

// === SyncError ===

/// Errors returned by the bookmark synchronizer's operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    /// Another edit or remove for the same bookmark has not completed yet.
    #[error("Operation already in flight for bookmark: {0}")]
    InFlight(String),
    /// The synchronizer was disposed.
    #[error("Synchronizer has been disposed")]
    Disposed,
}

impl SyncError {
    /// Returns true for errors produced by local input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// File I/O error.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// JSON serialization/deserialization error.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The requested settings key does not exist.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided value is invalid for the given key.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
