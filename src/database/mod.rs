//! SmartMark persistence layer.
//!
//! Defines the [`BookmarkBackend`] boundary the synchronizer talks to, the
//! in-process [`ChangeHub`] used to deliver change notices, and a reference
//! SQLite implementation of the backend.
//!
//! # Usage
//!
//! ```no_run
//! use smartmark::database::{Database, SqliteBackend};
//!
//! // Open a persistent database
//! let db = Database::open("bookmarks.db").expect("failed to open database");
//! let backend = SqliteBackend::new(db);
//!
//! // Or use an in-memory database for testing
//! let backend = SqliteBackend::open_in_memory().expect("failed to open in-memory database");
//! ```

pub mod backend;
pub mod change_hub;
pub mod connection;
pub mod migrations;
pub mod sqlite_backend;

pub use backend::BookmarkBackend;
pub use change_hub::{ChangeHub, Subscription, SubscriptionGuard};
pub use connection::Database;
pub use sqlite_backend::SqliteBackend;
