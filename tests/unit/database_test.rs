//! Unit tests for the SmartMark database layer (connection + migrations).

use smartmark::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use smartmark::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_bookmarks_table() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='bookmarks'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "Table 'bookmarks' should exist after migrations");
}

#[test]
fn test_migrations_create_owner_index() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name='idx_bookmarks_user_created'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "Index 'idx_bookmarks_user_created' should exist after migrations");
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    // Running migrations a second time should not fail
    let result = smartmark::database::migrations::run_all(db.connection());
    assert!(result.is_ok(), "Running migrations twice should succeed (idempotent)");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_open_file_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("bookmarks.db");

    let db = Database::open(&db_path);
    assert!(db.is_ok(), "open with file path should succeed");
    assert!(db_path.exists(), "Database file should exist on disk");
}

#[test]
fn test_bookmarks_table_defaults() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    conn.execute(
        "INSERT INTO bookmarks (id, user_id, title, url, created_at)
         VALUES (?1, ?2, ?3, ?4, 1700000000000)",
        ["bk-1", "user-1", "Example", "https://example.com"],
    )
    .expect("Should be able to insert into bookmarks table");

    let (tags, category): (String, Option<String>) = conn
        .query_row(
            "SELECT tags, category FROM bookmarks WHERE id = ?1",
            ["bk-1"],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("Should be able to query bookmarks");

    assert_eq!(tags, "[]");
    assert_eq!(category, None);
}
