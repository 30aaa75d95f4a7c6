use serde::{Deserialize, Serialize};

use super::bookmark::Bookmark;

/// Lifecycle of a bookmark synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Loading,
    Ready,
    Disposed,
}

/// Read model exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub status: SyncStatus,
    pub bookmarks: Vec<Bookmark>,
    /// Last surfaced repository failure, until dismissed.
    pub error: Option<String>,
}

/// Kind of write that produced a change notice. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Push notice that something changed for an owner.
///
/// Receivers must treat every notice as a request to refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub owner_id: String,
    pub kind: ChangeKind,
}
