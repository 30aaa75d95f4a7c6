// SmartMark state managers
// Managers own stateful bookmark operations: the backend repository, the favorite overlay and the synchronizer tying them together.

pub mod bookmark_repository;
pub mod bookmark_synchronizer;
pub mod favorite_overlay;
