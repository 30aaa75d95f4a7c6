//! RPC method handler for the SmartMark JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! active session's synchronizer via the `App` struct.

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_synchronizer::BookmarkSynchronizer;
use crate::services::category_registry;
use crate::types::bookmark::{parse_tags, Bookmark, BookmarkDraft};
use crate::types::filter::{CategorySelection, ViewMode};

fn require_session(app: &App) -> Result<BookmarkSynchronizer, String> {
    app.session().ok_or_else(|| "no active session".to_string())
}

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// Builds a draft from `title`, `url`, `tags` and `category` params.
///
/// `tags` may be an array of strings or a comma-separated string.
fn draft_from_params(params: &Value) -> Result<BookmarkDraft, String> {
    let title = str_param(params, "title").ok_or("missing title")?;
    let url = str_param(params, "url").ok_or("missing url")?;
    let tags = match params.get("tags") {
        Some(Value::String(s)) => parse_tags(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err("invalid tags: expected string or array".to_string()),
    };

    let mut draft = BookmarkDraft::new(title, url).with_tags(tags);
    if let Some(category) = str_param(params, "category") {
        draft = draft.with_category(category);
    }
    Ok(draft)
}

/// A bookmark as shown in the list: stored fields plus display metadata.
fn render_bookmark(sync: &BookmarkSynchronizer, bookmark: &Bookmark) -> Value {
    let category = category_registry::resolve(bookmark.category.as_deref());
    json!({
        "id": bookmark.id,
        "title": bookmark.title,
        "url": bookmark.url,
        "tags": bookmark.tags,
        "category": bookmark.category,
        "created_at": bookmark.created_at,
        "domain": bookmark.domain(),
        "favicon_url": bookmark.favicon_url(),
        "favorite": sync.is_favorite(&bookmark.id),
        "category_label": category.label,
        "category_color": category.color,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Session ───
        "session.start" => {
            let owner_id = str_param(params, "owner_id").ok_or("missing owner_id")?;
            let sync = app.start_session(owner_id).await.map_err(|e| e.to_string())?;
            to_json(&sync.state())
        }
        "session.end" => {
            let ended = app.sign_out();
            Ok(json!({"ok": ended}))
        }

        // ─── Bookmarks ───
        "bookmark.state" => {
            let sync = require_session(app)?;
            to_json(&sync.state())
        }
        "bookmark.view" => {
            let sync = require_session(app)?;
            let items: Vec<Value> = sync
                .view()
                .iter()
                .map(|b| render_bookmark(&sync, b))
                .collect();
            Ok(json!({"items": items, "summary": sync.summary()}))
        }
        "bookmark.add" => {
            let sync = require_session(app)?;
            let draft = draft_from_params(params)?;
            let bookmark = sync.add(&draft).await.map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.edit" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let sync = require_session(app)?;
            let draft = draft_from_params(params)?;
            sync.edit(id, &draft).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.remove" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let sync = require_session(app)?;
            sync.remove(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.refresh" => {
            let sync = require_session(app)?;
            sync.refresh().await.map_err(|e| e.to_string())?;
            to_json(&sync.state())
        }

        // ─── Favorites ───
        "favorite.toggle" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let sync = require_session(app)?;
            let favorite = sync.toggle_favorite(id).map_err(|e| e.to_string())?;
            Ok(json!({"id": id, "favorite": favorite}))
        }

        // ─── Filter ───
        "filter.get" => {
            let sync = require_session(app)?;
            to_json(&sync.filter())
        }
        "filter.set" => {
            let sync = require_session(app)?;
            let mode = match str_param(params, "view_mode") {
                Some("all") => Some(ViewMode::All),
                Some("favorites") => Some(ViewMode::Favorites),
                Some("recent") => Some(ViewMode::Recent),
                Some(other) => return Err(format!("invalid view_mode: {}", other)),
                None => None,
            };
            let query = str_param(params, "search_query").map(str::to_string);
            let category = str_param(params, "selected_category").map(CategorySelection::from_str_value);

            sync.update_filter(|filter| {
                if let Some(query) = query {
                    filter.search_query = query;
                }
                if let Some(category) = category {
                    filter.selected_category = category;
                }
                if let Some(mode) = mode {
                    filter.view_mode = mode;
                }
            });
            to_json(&sync.filter())
        }

        // ─── Categories ───
        "category.list" => to_json(&category_registry::all()),
        "category.facets" => {
            let sync = require_session(app)?;
            to_json(&sync.categories())
        }
        "view.summary" => {
            let sync = require_session(app)?;
            to_json(&sync.summary())
        }

        "error.dismiss" => {
            let sync = require_session(app)?;
            sync.dismiss_error();
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
