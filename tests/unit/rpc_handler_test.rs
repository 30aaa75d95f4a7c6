//! Unit tests for the RPC handler: the JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise every RPC method through the same code path used by the
//! real `smartmark-rpc` binary, using an in-memory database and volatile storage.

use serde_json::json;

use smartmark::app::App;
use smartmark::rpc_handler::handle_method;

fn setup() -> App {
    App::in_memory().expect("Failed to init App")
}

async fn started(owner: &str) -> App {
    let app = setup();
    handle_method(&app, "session.start", &json!({"owner_id": owner}))
        .await
        .expect("session.start failed");
    app
}

async fn add(app: &App, title: &str, url: &str) -> String {
    let res = handle_method(app, "bookmark.add", &json!({"title": title, "url": url}))
        .await
        .unwrap();
    res["id"].as_str().unwrap().to_string()
}

// ─── Ping ───

#[tokio::test]
async fn test_ping() {
    let app = setup();
    let res = handle_method(&app, "ping", &json!({})).await.unwrap();
    assert_eq!(res, json!({"pong": true}));
}

// ─── Unknown method ───

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let app = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({})).await;
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Session ───

#[tokio::test]
async fn test_methods_require_session() {
    let app = setup();
    for method in ["bookmark.state", "bookmark.view", "filter.get", "error.dismiss"] {
        let res = handle_method(&app, method, &json!({})).await;
        assert_eq!(res.unwrap_err(), "no active session", "method {}", method);
    }
}

#[tokio::test]
async fn test_session_start_returns_ready_state() {
    let app = setup();
    let res = handle_method(&app, "session.start", &json!({"owner_id": "alice"}))
        .await
        .unwrap();
    assert_eq!(res["status"], "ready");
    assert_eq!(res["bookmarks"], json!([]));
    assert_eq!(res["error"], json!(null));
}

#[tokio::test]
async fn test_session_start_requires_owner() {
    let app = setup();
    let res = handle_method(&app, "session.start", &json!({})).await;
    assert_eq!(res.unwrap_err(), "missing owner_id");
}

#[tokio::test]
async fn test_session_end_disposes() {
    let app = started("alice").await;
    let sync = app.session().unwrap();

    let res = handle_method(&app, "session.end", &json!({})).await.unwrap();

    assert_eq!(res, json!({"ok": true}));
    assert!(sync.is_disposed());
    assert!(app.session().is_none());
    let again = handle_method(&app, "session.end", &json!({})).await.unwrap();
    assert_eq!(again, json!({"ok": false}));
}

#[tokio::test]
async fn test_new_session_isolates_owners() {
    let app = started("alice").await;
    add(&app, "Rust", "https://rust-lang.org").await;

    handle_method(&app, "session.start", &json!({"owner_id": "bob"}))
        .await
        .unwrap();

    let state = handle_method(&app, "bookmark.state", &json!({})).await.unwrap();
    assert_eq!(state["bookmarks"], json!([]));
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_add_and_view() {
    let app = started("alice").await;

    let res = handle_method(&app, "bookmark.add", &json!({
        "url": "https://www.example.com/page",
        "title": "Example",
        "tags": "one, two,,",
        "category": "reference"
    }))
    .await
    .unwrap();
    assert!(res.get("id").is_some());
    assert_eq!(res["tags"], json!(["one", "two"]));

    let view = handle_method(&app, "bookmark.view", &json!({})).await.unwrap();
    let items = view["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Example");
    assert_eq!(items[0]["domain"], "example.com");
    assert_eq!(items[0]["favorite"], false);
    assert_eq!(items[0]["category_label"], "Reference");
    assert_eq!(view["summary"]["title"], "All Bookmarks");
    assert_eq!(view["summary"]["count"], 1);
}

#[tokio::test]
async fn test_bookmark_add_accepts_tag_array() {
    let app = started("alice").await;
    let res = handle_method(&app, "bookmark.add", &json!({
        "url": "https://go.dev",
        "title": "Go",
        "tags": ["go", " docs "]
    }))
    .await
    .unwrap();
    assert_eq!(res["tags"], json!(["go", "docs"]));
}

#[tokio::test]
async fn test_bookmark_add_invalid_url() {
    let app = started("alice").await;
    let res = handle_method(&app, "bookmark.add", &json!({"title": "Bad", "url": "not a url"})).await;
    assert!(res.unwrap_err().starts_with("Invalid URL"));
}

#[tokio::test]
async fn test_bookmark_add_missing_title() {
    let app = started("alice").await;
    let res = handle_method(&app, "bookmark.add", &json!({"url": "https://go.dev"})).await;
    assert_eq!(res.unwrap_err(), "missing title");
}

#[tokio::test]
async fn test_bookmark_edit() {
    let app = started("alice").await;
    let id = add(&app, "Go", "https://go.dev").await;

    handle_method(&app, "bookmark.edit", &json!({"id": id, "title": "Go Docs", "url": "https://go.dev/doc"}))
        .await
        .unwrap();

    let state = handle_method(&app, "bookmark.state", &json!({})).await.unwrap();
    assert_eq!(state["bookmarks"][0]["title"], "Go Docs");

    let err = handle_method(&app, "bookmark.edit", &json!({"id": id, "title": "", "url": "https://go.dev"}))
        .await
        .unwrap_err();
    assert_eq!(err, "Title must not be empty");
}

#[tokio::test]
async fn test_bookmark_remove() {
    let app = started("alice").await;
    let id = add(&app, "Go", "https://go.dev").await;
    handle_method(&app, "favorite.toggle", &json!({"id": id})).await.unwrap();

    let res = handle_method(&app, "bookmark.remove", &json!({"id": id})).await.unwrap();

    assert_eq!(res, json!({"ok": true}));
    let view = handle_method(&app, "bookmark.view", &json!({})).await.unwrap();
    assert_eq!(view["items"], json!([]));
    assert!(!app.session().unwrap().is_favorite(&id));
}

#[tokio::test]
async fn test_bookmark_remove_missing_surfaces_error() {
    let app = started("alice").await;

    let err = handle_method(&app, "bookmark.remove", &json!({"id": "ghost"}))
        .await
        .unwrap_err();
    assert_eq!(err, "Bookmark not found: ghost");

    let state = handle_method(&app, "bookmark.state", &json!({})).await.unwrap();
    assert_eq!(state["error"], "Bookmark not found: ghost");

    handle_method(&app, "error.dismiss", &json!({})).await.unwrap();
    let state = handle_method(&app, "bookmark.state", &json!({})).await.unwrap();
    assert_eq!(state["error"], json!(null));
}

#[tokio::test]
async fn test_bookmark_refresh() {
    let app = started("alice").await;
    add(&app, "Go", "https://go.dev").await;
    let res = handle_method(&app, "bookmark.refresh", &json!({})).await.unwrap();
    assert_eq!(res["bookmarks"].as_array().unwrap().len(), 1);
}

// ─── Favorites & filters ───

#[tokio::test]
async fn test_favorite_toggle_and_filter() {
    let app = started("alice").await;
    let fav = add(&app, "Rust", "https://rust-lang.org").await;
    add(&app, "Go", "https://go.dev").await;

    let res = handle_method(&app, "favorite.toggle", &json!({"id": fav})).await.unwrap();
    assert_eq!(res["favorite"], true);

    let filter = handle_method(&app, "filter.set", &json!({"view_mode": "favorites"}))
        .await
        .unwrap();
    assert_eq!(filter["view_mode"], "favorites");
    assert_eq!(filter["selected_category"], "All");

    let view = handle_method(&app, "bookmark.view", &json!({})).await.unwrap();
    let items = view["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], fav.as_str());
    assert_eq!(items[0]["favorite"], true);
}

#[tokio::test]
async fn test_filter_set_partial_update() {
    let app = started("alice").await;
    handle_method(&app, "filter.set", &json!({"search_query": "go"})).await.unwrap();
    handle_method(&app, "filter.set", &json!({"selected_category": "design"})).await.unwrap();

    let filter = handle_method(&app, "filter.get", &json!({})).await.unwrap();
    assert_eq!(filter["search_query"], "go");
    assert_eq!(filter["selected_category"], "design");
    assert_eq!(filter["view_mode"], "all");

    let err = handle_method(&app, "filter.set", &json!({"view_mode": "sideways"})).await;
    assert_eq!(err.unwrap_err(), "invalid view_mode: sideways");
}

// ─── Categories ───

#[tokio::test]
async fn test_category_list() {
    let app = setup();
    let res = handle_method(&app, "category.list", &json!({})).await.unwrap();
    let arr = res.as_array().unwrap();
    assert_eq!(arr.len(), 10);
    assert_eq!(arr[9]["id"], "other");
}

#[tokio::test]
async fn test_category_facets_and_summary() {
    let app = started("alice").await;
    handle_method(&app, "bookmark.add", &json!({"title": "A", "url": "https://a.dev", "category": "news"}))
        .await
        .unwrap();

    let facets = handle_method(&app, "category.facets", &json!({})).await.unwrap();
    assert_eq!(facets[0]["id"], "All");
    assert_eq!(facets[1]["id"], "news");
    assert_eq!(facets[1]["label"], "News");

    handle_method(&app, "filter.set", &json!({"selected_category": "news"})).await.unwrap();
    let summary = handle_method(&app, "view.summary", &json!({})).await.unwrap();
    assert_eq!(summary["title"], "News");
}
