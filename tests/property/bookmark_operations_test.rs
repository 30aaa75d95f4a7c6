//! Property-based tests for synchronizer bookmark operations.
//!
//! For arbitrary valid titles and URLs, adding a bookmark yields exactly one
//! new record with those fields, and removing it takes it out of every view
//! and out of the favorite overlay.

use std::sync::Arc;

use proptest::prelude::*;
use smartmark::database::SqliteBackend;
use smartmark::managers::bookmark_repository::BookmarkRepository;
use smartmark::managers::bookmark_synchronizer::BookmarkSynchronizer;
use smartmark::managers::favorite_overlay::FavoriteOverlayStore;
use smartmark::services::local_storage::MemoryKeyValueStore;
use smartmark::types::bookmark::BookmarkDraft;
use smartmark::types::filter::{ViewFilter, ViewMode};

/// Strategy for generating valid URL strings.
/// Produces URLs with http/https scheme, alphanumeric host, and optional path.
fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,15}",
        prop_oneof![Just(".com"), Just(".org"), Just(".net"), Just(".io")],
        proptest::option::of("/[a-z0-9]{1,10}"),
    )
        .prop_map(|(scheme, host, tld, path)| {
            format!("{}://{}{}{}", scheme, host, tld, path.unwrap_or_default())
        })
}

/// Strategy for generating non-empty bookmark titles without surrounding whitespace.
fn arb_title() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{0,30}[a-zA-Z0-9]"
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

fn synchronizer() -> BookmarkSynchronizer {
    let backend = Arc::new(SqliteBackend::open_in_memory().expect("in-memory database"));
    let repository = BookmarkRepository::new(backend, "user-1");
    let overlay = FavoriteOverlayStore::new(Arc::new(MemoryKeyValueStore::new()));
    BookmarkSynchronizer::new(repository, overlay)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn add_yields_exactly_one_new_bookmark(
        existing in proptest::collection::vec((arb_title(), arb_url()), 0..4),
        title in arb_title(),
        url in arb_url(),
    ) {
        let (before, created, after) = runtime().block_on(async {
            let sync = synchronizer();
            sync.initialize().await.unwrap();
            for (t, u) in &existing {
                sync.add(&BookmarkDraft::new(t.as_str(), u.as_str())).await.unwrap();
            }
            let before = sync.state().bookmarks;
            let created = sync.add(&BookmarkDraft::new(title.as_str(), url.as_str())).await.unwrap();
            let after = sync.state().bookmarks;
            sync.dispose();
            (before, created, after)
        });

        prop_assert_eq!(after.len(), before.len() + 1);
        let new: Vec<_> = after
            .iter()
            .filter(|b| before.iter().all(|o| o.id != b.id))
            .collect();
        prop_assert_eq!(new.len(), 1);
        prop_assert_eq!(&new[0].id, &created.id);
        prop_assert_eq!(&new[0].title, &title);
        prop_assert_eq!(&new[0].url, &url);
    }

    #[test]
    fn removed_bookmark_never_projected(
        titles in proptest::collection::vec(arb_title(), 1..6),
        pick in any::<prop::sample::Index>(),
        favorite in any::<bool>(),
    ) {
        let (removed_id, views, still_favorite) = runtime().block_on(async {
            let sync = synchronizer();
            sync.initialize().await.unwrap();
            let mut ids = Vec::new();
            for (i, t) in titles.iter().enumerate() {
                let url = format!("https://site{}.dev", i);
                ids.push(sync.add(&BookmarkDraft::new(t.as_str(), url)).await.unwrap().id);
            }
            let target = pick.get(&ids).clone();
            if favorite {
                sync.toggle_favorite(&target).unwrap();
            }

            sync.remove(&target).await.unwrap();

            let mut views = Vec::new();
            for mode in [ViewMode::All, ViewMode::Favorites, ViewMode::Recent] {
                sync.set_filter(ViewFilter::default().mode(mode));
                views.push(sync.view());
            }
            let still_favorite = sync.is_favorite(&target);
            sync.dispose();
            (target, views, still_favorite)
        });

        for view in &views {
            prop_assert!(view.iter().all(|b| b.id != removed_id));
        }
        prop_assert!(!still_favorite);
    }
}
