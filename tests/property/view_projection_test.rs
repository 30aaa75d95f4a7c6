//! Property-based tests for the view projector.
//!
//! The projection only ever selects from the collection in its original
//! order, `recent` is a bounded prefix, and an empty query filters nothing.

use std::collections::BTreeSet;

use proptest::prelude::*;
use smartmark::services::view_projector::{project, RECENT_LIMIT};
use smartmark::types::bookmark::Bookmark;
use smartmark::types::filter::{CategorySelection, ViewFilter, ViewMode};

fn arb_category() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just("development".to_string()),
        Just("design".to_string()),
        Just("news".to_string()),
        Just("other".to_string()),
    ])
}

fn arb_collection() -> impl Strategy<Value = Vec<Bookmark>> {
    proptest::collection::vec(
        (
            "[a-zA-Z ]{1,20}",
            "[a-z]{1,10}",
            proptest::collection::vec("[a-z]{1,6}", 0..3),
            arb_category(),
        ),
        0..25,
    )
    .prop_map(|items| {
        let count = items.len();
        items
            .into_iter()
            .enumerate()
            .map(|(i, (title, host, tags, category))| Bookmark {
                id: format!("bk-{}", i),
                owner_id: "user-1".to_string(),
                title,
                url: format!("https://{}.dev", host),
                tags,
                category,
                created_at: (count - i) as i64,
            })
            .collect()
    })
}

fn arb_mode() -> impl Strategy<Value = ViewMode> {
    prop_oneof![Just(ViewMode::All), Just(ViewMode::Favorites), Just(ViewMode::Recent)]
}

fn arb_selection() -> impl Strategy<Value = CategorySelection> {
    prop_oneof![
        Just(CategorySelection::All),
        arb_category().prop_map(|c| CategorySelection::Only(c.unwrap_or_else(|| "other".to_string()))),
    ]
}

fn arb_overlay(collection_len: usize) -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set((0..collection_len.max(1) + 3).prop_map(|i| format!("bk-{}", i)), 0..8)
}

/// Whether `sub` appears in `full` in the same relative order.
fn is_subsequence(sub: &[&Bookmark], full: &[Bookmark]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|s| rest.any(|f| f.id == s.id))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn projection_preserves_collection_order(
        (collection, overlay) in arb_collection().prop_flat_map(|c| {
            let len = c.len();
            (Just(c), arb_overlay(len))
        }),
        mode in arb_mode(),
        selection in arb_selection(),
        query in "[a-z]{0,3}",
    ) {
        let filter = ViewFilter::default().mode(mode).category(selection).search(query);
        let result = project(&collection, &overlay, &filter);
        prop_assert!(is_subsequence(&result, &collection));
        if mode == ViewMode::Favorites {
            prop_assert!(result.iter().all(|b| overlay.contains(&b.id)));
        }
    }

    #[test]
    fn recent_is_bounded_prefix(collection in arb_collection()) {
        let filter = ViewFilter::default().mode(ViewMode::Recent);
        let result = project(&collection, &BTreeSet::new(), &filter);

        prop_assert!(result.len() <= RECENT_LIMIT);
        prop_assert_eq!(result.len(), collection.len().min(RECENT_LIMIT));
        for (shown, original) in result.iter().zip(collection.iter()) {
            prop_assert_eq!(&shown.id, &original.id);
        }
    }

    #[test]
    fn empty_query_is_identity_on_search(
        collection in arb_collection(),
        selection in arb_selection(),
    ) {
        let without = ViewFilter::default().category(selection.clone());
        let with_empty = without.clone().search("");
        let all: Vec<&str> = project(&collection, &BTreeSet::new(), &without)
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        let empty: Vec<&str> = project(&collection, &BTreeSet::new(), &with_empty)
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        prop_assert_eq!(all, empty);

        if selection == CategorySelection::All {
            prop_assert_eq!(
                project(&collection, &BTreeSet::new(), &ViewFilter::default()).len(),
                collection.len()
            );
        }
    }
}
