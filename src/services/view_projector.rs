//! View projection for SmartMark.
//!
//! Pure functions from (collection, favorites overlay, filter) to what the
//! presentation layer shows. The collection is expected newest first; no
//! function here re-sorts it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::services::category_registry;
use crate::types::bookmark::Bookmark;
use crate::types::filter::{CategorySelection, ViewFilter, ViewMode, ALL_CATEGORIES};

/// Number of bookmarks shown in the `recent` view.
pub const RECENT_LIMIT: usize = 10;

/// Filters `collection` by view mode, then search, then category.
///
/// The result keeps the collection's order.
pub fn project<'a>(
    collection: &'a [Bookmark],
    overlay: &BTreeSet<String>,
    filter: &ViewFilter,
) -> Vec<&'a Bookmark> {
    let by_mode: &[Bookmark] = match filter.view_mode {
        ViewMode::Recent => &collection[..collection.len().min(RECENT_LIMIT)],
        ViewMode::All | ViewMode::Favorites => collection,
    };

    let query = filter.search_query.to_lowercase();

    by_mode
        .iter()
        .filter(|b| filter.view_mode != ViewMode::Favorites || overlay.contains(&b.id))
        .filter(|b| matches_search(b, &query))
        .filter(|b| matches_category(b, &filter.selected_category))
        .collect()
}

/// Any of title, url, a tag or the stored category contains `query`.
/// `query` must already be lowercase.
fn matches_search(bookmark: &Bookmark, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let contains = |field: &str| field.to_lowercase().contains(query);

    contains(bookmark.title.as_str())
        || contains(bookmark.url.as_str())
        || bookmark.tags.iter().any(|t| contains(t.as_str()))
        || bookmark.category.as_deref().is_some_and(contains)
}

/// The resolved category equals `selection`. A stored id that is not
/// registered still matches its own facet.
fn matches_category(bookmark: &Bookmark, selection: &CategorySelection) -> bool {
    match selection {
        CategorySelection::All => true,
        CategorySelection::Only(id) => {
            bookmark.category_or_default().eq_ignore_ascii_case(id)
                || bookmark.category.as_deref() == Some(id.as_str())
        }
    }
}

/// A category entry in the navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFacet {
    pub id: String,
    pub label: String,
    pub count: usize,
}

/// `All` followed by each distinct stored category in first-appearance order.
pub fn category_facets(collection: &[Bookmark]) -> Vec<CategoryFacet> {
    let mut facets = vec![CategoryFacet {
        id: ALL_CATEGORIES.to_string(),
        label: ALL_CATEGORIES.to_string(),
        count: collection.len(),
    }];

    for bookmark in collection {
        let Some(category) = bookmark.category.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        match facets.iter_mut().skip(1).find(|f| f.id == category) {
            Some(facet) => facet.count += 1,
            None => facets.push(CategoryFacet {
                id: category.to_string(),
                label: category_registry::label_for(category),
                count: 1,
            }),
        }
    }
    facets
}

/// Heading and count for the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub title: String,
    pub count: usize,
}

pub fn view_summary(
    collection: &[Bookmark],
    overlay: &BTreeSet<String>,
    filter: &ViewFilter,
) -> ViewSummary {
    match filter.view_mode {
        ViewMode::Favorites => ViewSummary {
            title: "Favorites".to_string(),
            count: overlay.len(),
        },
        ViewMode::Recent => ViewSummary {
            title: "Recent".to_string(),
            count: collection.len().min(RECENT_LIMIT),
        },
        ViewMode::All => {
            let title = match &filter.selected_category {
                CategorySelection::All => "All Bookmarks".to_string(),
                CategorySelection::Only(id) => category_registry::label_for(id),
            };
            ViewSummary {
                title,
                count: collection.len(),
            }
        }
    }
}
