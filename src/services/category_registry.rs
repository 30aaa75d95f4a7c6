// SmartMark category registry
// Static mapping from category id to display metadata.

use serde::Serialize;

/// Category id used when a bookmark has no category or an unknown one.
pub const DEFAULT_CATEGORY: &str = "other";

/// Display metadata for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
    /// Accent color as a CSS hex value.
    pub color: &'static str,
}

/// All known categories, `other` last.
pub const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo { id: "development", label: "Development", color: "#60a5fa" },
    CategoryInfo { id: "design", label: "Design", color: "#f472b6" },
    CategoryInfo { id: "reference", label: "Reference", color: "#facc15" },
    CategoryInfo { id: "work", label: "Work", color: "#fb923c" },
    CategoryInfo { id: "education", label: "Education", color: "#4ade80" },
    CategoryInfo { id: "shopping", label: "Shopping", color: "#c084fc" },
    CategoryInfo { id: "news", label: "News", color: "#f87171" },
    CategoryInfo { id: "social", label: "Social", color: "#22d3ee" },
    CategoryInfo { id: "entertainment", label: "Entertainment", color: "#818cf8" },
    CategoryInfo { id: DEFAULT_CATEGORY, label: "Other", color: "#94a3b8" },
];

/// Returns every registered category.
pub fn all() -> &'static [CategoryInfo] {
    CATEGORIES
}

/// Case-insensitive lookup by id.
pub fn lookup(id: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

/// Resolves an optional id, falling back to `other` when absent or unknown.
pub fn resolve(id: Option<&str>) -> &'static CategoryInfo {
    id.and_then(lookup).unwrap_or_else(other)
}

/// Display label for a category id; unknown ids are shown as-is.
pub fn label_for(id: &str) -> String {
    lookup(id)
        .map(|c| c.label.to_string())
        .unwrap_or_else(|| id.to_string())
}

fn other() -> &'static CategoryInfo {
    &CATEGORIES[CATEGORIES.len() - 1]
}
