use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label of the category selection that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Which subset of the collection the view starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Favorites,
    Recent,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::Favorites => "favorites",
            ViewMode::Recent => "recent",
        }
    }
}

/// Category selection: `All` or a single category id.
///
/// Serialized as a plain string, with `"All"` meaning no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategorySelection {
    #[default]
    All,
    Only(String),
}

impl CategorySelection {
    pub fn from_str_value(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            CategorySelection::All
        } else {
            CategorySelection::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategorySelection::All => ALL_CATEGORIES,
            CategorySelection::Only(id) => id,
        }
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategorySelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategorySelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CategorySelection::from_str_value(&raw))
    }
}

/// Ephemeral view state: search text, category selection and view mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub selected_category: CategorySelection,
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl ViewFilter {
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn category(mut self, selection: CategorySelection) -> Self {
        self.selected_category = selection;
        self
    }

    pub fn mode(mut self, mode: ViewMode) -> Self {
        self.view_mode = mode;
        self
    }

    /// Sidebar navigation: picking a category shows it within the full list.
    pub fn select_category(&mut self, selection: CategorySelection) {
        self.selected_category = selection;
        self.view_mode = ViewMode::All;
    }

    /// Sidebar navigation: switching view mode clears the category selection.
    pub fn select_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.selected_category = CategorySelection::All;
    }
}
