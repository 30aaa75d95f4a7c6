use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::ValidationError;
use crate::services::category_registry;

/// A bookmark record as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

impl Bookmark {
    /// Registered category id, or `other` when none or an unknown one was set.
    pub fn category_or_default(&self) -> &'static str {
        category_registry::resolve(self.category.as_deref()).id
    }

    /// Host name of the bookmark URL without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        let parsed = Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Favicon URL served by the public favicon service for this bookmark's host.
    pub fn favicon_url(&self) -> Option<String> {
        let parsed = Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        Some(format!(
            "https://www.google.com/s2/favicons?domain={}&sz=64",
            host
        ))
    }
}

/// User input for creating or editing a bookmark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl BookmarkDraft {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            tags: Vec::new(),
            category: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Validates the draft and produces the field set sent to the backend.
    ///
    /// Title and URL are trimmed; the URL must parse as an absolute URL.
    /// Empty tags are dropped, and an empty tag list or category is omitted
    /// so that an update leaves the stored value untouched.
    pub fn validate(&self) -> Result<BookmarkFields, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        Url::parse(url).map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", url, e)))?;

        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(BookmarkFields {
            title: title.to_string(),
            url: url.to_string(),
            tags: if tags.is_empty() { None } else { Some(tags) },
            category,
        })
    }
}

/// Splits a comma-separated tag string, trimming entries and dropping empty ones.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Field set accepted by the backend on create and update.
///
/// `None` for `tags` or `category` means "not provided": create stores the
/// default, update keeps the existing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkFields {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
