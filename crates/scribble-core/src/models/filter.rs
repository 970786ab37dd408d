//! Note list filter and its query-parameter encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CategoryId;

/// Query value the API reads as "notes without a category".
pub const UNCATEGORIZED_SENTINEL: &str = "none";

/// Which categories the note list is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Uncategorized,
    Category(CategoryId),
}

impl CategoryFilter {
    /// Value for the `category_id` query parameter, `None` when omitted.
    #[must_use]
    pub fn query_value(self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Uncategorized => Some(UNCATEGORIZED_SENTINEL.to_string()),
            Self::Category(id) => Some(id.to_string()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Uncategorized => f.write_str(UNCATEGORIZED_SENTINEL),
            Self::Category(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            UNCATEGORIZED_SENTINEL | "uncategorized" => Ok(Self::Uncategorized),
            other => other
                .parse::<CategoryId>()
                .map(Self::Category)
                .map_err(|_| format!("expected 'all', 'none', or a category id, got '{s}'")),
        }
    }
}

/// The user's current note-list filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFilter {
    pub search_term: String,
    pub favorite_only: bool,
    pub category: CategoryFilter,
}

impl NoteFilter {
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    #[must_use]
    pub const fn favorites(mut self, favorite_only: bool) -> Self {
        self.favorite_only = favorite_only;
        self
    }

    #[must_use]
    pub const fn category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    /// Query parameters for `GET /notes`.
    ///
    /// `search` is trimmed and omitted when empty, `favorite=true` appears only
    /// for favorites-only, and `category_id` is omitted for [`CategoryFilter::All`].
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let search = self.search_term.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if self.favorite_only {
            params.push(("favorite", "true".to_string()));
        }
        if let Some(category) = self.category.query_value() {
            params.push(("category_id", category));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_filter_sends_no_params() {
        assert!(NoteFilter::default().query_params().is_empty());
    }

    #[test]
    fn uncategorized_uses_sentinel() {
        let params = NoteFilter::default()
            .category(CategoryFilter::Uncategorized)
            .query_params();
        assert_eq!(params, vec![("category_id", "none".to_string())]);
    }

    #[test]
    fn all_categories_omits_category_id() {
        let params = NoteFilter::default()
            .search("milk")
            .category(CategoryFilter::All)
            .query_params();
        assert!(params.iter().all(|(key, _)| *key != "category_id"));
    }

    #[test]
    fn full_filter_builds_every_param() {
        let params = NoteFilter::default()
            .search("  weekly plan ")
            .favorites(true)
            .category(CategoryFilter::Category(CategoryId::new(3)))
            .query_params();
        assert_eq!(
            params,
            vec![
                ("search", "weekly plan".to_string()),
                ("favorite", "true".to_string()),
                ("category_id", "3".to_string()),
            ]
        );
    }

    #[test]
    fn whitespace_search_is_omitted() {
        assert!(NoteFilter::default().search(" \t ").query_params().is_empty());
    }

    #[test]
    fn category_filter_parses_cli_values() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "none".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Uncategorized)
        );
        assert_eq!(
            " 8 ".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Category(CategoryId::new(8)))
        );
        assert!("work".parse::<CategoryFilter>().is_err());
    }
}
