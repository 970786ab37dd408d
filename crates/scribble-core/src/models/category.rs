//! Category model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CategoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A category for organizing notes
///
/// Names are not unique client-side; duplicates are the server's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// `GET /categories` answers with a bare array, a wrapped object, or `null`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CategoryListPayload {
    Bare(Vec<Category>),
    Wrapped {
        #[serde(default)]
        categories: Option<Vec<Category>>,
    },
}

impl CategoryListPayload {
    pub(crate) fn into_categories(payload: Option<Self>) -> Vec<Category> {
        match payload {
            Some(Self::Bare(categories)) => categories,
            Some(Self::Wrapped { categories }) => categories.unwrap_or_default(),
            None => Vec::new(),
        }
    }
}
