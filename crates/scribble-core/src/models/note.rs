//! Note model

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use super::CategoryId;
use crate::error::{Error, Result};

/// Server-assigned note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Who may see a note. Values the client does not know are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Shared,
    Other(String),
}

impl Visibility {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Shared => "shared",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Visibility {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "" | "private" => Self::Private,
            "public" => Self::Public,
            "shared" => Self::Shared,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<Visibility> for String {
    fn from(value: Visibility) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// A note as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Builds the note the server just created from the payload it accepted.
    pub(crate) fn from_created(id: NoteId, payload: &NewNote) -> Self {
        Self {
            id,
            title: payload.title.clone(),
            body: payload.body.clone(),
            category_id: payload.category_id,
            is_favorite: payload.is_favorite,
            visibility: payload.visibility.clone(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Image URLs embedded in the body as Markdown `![alt](url)` references.
    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        extract_image_urls(&self.body)
    }

    /// Whether the note is not assigned to any category
    #[must_use]
    pub const fn is_uncategorized(&self) -> bool {
        self.category_id.is_none()
    }
}

/// Input for creating a note.
///
/// `normalized` produces the exact payload sent to `POST /notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub body: String,
    pub category_id: Option<CategoryId>,
    pub is_favorite: bool,
    pub visibility: Visibility,
}

impl NewNote {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    #[must_use]
    pub const fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Trims title and body; fails when the title is blank.
    pub fn normalized(&self) -> Result<Self> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::validation("title required"));
        }
        Ok(Self {
            title: title.to_string(),
            body: self.body.trim().to_string(),
            category_id: self.category_id,
            is_favorite: self.is_favorite,
            visibility: self.visibility.clone(),
        })
    }
}

/// Partial update for `PATCH /notes/{id}`.
///
/// Only fields that are `Some` are transmitted. For `category_id`,
/// `Some(None)` clears the category (sent as `null`). For `is_favorite`,
/// `Some(None)` marks the field present without a value and is sent as
/// `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_unset_as_false"
    )]
    pub is_favorite: Option<Option<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl NotePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the category; `None` clears it.
    #[must_use]
    pub const fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub const fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(Some(is_favorite));
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// True when no field would be transmitted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.category_id.is_none()
            && self.is_favorite.is_none()
            && self.visibility.is_none()
    }

    /// Applies the patch to a local copy the same way the server does.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(body) = &self.body {
            note.body.clone_from(body);
        }
        if let Some(category_id) = self.category_id {
            note.category_id = category_id;
        }
        if let Some(is_favorite) = self.is_favorite {
            note.is_favorite = is_favorite.unwrap_or(false);
        }
        if let Some(visibility) = &self.visibility {
            note.visibility = visibility.clone();
        }
    }
}

#[allow(clippy::ref_option)]
fn serialize_unset_as_false<S: Serializer>(
    value: &Option<Option<bool>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_bool(value.flatten().unwrap_or(false))
}

/// Markdown snippet embedded into a note body after an image upload.
#[must_use]
pub fn image_markdown(url: &str) -> String {
    format!("\n\n![image]({url})")
}

/// Extract image URLs from Markdown `![alt](url)` references, in order.
///
/// # Examples
///
/// ```
/// use scribble_core::models::extract_image_urls;
///
/// let urls = extract_image_urls("Trip\n\n![image](http://localhost:8080/uploads/1_a.png)");
/// assert_eq!(urls, vec!["http://localhost:8080/uploads/1_a.png".to_string()]);
/// ```
#[must_use]
pub fn extract_image_urls(text: &str) -> Vec<String> {
    static IMAGE_RE: OnceLock<Regex> = OnceLock::new();
    let re = IMAGE_RE.get_or_init(|| {
        Regex::new(r"!\[[^\]]*\]\(([^)\s]+)\)").expect("image markdown regex is valid")
    });
    re.captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}
