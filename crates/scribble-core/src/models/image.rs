//! Images attached to notes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Server-assigned image identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(i64);

impl ImageId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ImageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// An uploaded image as listed by `GET /notes/{id}/images`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteImage {
    pub id: ImageId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Binary image content ready to be posted as multipart form data.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Guesses the content type from the file name and rejects non-images.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into().trim().to_string();
        if file_name.is_empty() {
            return Err(Error::validation("image file name required"));
        }
        if bytes.is_empty() {
            return Err(Error::validation("image file is empty"));
        }

        let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(Error::validation(format!(
                "'{file_name}' is not an image ({mime})"
            )));
        }

        Ok(Self {
            file_name,
            content_type: mime.essence_str().to_string(),
            bytes,
        })
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedImage {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ImageListPayload {
    #[serde(default)]
    pub images: Option<Vec<NoteImage>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_guesses_image_content_type() {
        let upload = ImageUpload::new("receipt.PNG", vec![1, 2, 3]).unwrap();
        assert_eq!(upload.content_type, "image/png");

        let upload = ImageUpload::new("photo.jpeg", vec![1]).unwrap();
        assert_eq!(upload.content_type, "image/jpeg");
    }

    #[test]
    fn upload_rejects_non_images_and_empty_content() {
        assert!(ImageUpload::new("notes.txt", vec![1]).unwrap_err().is_validation());
        assert!(ImageUpload::new("a.png", Vec::new()).unwrap_err().is_validation());
        assert!(ImageUpload::new("  ", vec![1]).unwrap_err().is_validation());
    }

    #[test]
    fn upload_debug_omits_bytes() {
        let upload = ImageUpload::new("a.gif", vec![0; 64]).unwrap();
        let rendered = format!("{upload:?}");
        assert!(rendered.contains("len: 64"));
        assert!(!rendered.contains("bytes"));
    }
}
