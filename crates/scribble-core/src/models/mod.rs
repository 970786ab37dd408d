//! Data models for Scribble

mod category;
mod filter;
mod image;
mod note;

pub(crate) use category::CategoryListPayload;
pub use category::{Category, CategoryId};
pub use filter::{CategoryFilter, NoteFilter, UNCATEGORIZED_SENTINEL};
pub(crate) use image::{ImageListPayload, UploadedImage};
pub use image::{ImageId, ImageUpload, NoteImage};
pub use note::{extract_image_urls, image_markdown, NewNote, Note, NoteId, NotePatch, Visibility};
