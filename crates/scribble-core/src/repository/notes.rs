//! Note CRUD, filtered listing, and image attachments.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{
    ImageId, ImageListPayload, ImageUpload, NewNote, Note, NoteFilter, NoteId, NoteImage,
    NotePatch, UploadedImage,
};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct NotesRepository {
    transport: Transport,
}

#[derive(Debug, Deserialize)]
struct NoteListPayload {
    #[serde(default)]
    notes: Option<Vec<Note>>,
}

/// `POST /notes` answers with either the stored note or `{message, note_id}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatePayload {
    Full(Note),
    Ack { note_id: NoteId },
}

impl NotesRepository {
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Lists notes matching `filter`. A `null` list decodes as empty.
    pub async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let payload: Option<NoteListPayload> = self
            .transport
            .get("/notes", &filter.query_params())
            .await?;
        Ok(payload.and_then(|payload| payload.notes).unwrap_or_default())
    }

    pub async fn get_by_id(&self, id: NoteId) -> Result<Note> {
        let note: Option<Note> = self.transport.get(&note_path(id), &[]).await?;
        note.ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    /// Validates and normalizes `input`, then creates the note.
    ///
    /// Fails with `Validation("title required")` before any request when the
    /// title is blank.
    pub async fn create(&self, input: &NewNote) -> Result<Note> {
        let payload = input.normalized()?;
        let response: CreatePayload = self.transport.post("/notes", &payload).await?;
        let note = match response {
            CreatePayload::Full(note) => note,
            CreatePayload::Ack { note_id } => Note::from_created(note_id, &payload),
        };
        tracing::debug!(note_id = %note.id, "Created note");
        Ok(note)
    }

    /// Sends exactly the fields present in `patch` and returns the stored note.
    ///
    /// When the server only acknowledges the update, the note is re-read.
    pub async fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note> {
        match self.patch(id, patch).await? {
            Some(note) => Ok(note),
            None => self.get_by_id(id).await,
        }
    }

    /// Sends `PATCH /notes/{id}`. `Ok` means the server applied the change;
    /// the stored note is returned only when the response carries it.
    pub async fn patch(&self, id: NoteId, patch: &NotePatch) -> Result<Option<Note>> {
        if patch.is_empty() {
            return Err(Error::validation("no fields to update"));
        }

        let response: Value = self.transport.patch(&note_path(id), patch).await?;
        if response.get("id").is_some() {
            if let Ok(note) = serde_json::from_value::<Note>(response) {
                return Ok(Some(note));
            }
        }
        Ok(None)
    }

    pub async fn delete(&self, id: NoteId) -> Result<()> {
        let _: Option<Value> = self.transport.delete(&note_path(id)).await?;
        Ok(())
    }

    /// Uploads an image for the note and returns its public URL.
    ///
    /// The note body is not touched; embedding the URL is the caller's job.
    pub async fn upload_image(&self, id: NoteId, image: ImageUpload) -> Result<String> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new().part("image", part);

        let uploaded: UploadedImage = self
            .transport
            .upload(&format!("{}/images", note_path(id)), form)
            .await?;
        if uploaded.url.trim().is_empty() {
            return Err(Error::InvalidState(
                "Upload response did not include an image URL".to_string(),
            ));
        }
        Ok(uploaded.url)
    }

    pub async fn list_images(&self, id: NoteId) -> Result<Vec<NoteImage>> {
        let payload: Option<ImageListPayload> = self
            .transport
            .get(&format!("{}/images", note_path(id)), &[])
            .await?;
        Ok(payload.unwrap_or_default().images.unwrap_or_default())
    }

    pub async fn delete_image(&self, id: NoteId, image_id: ImageId) -> Result<()> {
        let _: Option<Value> = self
            .transport
            .delete(&format!("{}/images/{image_id}", note_path(id)))
            .await?;
        Ok(())
    }
}

fn note_path(id: NoteId) -> String {
    format!("/notes/{id}")
}
