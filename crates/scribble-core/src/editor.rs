//! Edit lifecycle for a single note.
//!
//! ```text
//! Viewing --start_editing--> Editing --begin_save--> Saving --save_succeeded--> Viewing
//!                               ^                       |
//!                               +------save_failed------+
//! Editing --cancel--> Viewing (drafts discarded)
//! ```
//!
//! The editor never talks to the network. [`NoteEditor::begin_save`] hands
//! out the patch to send and the caller reports the outcome back.

use crate::error::{Error, Result};
use crate::models::{image_markdown, Note, NotePatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone)]
pub struct NoteEditor {
    note: Note,
    phase: EditPhase,
    draft_title: String,
    draft_body: String,
    error: Option<String>,
}

impl NoteEditor {
    pub fn new(note: Note) -> Self {
        Self {
            draft_title: note.title.clone(),
            draft_body: note.body.clone(),
            note,
            phase: EditPhase::Viewing,
            error: None,
        }
    }

    /// The last confirmed server state.
    pub const fn note(&self) -> &Note {
        &self.note
    }

    pub const fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn draft_body(&self) -> &str {
        &self.draft_body
    }

    /// Message of the last failed save, shown while still editing.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start_editing(&mut self) -> Result<()> {
        match self.phase {
            EditPhase::Viewing => {
                self.reset_drafts();
                self.phase = EditPhase::Editing;
                Ok(())
            }
            EditPhase::Editing => Ok(()),
            EditPhase::Saving => Err(self.wrong_phase("start editing")),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.require(EditPhase::Editing, "change the title")?;
        self.draft_title = title.into();
        Ok(())
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> Result<()> {
        self.require(EditPhase::Editing, "change the body")?;
        self.draft_body = body.into();
        Ok(())
    }

    /// Embeds an uploaded image at the end of the draft body.
    ///
    /// Call only after the upload succeeded.
    pub fn append_image(&mut self, url: &str) -> Result<()> {
        self.require(EditPhase::Editing, "attach an image")?;
        self.draft_body.push_str(&image_markdown(url));
        Ok(())
    }

    /// Discards the drafts and restores the confirmed values.
    pub fn cancel(&mut self) -> Result<()> {
        match self.phase {
            EditPhase::Saving => Err(self.wrong_phase("cancel")),
            EditPhase::Viewing | EditPhase::Editing => {
                self.reset_drafts();
                self.phase = EditPhase::Viewing;
                Ok(())
            }
        }
    }

    /// Validates the drafts and moves to `Saving`.
    ///
    /// Returns the patch with only the changed title/body, or `None` when
    /// nothing changed, in which case the editor is already back in `Viewing`.
    /// A blank title fails validation and the editor stays in `Editing`.
    pub fn begin_save(&mut self) -> Result<Option<NotePatch>> {
        self.require(EditPhase::Editing, "save")?;

        let title = self.draft_title.trim();
        if title.is_empty() {
            let error = Error::validation("title required");
            self.error = Some(error.to_string());
            return Err(error);
        }
        let body = self.draft_body.trim();

        let mut patch = NotePatch::new();
        if title != self.note.title {
            patch = patch.with_title(title);
        }
        if body != self.note.body {
            patch = patch.with_body(body);
        }

        if patch.is_empty() {
            self.reset_drafts();
            self.phase = EditPhase::Viewing;
            return Ok(None);
        }

        self.error = None;
        self.phase = EditPhase::Saving;
        Ok(Some(patch))
    }

    pub fn save_succeeded(&mut self, note: Note) -> Result<()> {
        self.require(EditPhase::Saving, "finish saving")?;
        self.note = note;
        self.reset_drafts();
        self.phase = EditPhase::Viewing;
        Ok(())
    }

    /// Returns to `Editing` with the drafts intact.
    pub fn save_failed(&mut self, message: impl Into<String>) -> Result<()> {
        self.require(EditPhase::Saving, "fail saving")?;
        self.error = Some(message.into());
        self.phase = EditPhase::Editing;
        Ok(())
    }

    fn reset_drafts(&mut self) {
        self.draft_title.clone_from(&self.note.title);
        self.draft_body.clone_from(&self.note.body);
        self.error = None;
    }

    fn require(&self, phase: EditPhase, action: &str) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.wrong_phase(action))
        }
    }

    fn wrong_phase(&self, action: &str) -> Error {
        Error::InvalidState(format!("cannot {action} while {:?}", self.phase))
    }
}
