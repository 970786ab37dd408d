use std::path::Path;

use chrono::Utc;
use scribble_core::models::{
    CategoryFilter, CategoryId, ImageUpload, NewNote, NoteFilter, NoteId, NotePatch, Visibility,
};
use scribble_core::NoteEditor;

use super::common::{
    capture_editor_input_with_initial, category_label, format_note_lines, format_timestamp,
    note_to_list_item, print_json, resolve_body, ApiContext, CategoryAssignment,
};
use crate::error::CliError;

pub async fn run_list(
    context: &ApiContext,
    search: Option<String>,
    favorites: bool,
    category: CategoryFilter,
    json: bool,
) -> Result<(), CliError> {
    context.require_session()?;
    let coordinator = context.coordinator();
    coordinator.refresh_categories().await?;

    let filter = NoteFilter::default()
        .search(search.unwrap_or_default())
        .favorites(favorites)
        .category(category);
    coordinator.apply_filter(filter).await?;

    let view = coordinator.snapshot();
    let now = Utc::now();
    if json {
        let items = view
            .notes()
            .iter()
            .map(|note| note_to_list_item(note, view.categories(), now))
            .collect::<Vec<_>>();
        return print_json(&items);
    }

    if view.notes().is_empty() {
        println!("No notes found.");
        return Ok(());
    }
    for line in format_note_lines(view.notes(), view.categories(), now) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_show(context: &ApiContext, id: NoteId, json: bool) -> Result<(), CliError> {
    context.require_session()?;
    let coordinator = context.coordinator();
    let note = coordinator.notes().get_by_id(id).await?;

    if json {
        return print_json(&note);
    }

    let categories = if note.category_id.is_some() {
        coordinator.categories().list().await?
    } else {
        Vec::new()
    };

    let star = if note.is_favorite { " *" } else { "" };
    println!("{}{star}", note.title);
    println!("id: {}  visibility: {}", note.id, note.visibility);
    if let Some(category) = category_label(note.category_id, &categories) {
        println!("category: {category}");
    }
    if let Some(updated_at) = note.updated_at {
        println!("updated: {}", format_timestamp(updated_at));
    }
    if !note.body.is_empty() {
        println!();
        println!("{}", note.body);
    }
    Ok(())
}

pub async fn run_add(
    context: &ApiContext,
    title: String,
    body: Option<String>,
    category: Option<CategoryId>,
    favorite: bool,
    visibility: Option<Visibility>,
) -> Result<(), CliError> {
    context.require_session()?;
    let body = resolve_body(body)?;

    let mut input = NewNote::new(title)
        .with_body(body)
        .with_category(category)
        .with_favorite(favorite);
    if let Some(visibility) = visibility {
        input = input.with_visibility(visibility);
    }

    let note = context.coordinator().create_note(&input).await?;
    println!("Created note {} ({})", note.id, note.title);
    Ok(())
}

/// Field-level edits parsed from `scribble edit` flags.
#[derive(Debug, Default)]
pub struct EditFields {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<CategoryAssignment>,
    pub visibility: Option<Visibility>,
    pub favorite: Option<bool>,
}

impl EditFields {
    pub fn into_patch(self) -> NotePatch {
        let mut patch = NotePatch::new();
        if let Some(title) = self.title {
            patch = patch.with_title(title);
        }
        if let Some(body) = self.body {
            patch = patch.with_body(body);
        }
        if let Some(category) = self.category {
            patch = patch.with_category(category.category_id());
        }
        if let Some(visibility) = self.visibility {
            patch = patch.with_visibility(visibility);
        }
        if let Some(favorite) = self.favorite {
            patch = patch.with_favorite(favorite);
        }
        patch
    }
}

pub async fn run_edit(context: &ApiContext, id: NoteId, fields: EditFields) -> Result<(), CliError> {
    context.require_session()?;
    let coordinator = context.coordinator();
    let patch = fields.into_patch();

    if !patch.is_empty() {
        let note = coordinator.notes().update(id, &patch).await?;
        println!("Updated note {} ({})", note.id, note.title);
        return Ok(());
    }

    let note = coordinator.notes().get_by_id(id).await?;
    let mut editor = NoteEditor::new(note);
    editor.start_editing()?;
    let edited = capture_editor_input_with_initial(editor.draft_body())?;
    if edited.trim() == editor.note().body.trim() {
        println!("Note {id} unchanged");
        return Ok(());
    }

    editor.set_body(edited.trim_end())?;
    coordinator.save_edit(&mut editor).await?;
    println!("Updated note {}", editor.note().id);
    Ok(())
}

pub async fn run_favorite(context: &ApiContext, id: NoteId) -> Result<(), CliError> {
    context.require_session()?;
    let coordinator = context.coordinator();
    coordinator.load().await?;

    if coordinator.snapshot().note(id).is_none() {
        return Err(scribble_core::Error::NotFound(format!("note {id}")).into());
    }

    if coordinator.toggle_favorite(id).await? {
        println!("Note {id} marked as favorite");
    } else {
        println!("Note {id} removed from favorites");
    }
    Ok(())
}

pub async fn run_delete(context: &ApiContext, id: NoteId) -> Result<(), CliError> {
    context.require_session()?;
    context.coordinator().delete_note(id).await?;
    println!("Deleted note {id}");
    Ok(())
}

pub async fn run_attach(context: &ApiContext, id: NoteId, path: &Path) -> Result<(), CliError> {
    context.require_session()?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(CliError::MissingInput("image file name"))?
        .to_string();
    let bytes = std::fs::read(path)?;
    let upload = ImageUpload::new(file_name, bytes)?;

    let note = context.coordinator().embed_image(id, upload).await?;
    let url = note.image_urls().pop().unwrap_or_default();
    println!("Attached image to note {}: {url}", note.id);
    Ok(())
}
