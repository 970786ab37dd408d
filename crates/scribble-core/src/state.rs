//! In-memory view state: the filter selection plus the last fetched snapshots.
//!
//! Snapshots are derived data. Every filter change and every successful
//! mutation is followed by a fresh list fetch whose result replaces the notes
//! snapshot wholesale. Each fetch carries a [`FetchTicket`]; only the most
//! recently issued ticket may write its result, so a slow response for an
//! older filter can never overwrite a newer one.

use crate::models::{Category, CategoryFilter, CategoryId, Note, NoteFilter, NoteId};

/// Identifies one notes fetch and the filter it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    filter: NoteFilter,
}

impl FetchTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn filter(&self) -> &NoteFilter {
        &self.filter
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    filter: NoteFilter,
    notes: Vec<Note>,
    categories: Vec<Category>,
    issued: u64,
    loading: bool,
    last_error: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn filter(&self) -> &NoteFilter {
        &self.filter
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed notes fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.name.as_str())
    }

    pub fn notes_count(&self) -> usize {
        self.notes.len()
    }

    pub fn favorites_count(&self) -> usize {
        self.notes.iter().filter(|note| note.is_favorite).count()
    }

    /// Starts a notes fetch for the current filter, superseding any in flight.
    pub fn begin_notes_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket {
            generation: self.issued,
            filter: self.filter.clone(),
        }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.issued
    }

    /// Replaces the notes snapshot if `ticket` is still the newest fetch.
    ///
    /// Returns `false` when the response was stale and has been dropped.
    pub fn apply_notes(&mut self, ticket: &FetchTicket, notes: Vec<Note>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.issued,
                "Discarding stale notes response"
            );
            return false;
        }
        self.notes = notes;
        self.loading = false;
        self.last_error = None;
        true
    }

    /// Records a failed fetch. The current snapshot no longer matches the
    /// filter, so it is cleared.
    pub fn fail_notes_fetch(&mut self, ticket: &FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.notes.clear();
        self.loading = false;
        self.last_error = Some(message.into());
        true
    }

    pub fn replace_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    /// Drops every snapshot, e.g. after the session expired.
    pub fn reset(&mut self) {
        self.notes.clear();
        self.categories.clear();
        self.loading = false;
        self.last_error = None;
    }

    /// Installs `next` and returns a ticket for the re-fetch, or `None` when
    /// nothing changed.
    pub fn set_filter(&mut self, next: NoteFilter) -> Option<FetchTicket> {
        if next == self.filter {
            return None;
        }
        self.filter = next;
        Some(self.begin_notes_fetch())
    }

    pub fn set_search(&mut self, term: impl Into<String>) -> Option<FetchTicket> {
        let next = self.filter.clone().search(term);
        self.set_filter(next)
    }

    pub fn set_favorite_only(&mut self, favorite_only: bool) -> Option<FetchTicket> {
        let next = self.filter.clone().favorites(favorite_only);
        self.set_filter(next)
    }

    /// Sidebar "All notes": favorites off, every category.
    pub fn show_all_notes(&mut self) -> Option<FetchTicket> {
        let next = self
            .filter
            .clone()
            .favorites(false)
            .category(CategoryFilter::All);
        self.set_filter(next)
    }

    /// Sidebar "Favorites": favorites on, every category.
    pub fn show_favorites(&mut self) -> Option<FetchTicket> {
        let next = self
            .filter
            .clone()
            .favorites(true)
            .category(CategoryFilter::All);
        self.set_filter(next)
    }

    /// Sidebar category entry: restricts to `selection` and turns favorites off.
    pub fn select_category(&mut self, selection: CategoryFilter) -> Option<FetchTicket> {
        let next = self.filter.clone().favorites(false).category(selection);
        self.set_filter(next)
    }

    /// Sets the local favorite flag and returns the previous value.
    pub fn set_favorite(&mut self, id: NoteId, is_favorite: bool) -> Option<bool> {
        let note = self.notes.iter_mut().find(|note| note.id == id)?;
        let previous = note.is_favorite;
        note.is_favorite = is_favorite;
        Some(previous)
    }

    /// Flips the local favorite flag and returns the new value.
    pub fn flip_favorite(&mut self, id: NoteId) -> Option<bool> {
        let note = self.notes.iter_mut().find(|note| note.id == id)?;
        note.is_favorite = !note.is_favorite;
        Some(note.is_favorite)
    }

    /// Forgets a deleted category. If it was the selection, the selection
    /// falls back to all notes and a re-fetch ticket is returned.
    pub fn category_removed(&mut self, id: CategoryId) -> Option<FetchTicket> {
        self.categories.retain(|category| category.id != id);
        for note in &mut self.notes {
            if note.category_id == Some(id) {
                note.category_id = None;
            }
        }
        if self.filter.category == CategoryFilter::Category(id) {
            let next = self.filter.clone().category(CategoryFilter::All);
            return self.set_filter(next);
        }
        None
    }
}
