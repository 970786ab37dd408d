//! Applies user intents to the API and reconciles results into [`ViewState`].
//!
//! Favorite toggles are optimistic: the local flag flips before the request
//! is sent. Create, edit and delete are confirm-first: local state only
//! changes once the server has accepted the mutation. Every successful
//! mutation is followed by a notes refresh; if only that refresh fails, the
//! mutation still reports success and the failure lands in the view state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::editor::{EditPhase, NoteEditor};
use crate::error::{Error, Result};
use crate::models::{
    image_markdown, Category, CategoryFilter, CategoryId, ImageUpload, NewNote, Note, NoteId,
    NoteFilter, NotePatch,
};
use crate::repository::{CategoriesRepository, NotesRepository};
use crate::session::Session;
use crate::state::{FetchTicket, ViewState};
use crate::transport::Transport;

/// What happens to the local favorite flag when the confirming update fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteFailurePolicy {
    /// Leave the flipped flag in place; the next refresh shows server truth.
    #[default]
    KeepOptimistic,
    /// Restore the previous flag.
    Revert,
}

pub struct UpdateCoordinator {
    notes: NotesRepository,
    categories: CategoriesRepository,
    session: Session,
    state: Mutex<ViewState>,
    creating: AtomicBool,
    favorite_policy: FavoriteFailurePolicy,
}

/// Holds the single in-flight-create slot until dropped.
struct CreateGuard<'a>(&'a AtomicBool);

impl<'a> CreateGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::CreateInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for CreateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl UpdateCoordinator {
    pub fn new(transport: Transport) -> Self {
        Self {
            session: transport.session().clone(),
            notes: NotesRepository::new(transport.clone()),
            categories: CategoriesRepository::new(transport),
            state: Mutex::new(ViewState::new()),
            creating: AtomicBool::new(false),
            favorite_policy: FavoriteFailurePolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_favorite_policy(mut self, policy: FavoriteFailurePolicy) -> Self {
        self.favorite_policy = policy;
        self
    }

    pub const fn favorite_policy(&self) -> FavoriteFailurePolicy {
        self.favorite_policy
    }

    pub const fn notes(&self) -> &NotesRepository {
        &self.notes
    }

    pub const fn categories(&self) -> &CategoriesRepository {
        &self.categories
    }

    /// A copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.state().clone()
    }

    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::Acquire)
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the cached view when the session just expired.
    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            if error.is_auth_expired() {
                self.state().reset();
            }
        }
        result
    }

    /// Initial load: categories, then notes for the current filter.
    pub async fn load(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            return Err(Error::Unauthenticated);
        }
        self.refresh_categories().await?;
        self.refresh_notes().await
    }

    pub async fn refresh_notes(&self) -> Result<()> {
        let ticket = self.state().begin_notes_fetch();
        self.run_fetch(ticket).await
    }

    pub async fn refresh_categories(&self) -> Result<()> {
        let categories = self.observe(self.categories.list().await)?;
        self.state().replace_categories(categories);
        Ok(())
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Result<()> {
        match self.notes.list(ticket.filter()).await {
            Ok(notes) => {
                self.state().apply_notes(&ticket, notes);
                Ok(())
            }
            Err(error) => {
                self.state().fail_notes_fetch(&ticket, error.to_string());
                self.observe(Err(error))
            }
        }
    }

    async fn refetch(&self, ticket: Option<FetchTicket>) -> Result<()> {
        match ticket {
            Some(ticket) => self.run_fetch(ticket).await,
            None => Ok(()),
        }
    }

    async fn refresh_after_mutation(&self) {
        if let Err(error) = self.refresh_notes().await {
            tracing::warn!("Refreshing notes after a change failed: {}", error);
        }
    }

    pub async fn set_search(&self, term: impl Into<String>) -> Result<()> {
        let ticket = self.state().set_search(term);
        self.refetch(ticket).await
    }

    pub async fn set_favorite_only(&self, favorite_only: bool) -> Result<()> {
        let ticket = self.state().set_favorite_only(favorite_only);
        self.refetch(ticket).await
    }

    pub async fn show_all_notes(&self) -> Result<()> {
        let ticket = self.state().show_all_notes();
        self.refetch(ticket).await
    }

    pub async fn show_favorites(&self) -> Result<()> {
        let ticket = self.state().show_favorites();
        self.refetch(ticket).await
    }

    pub async fn select_category(&self, selection: CategoryFilter) -> Result<()> {
        let ticket = self.state().select_category(selection);
        self.refetch(ticket).await
    }

    /// Replaces the whole filter and fetches, even when it is unchanged.
    pub async fn apply_filter(&self, filter: NoteFilter) -> Result<()> {
        let ticket = {
            let mut state = self.state();
            state
                .set_filter(filter)
                .unwrap_or_else(|| state.begin_notes_fetch())
        };
        self.run_fetch(ticket).await
    }

    /// Creates a note. Only one create may be outstanding at a time; a second
    /// call while the first is in flight fails with `CreateInFlight`.
    pub async fn create_note(&self, input: &NewNote) -> Result<Note> {
        let note = {
            let _guard = CreateGuard::acquire(&self.creating)?;
            self.observe(self.notes.create(input).await)?
        };
        self.refresh_after_mutation().await;
        Ok(note)
    }

    /// Flips the favorite flag locally, then confirms it with the server.
    ///
    /// Returns the new flag. On failure the error is returned and the local
    /// flag is handled according to the [`FavoriteFailurePolicy`].
    pub async fn toggle_favorite(&self, id: NoteId) -> Result<bool> {
        let Some(is_favorite) = self.state().flip_favorite(id) else {
            return Err(Error::InvalidState(format!(
                "note {id} is not in the current view"
            )));
        };

        let known = self.state().note(id).cloned();
        let patch = NotePatch::new().with_favorite(is_favorite);
        match self.apply_patch(id, &patch, known).await {
            Ok(_) => {
                self.refresh_after_mutation().await;
                Ok(is_favorite)
            }
            Err(error) => {
                tracing::warn!(
                    note_id = %id,
                    policy = ?self.favorite_policy,
                    "Favorite update failed: {}",
                    error
                );
                if self.favorite_policy == FavoriteFailurePolicy::Revert {
                    self.state().set_favorite(id, !is_favorite);
                }
                self.observe(Err(error))
            }
        }
    }

    /// Sends `patch` and returns the stored note.
    ///
    /// Once the server accepted the patch the update counts as applied: if
    /// re-reading an acknowledged update fails, `known` is patched locally.
    async fn apply_patch(
        &self,
        id: NoteId,
        patch: &NotePatch,
        known: Option<Note>,
    ) -> Result<Note> {
        if let Some(note) = self.notes.patch(id, patch).await? {
            return Ok(note);
        }

        match (self.notes.get_by_id(id).await, known) {
            (Ok(note), _) => Ok(note),
            (Err(error), Some(mut note)) => {
                tracing::warn!(note_id = %id, "Re-reading updated note failed: {}", error);
                if error.is_auth_expired() {
                    self.state().reset();
                }
                patch.apply_to(&mut note);
                Ok(note)
            }
            (Err(error), None) => Err(error),
        }
    }

    pub async fn delete_note(&self, id: NoteId) -> Result<()> {
        self.observe(self.notes.delete(id).await)?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Saves the editor's drafts. Nothing is sent when nothing changed.
    pub async fn save_edit(&self, editor: &mut NoteEditor) -> Result<()> {
        let Some(patch) = editor.begin_save()? else {
            return Ok(());
        };

        let known = editor.note().clone();
        match self.apply_patch(known.id, &patch, Some(known)).await {
            Ok(note) => {
                editor.save_succeeded(note)?;
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(error) => {
                editor.save_failed(error.to_string())?;
                self.observe(Err(error))
            }
        }
    }

    /// Uploads an image for the note being edited and embeds it in the draft.
    ///
    /// The draft body is only touched after the upload succeeded.
    pub async fn attach_image(&self, editor: &mut NoteEditor, image: ImageUpload) -> Result<String> {
        if editor.phase() != EditPhase::Editing {
            return Err(Error::InvalidState(
                "images can only be attached while editing".to_string(),
            ));
        }
        let url = self.observe(self.notes.upload_image(editor.note().id, image).await)?;
        editor.append_image(&url)?;
        Ok(url)
    }

    /// Uploads an image and appends its Markdown to the stored note body.
    pub async fn embed_image(&self, id: NoteId, image: ImageUpload) -> Result<Note> {
        let current = self.observe(self.notes.get_by_id(id).await)?;
        let url = self.observe(self.notes.upload_image(id, image).await)?;

        let body = format!("{}{}", current.body, image_markdown(&url));
        let patch = NotePatch::new().with_body(body);
        let note = self.observe(self.apply_patch(id, &patch, Some(current)).await)?;
        self.refresh_after_mutation().await;
        Ok(note)
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let category = self.observe(self.categories.create(name).await)?;
        if let Err(error) = self.refresh_categories().await {
            tracing::warn!("Refreshing categories failed: {}", error);
        }
        Ok(category)
    }

    /// Deletes a category. Its notes become uncategorized server-side, so
    /// notes are re-fetched as well.
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.observe(self.categories.delete(id).await)?;
        let ticket = self.state().category_removed(id);

        if let Err(error) = self.refresh_categories().await {
            tracing::warn!("Refreshing categories failed: {}", error);
        }
        let refreshed = match ticket {
            Some(ticket) => self.run_fetch(ticket).await,
            None => self.refresh_notes().await,
        };
        if let Err(error) = refreshed {
            tracing::warn!("Refreshing notes after a change failed: {}", error);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::Method::{DELETE, GET, PATCH, POST};
    use httpmock::{Mock, MockServer};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::config::ApiConfig;

    fn coordinator(server: &MockServer, session: Session) -> UpdateCoordinator {
        let transport =
            Transport::new(ApiConfig::new(&server.base_url()).unwrap(), session).unwrap();
        UpdateCoordinator::new(transport)
    }

    fn note_json(id: i64, title: &str, is_favorite: bool) -> Value {
        json!({
            "id": id,
            "title": title,
            "body": "text",
            "category_id": null,
            "is_favorite": is_favorite,
            "visibility": "private"
        })
    }

    fn new_note_json(title: &str) -> Value {
        json!({
            "title": title,
            "body": "",
            "category_id": null,
            "is_favorite": false,
            "visibility": "private"
        })
    }

    fn editing(title: &str) -> NoteEditor {
        let note: Note = serde_json::from_value(note_json(4, title, false)).unwrap();
        let mut editor = NoteEditor::new(note);
        editor.start_editing().unwrap();
        editor
    }

    /// Answers every unfiltered `GET /notes` with `notes`.
    async fn mock_notes(server: &MockServer, notes: Vec<Value>) -> Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/notes");
                then.status(200).json_body(json!({ "notes": notes }));
            })
            .await
    }

    #[tokio::test]
    async fn load_without_token_sends_nothing() {
        let server = MockServer::start_async().await;
        let any = server
            .mock_async(|_when, then| {
                then.status(500);
            })
            .await;
        let coordinator = coordinator(&server, Session::new());

        let error = coordinator.load().await.unwrap_err();

        assert!(matches!(error, Error::Unauthenticated));
        any.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn load_fetches_categories_then_notes() {
        let server = MockServer::start_async().await;
        let categories = server
            .mock_async(|when, then| {
                when.method(GET).path("/categories");
                then.status(200).json_body(json!([{"id": 1, "name": "Work"}]));
            })
            .await;
        let notes = mock_notes(
            &server,
            vec![note_json(1, "A", false), note_json(2, "B", true)],
        )
        .await;
        let coordinator = coordinator(&server, Session::with_token("t"));

        coordinator.load().await.unwrap();

        let view = coordinator.snapshot();
        assert_eq!(view.categories().len(), 1);
        assert_eq!(view.notes_count(), 2);
        assert_eq!(view.favorites_count(), 1);
        categories.assert_hits_async(1).await;
        notes.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn apply_filter_fetches_even_when_unchanged() {
        let server = MockServer::start_async().await;
        let filtered = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/notes")
                    .query_param("favorite", "true")
                    .query_param("category_id", "none");
                then.status(200)
                    .json_body(json!({"notes": [note_json(2, "B", true)]}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        let filter = NoteFilter::default()
            .favorites(true)
            .category(CategoryFilter::Uncategorized);

        coordinator.apply_filter(filter.clone()).await.unwrap();
        coordinator.apply_filter(filter.clone()).await.unwrap();

        filtered.assert_hits_async(2).await;
        assert_eq!(coordinator.snapshot().filter(), &filter);
        assert_eq!(coordinator.snapshot().notes_count(), 1);
    }

    #[tokio::test]
    async fn toggling_twice_restores_original_flag() {
        let server = MockServer::start_async().await;
        let mark = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/notes/1")
                    .json_body(json!({"is_favorite": true}));
                then.status(200).json_body(note_json(1, "A", true));
            })
            .await;
        let unmark = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/notes/1")
                    .json_body(json!({"is_favorite": false}));
                then.status(200).json_body(note_json(1, "A", false));
            })
            .await;
        let mut listing = mock_notes(&server, vec![note_json(1, "A", false)]).await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        coordinator.refresh_notes().await.unwrap();

        listing.delete_async().await;
        listing = mock_notes(&server, vec![note_json(1, "A", true)]).await;
        assert!(coordinator.toggle_favorite(NoteId::new(1)).await.unwrap());

        listing.delete_async().await;
        mock_notes(&server, vec![note_json(1, "A", false)]).await;
        assert!(!coordinator.toggle_favorite(NoteId::new(1)).await.unwrap());

        mark.assert_hits_async(1).await;
        unmark.assert_hits_async(1).await;
        assert!(!coordinator.snapshot().notes()[0].is_favorite);
    }

    #[tokio::test]
    async fn failed_toggle_keeps_optimistic_flag_by_default() {
        let server = MockServer::start_async().await;
        mock_notes(&server, vec![note_json(1, "A", false)]).await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/notes/1");
                then.status(500)
                    .json_body(json!({"error": "Failed to update note"}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        coordinator.refresh_notes().await.unwrap();

        let error = coordinator.toggle_favorite(NoteId::new(1)).await.unwrap_err();

        assert_eq!(error.status(), Some(500));
        assert!(coordinator.snapshot().notes()[0].is_favorite);
    }

    #[tokio::test]
    async fn failed_toggle_reverts_with_revert_policy() {
        let server = MockServer::start_async().await;
        mock_notes(&server, vec![note_json(1, "A", false)]).await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/notes/1");
                then.status(500)
                    .json_body(json!({"error": "Failed to update note"}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"))
            .with_favorite_policy(FavoriteFailurePolicy::Revert);
        coordinator.refresh_notes().await.unwrap();

        assert!(coordinator.toggle_favorite(NoteId::new(1)).await.is_err());
        assert!(!coordinator.snapshot().notes()[0].is_favorite);
    }

    #[tokio::test]
    async fn acknowledged_toggle_counts_as_applied_when_reread_fails() {
        let server = MockServer::start_async().await;
        let patch = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/notes/1")
                    .json_body(json!({"is_favorite": true}));
                then.status(200).json_body(json!({"message": "Note updated"}));
            })
            .await;
        let reread = server
            .mock_async(|when, then| {
                when.method(GET).path("/notes/1");
                then.status(500)
                    .json_body(json!({"error": "Failed to fetch note"}));
            })
            .await;
        let mut listing = mock_notes(&server, vec![note_json(1, "A", false)]).await;
        let coordinator = coordinator(&server, Session::with_token("t"))
            .with_favorite_policy(FavoriteFailurePolicy::Revert);
        coordinator.refresh_notes().await.unwrap();
        listing.delete_async().await;
        mock_notes(&server, vec![note_json(1, "A", true)]).await;

        assert!(coordinator.toggle_favorite(NoteId::new(1)).await.unwrap());

        assert!(coordinator.snapshot().notes()[0].is_favorite);
        patch.assert_hits_async(1).await;
        reread.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn second_create_is_rejected_while_first_is_in_flight() {
        let server = MockServer::start_async().await;
        let first_post = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/notes")
                    .json_body(new_note_json("First"));
                then.status(200)
                    .json_body(json!({"note_id": 10}))
                    .delay(Duration::from_millis(100));
            })
            .await;
        let second_post = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/notes")
                    .json_body(new_note_json("Second"));
                then.status(200).json_body(json!({"note_id": 99}));
            })
            .await;
        let third_post = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/notes")
                    .json_body(new_note_json("Third"));
                then.status(200).json_body(json!({"note_id": 11}));
            })
            .await;
        mock_notes(
            &server,
            vec![note_json(10, "First", false), note_json(11, "Third", false)],
        )
        .await;
        let coordinator = coordinator(&server, Session::with_token("t"));

        let first = NewNote::new("First");
        let second = NewNote::new("Second");
        let (first, second) = tokio::join!(
            coordinator.create_note(&first),
            coordinator.create_note(&second)
        );

        assert_eq!(first.unwrap().id, NoteId::new(10));
        assert!(matches!(second.unwrap_err(), Error::CreateInFlight));
        assert!(!coordinator.is_creating());

        let third = coordinator.create_note(&NewNote::new("Third")).await.unwrap();
        assert_eq!(third.id, NoteId::new(11));
        assert_eq!(coordinator.snapshot().notes_count(), 2);
        first_post.assert_hits_async(1).await;
        second_post.assert_hits_async(0).await;
        third_post.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn refresh_failure_does_not_fail_successful_delete() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/notes/1");
                then.status(200)
                    .json_body(json!({"message": "Note deleted successfully"}));
            })
            .await;
        let mut listing = mock_notes(&server, vec![note_json(1, "A", false)]).await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        coordinator.refresh_notes().await.unwrap();
        listing.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/notes");
                then.status(500)
                    .json_body(json!({"error": "Failed to fetch notes"}));
            })
            .await;

        coordinator.delete_note(NoteId::new(1)).await.unwrap();

        let view = coordinator.snapshot();
        assert!(view.notes().is_empty());
        assert_eq!(view.last_error(), Some("Request failed with HTTP 500: Failed to fetch notes"));
    }

    #[tokio::test]
    async fn failed_delete_leaves_view_untouched() {
        let server = MockServer::start_async().await;
        let listing = mock_notes(&server, vec![note_json(1, "A", false)]).await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/notes/1");
                then.status(404)
                    .json_body(json!({"error": "Note not found or not owned by user"}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        coordinator.refresh_notes().await.unwrap();

        assert!(coordinator.delete_note(NoteId::new(1)).await.is_err());
        assert_eq!(coordinator.snapshot().notes_count(), 1);
        listing.assert_hits_async(1).await;
        delete.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn expired_session_clears_session_and_view() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/notes").query_param_missing("search");
                then.status(200)
                    .json_body(json!({"notes": [note_json(1, "A", false)]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/notes").query_param("search", "x");
                then.status(401)
                    .json_body(json!({"error": "Invalid or expired token"}));
            })
            .await;
        let session = Session::with_token("t");
        let coordinator = coordinator(&server, session.clone());
        coordinator.refresh_notes().await.unwrap();

        let error = coordinator.set_search("x").await.unwrap_err();

        assert!(error.is_auth_expired());
        assert!(!session.is_authenticated());
        assert!(coordinator.snapshot().notes().is_empty());
    }

    #[tokio::test]
    async fn filter_intents_refetch_only_on_change() {
        let server = MockServer::start_async().await;
        let favorites = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/notes")
                    .query_param("favorite", "true")
                    .query_param_missing("category_id");
                then.status(200)
                    .json_body(json!({"notes": [note_json(2, "Fav", true)]}));
            })
            .await;
        let uncategorized = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/notes")
                    .query_param("category_id", "none")
                    .query_param_missing("favorite");
                then.status(200).json_body(json!({"notes": []}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));

        coordinator.show_favorites().await.unwrap();
        coordinator.show_favorites().await.unwrap();
        coordinator
            .select_category(CategoryFilter::Uncategorized)
            .await
            .unwrap();

        favorites.assert_hits_async(1).await;
        uncategorized.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn save_edit_failure_keeps_drafts() {
        let server = MockServer::start_async().await;
        let patch = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/notes/4")
                    .json_body(json!({"title": "Road trip"}));
                then.status(500)
                    .json_body(json!({"error": "Failed to update note"}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        let mut editor = editing("Trip");
        editor.set_title("Road trip").unwrap();

        assert!(coordinator.save_edit(&mut editor).await.is_err());

        assert_eq!(editor.phase(), EditPhase::Editing);
        assert_eq!(editor.draft_title(), "Road trip");
        patch.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn save_edit_success_returns_to_viewing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/notes/4");
                then.status(200).json_body(note_json(4, "Road trip", false));
            })
            .await;
        mock_notes(&server, vec![note_json(4, "Road trip", false)]).await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        let mut editor = editing("Trip");
        editor.set_title("Road trip").unwrap();

        coordinator.save_edit(&mut editor).await.unwrap();

        assert_eq!(editor.phase(), EditPhase::Viewing);
        assert_eq!(editor.note().title, "Road trip");
        assert_eq!(coordinator.snapshot().notes()[0].title, "Road trip");
    }

    #[tokio::test]
    async fn acknowledged_save_returns_to_viewing_when_reread_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/notes/4")
                    .json_body(json!({"title": "Road trip"}));
                then.status(200).json_body(json!({"message": "Note updated"}));
            })
            .await;
        let reread = server
            .mock_async(|when, then| {
                when.method(GET).path("/notes/4");
                then.status(500)
                    .json_body(json!({"error": "Failed to fetch note"}));
            })
            .await;
        mock_notes(&server, vec![note_json(4, "Road trip", false)]).await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        let mut editor = editing("Trip");
        editor.set_title("Road trip").unwrap();

        coordinator.save_edit(&mut editor).await.unwrap();

        assert_eq!(editor.phase(), EditPhase::Viewing);
        assert_eq!(editor.note().title, "Road trip");
        assert_eq!(editor.note().body, "text");
        reread.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn failed_upload_leaves_draft_body_unchanged() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/notes/4/images");
                then.status(500)
                    .json_body(json!({"error": "Failed to save image"}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        let mut editor = editing("Trip");

        let upload = ImageUpload::new("map.png", vec![1, 2, 3]).unwrap();
        assert!(coordinator.attach_image(&mut editor, upload).await.is_err());
        assert_eq!(editor.draft_body(), "text");
    }

    #[tokio::test]
    async fn successful_upload_appends_markdown() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/notes/4/images");
                then.status(200).json_body(json!({
                    "message": "Image uploaded successfully",
                    "image_id": 1,
                    "url": "http://h/uploads/4_map.png"
                }));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        let mut editor = editing("Trip");

        let upload = ImageUpload::new("map.png", vec![1, 2, 3]).unwrap();
        coordinator.attach_image(&mut editor, upload).await.unwrap();

        assert_eq!(editor.draft_body(), "text\n\n![image](http://h/uploads/4_map.png)");
    }

    #[tokio::test]
    async fn embed_image_patches_stored_body() {
        let server = MockServer::start_async().await;
        let read = server
            .mock_async(|when, then| {
                when.method(GET).path("/notes/4");
                then.status(200).json_body(note_json(4, "Trip", false));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/notes/4/images");
                then.status(200)
                    .json_body(json!({"url": "http://h/uploads/4_map.png"}));
            })
            .await;
        let patch = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/notes/4")
                    .json_body(json!({"body": "text\n\n![image](http://h/uploads/4_map.png)"}));
                then.status(200)
                    .json_body(json!({"message": "Note updated successfully"}));
            })
            .await;
        mock_notes(&server, Vec::new()).await;
        let coordinator = coordinator(&server, Session::with_token("t"));

        let upload = ImageUpload::new("map.png", vec![1]).unwrap();
        coordinator.embed_image(NoteId::new(4), upload).await.unwrap();

        patch.assert_hits_async(1).await;
        read.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn deleting_selected_category_resets_selection() {
        let server = MockServer::start_async().await;
        let mut categories = server
            .mock_async(|when, then| {
                when.method(GET).path("/categories");
                then.status(200)
                    .json_body(json!([{"id": 1, "name": "Work"}, {"id": 2, "name": "Home"}]));
            })
            .await;
        let in_category = server
            .mock_async(|when, then| {
                when.method(GET).path("/notes").query_param("category_id", "1");
                then.status(200)
                    .json_body(json!({"notes": [note_json(1, "A", false)]}));
            })
            .await;
        let unfiltered = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/notes")
                    .query_param_missing("category_id");
                then.status(200)
                    .json_body(json!({"notes": [note_json(1, "A", false)]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/categories/1");
                then.status(200)
                    .json_body(json!({"message": "Category deleted successfully"}));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));
        coordinator.refresh_categories().await.unwrap();
        coordinator
            .select_category(CategoryFilter::Category(CategoryId::new(1)))
            .await
            .unwrap();
        categories.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/categories");
                then.status(200).json_body(json!([{"id": 2, "name": "Home"}]));
            })
            .await;

        coordinator.delete_category(CategoryId::new(1)).await.unwrap();

        let view = coordinator.snapshot();
        assert_eq!(view.filter().category, CategoryFilter::All);
        assert_eq!(view.categories().len(), 1);
        in_category.assert_hits_async(1).await;
        unfiltered.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn create_category_refreshes_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/categories")
                    .json_body(json!({"name": "Ideas"}));
                then.status(200).json_body(json!({"id": 3, "name": "Ideas"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/categories");
                then.status(200).json_body(json!([{"id": 3, "name": "Ideas"}]));
            })
            .await;
        let coordinator = coordinator(&server, Session::with_token("t"));

        let category = coordinator.create_category(" Ideas ").await.unwrap();

        assert_eq!(category.id, CategoryId::new(3));
        assert_eq!(
            coordinator.snapshot().category_name(CategoryId::new(3)),
            Some("Ideas")
        );
    }
}
