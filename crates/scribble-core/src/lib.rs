//! scribble-core - Core library for Scribble
//!
//! This crate contains the note and category models, the bearer-token
//! session, the authenticated HTTP transport, the API repositories, and the
//! view state shared by every Scribble front end.

pub mod auth;
pub mod config;
pub mod coordinator;
pub mod editor;
pub mod error;
pub mod models;
pub mod repository;
pub mod session;
pub mod state;
pub mod transport;
mod util;

pub use auth::{AuthClient, SignUpOutcome};
pub use config::ApiConfig;
pub use coordinator::{FavoriteFailurePolicy, UpdateCoordinator};
pub use editor::{EditPhase, NoteEditor};
pub use error::{Error, Result};
pub use models::{Category, CategoryId, NewNote, Note, NoteFilter, NoteId, NotePatch};
pub use repository::{CategoriesRepository, NotesRepository};
pub use session::{MemorySessionStore, Session, SessionPersistence};
pub use state::{FetchTicket, ViewState};
pub use transport::Transport;
