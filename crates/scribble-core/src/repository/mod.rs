//! Repositories over the notes API.

mod categories;
mod notes;

pub use categories::CategoriesRepository;
pub use notes::NotesRepository;
