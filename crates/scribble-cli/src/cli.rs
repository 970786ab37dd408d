use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use scribble_core::models::{CategoryFilter, CategoryId, ImageId, NoteId, Visibility};
use scribble_core::FavoriteFailurePolicy;

use crate::commands::common::CategoryAssignment;

#[derive(Parser)]
#[command(name = "scribble")]
#[command(about = "Notes with categories, favorites, and inline images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (API address and stored session)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token in the OS keychain
    Login {
        #[arg(short, long, value_name = "NAME")]
        username: String,
        /// Password (read from piped stdin when omitted)
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long, value_name = "NAME")]
        username: String,
        #[arg(short, long, value_name = "EMAIL")]
        email: String,
        /// Password (read from piped stdin when omitted)
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,
    },
    /// Forget the stored session for this profile
    Logout,
    /// Show server health and sign-in state
    Status,
    /// List notes
    List {
        /// Only notes whose title or body contains TEXT
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
        /// Only favorite notes
        #[arg(short, long)]
        favorites: bool,
        /// `all`, `none` (uncategorized), or a category id
        #[arg(short, long, value_name = "CATEGORY", default_value = "all")]
        category: CategoryFilter,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note
    Show {
        id: NoteId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    #[command(alias = "new")]
    Add {
        title: String,
        /// Note body (read from piped stdin when omitted)
        #[arg(short, long)]
        body: Option<String>,
        #[arg(short, long, value_name = "ID")]
        category: Option<CategoryId>,
        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
        #[arg(long, value_name = "VISIBILITY")]
        visibility: Option<Visibility>,
    },
    /// Update a note; only the given fields are sent. Without flags the body
    /// opens in $EDITOR.
    Edit {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// Category id, or `none` to clear it
        #[arg(long, value_name = "ID|none")]
        category: Option<CategoryAssignment>,
        #[arg(long, value_name = "VISIBILITY")]
        visibility: Option<Visibility>,
        #[arg(long, value_name = "true|false", value_parser = clap::value_parser!(bool))]
        favorite: Option<bool>,
    },
    /// Toggle the favorite flag
    Favorite { id: NoteId },
    /// Delete a note
    Delete { id: NoteId },
    /// Upload an image and embed it at the end of the note body
    Attach { id: NoteId, path: PathBuf },
    /// Manage uploaded images
    Images {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FavoritePolicyArg {
    /// Leave the flipped flag until the next refresh
    Keep,
    /// Restore the previous flag
    Revert,
}

impl From<FavoritePolicyArg> for FavoriteFailurePolicy {
    fn from(value: FavoritePolicyArg) -> Self {
        match value {
            FavoritePolicyArg::Keep => Self::KeepOptimistic,
            FavoritePolicyArg::Revert => Self::Revert,
        }
    }
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// List images uploaded for a note
    List {
        id: NoteId,
        #[arg(long)]
        json: bool,
    },
    /// Delete an uploaded image
    Delete { id: NoteId, image_id: ImageId },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a category
    Add { name: String },
    /// Delete a category; its notes become uncategorized
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Notes API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// What happens to the local favorite flag when the server rejects a toggle
        #[arg(long, value_enum, value_name = "POLICY")]
        favorite_on_failure: Option<FavoritePolicyArg>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show,
}
