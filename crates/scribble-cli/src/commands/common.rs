use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use scribble_core::models::{Category, CategoryId, Note, NoteImage};
use scribble_core::{ApiConfig, AuthClient, Session, Transport, UpdateCoordinator};
use serde::Serialize;

use crate::auth::KeyringSessionStore;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Resolved profile plus an API transport carrying its stored session.
#[derive(Debug)]
pub struct ApiContext {
    pub profile_name: String,
    pub profile: CliProfile,
    transport: Transport,
}

impl ApiContext {
    pub fn load(global_profile: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(global_profile);
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();

        let api_config = ApiConfig::from_env(profile.api_base_url())?;
        let session = Session::restore(KeyringSessionStore::new(&profile_name))?;
        let transport = Transport::new(api_config, session)?;
        tracing::debug!(
            profile = %profile_name,
            api = %transport.config().base_url(),
            "Resolved API context"
        );

        Ok(Self {
            profile_name,
            profile,
            transport,
        })
    }

    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.transport.clone())
    }

    pub fn coordinator(&self) -> UpdateCoordinator {
        UpdateCoordinator::new(self.transport.clone())
            .with_favorite_policy(self.profile.favorite_failure_policy)
    }

    /// Fails before any request when this profile has no stored token.
    pub fn require_session(&self) -> Result<(), CliError> {
        if self.transport.session().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn(self.profile_name.clone()))
        }
    }
}

/// `--category` value for `edit`: a category id, or `none` to clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryAssignment {
    Clear,
    Set(CategoryId),
}

impl CategoryAssignment {
    pub const fn category_id(self) -> Option<CategoryId> {
        match self {
            Self::Clear => None,
            Self::Set(id) => Some(id),
        }
    }
}

impl FromStr for CategoryAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "uncategorized" => Ok(Self::Clear),
            other => other
                .parse::<CategoryId>()
                .map(Self::Set)
                .map_err(|_| format!("expected a category id or 'none', got '{s}'")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub title: String,
    pub preview: String,
    pub category_id: Option<i64>,
    pub category: Option<String>,
    pub is_favorite: bool,
    pub visibility: String,
    pub updated_at: Option<String>,
    pub relative_time: String,
}

pub fn note_to_list_item(note: &Note, categories: &[Category], now: DateTime<Utc>) -> NoteListItem {
    NoteListItem {
        id: note.id.get(),
        title: note.title.clone(),
        preview: note_preview(&note.body, 80),
        category_id: note.category_id.map(CategoryId::get),
        category: category_label(note.category_id, categories),
        is_favorite: note.is_favorite,
        visibility: note.visibility.to_string(),
        updated_at: note.updated_at.map(|at| at.to_rfc3339()),
        relative_time: format_relative_time(note.updated_at, now),
    }
}

pub fn format_note_lines(notes: &[Note], categories: &[Category], now: DateTime<Utc>) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let star = if note.is_favorite { '*' } else { ' ' };
            let title = note_preview(&note.title, 36);
            let category = category_label(note.category_id, categories).unwrap_or_default();
            let relative_time = format_relative_time(note.updated_at, now);

            format!(
                "{:>6} {star} {title:<36}  {category:<14}  {relative_time}",
                note.id
            )
        })
        .collect()
}

pub fn format_category_lines(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .map(|category| format!("{:>6}  {}", category.id, category.name))
        .collect()
}

pub fn format_image_lines(images: &[NoteImage]) -> Vec<String> {
    images
        .iter()
        .map(|image| {
            let uploaded = image
                .created_at
                .map(format_timestamp)
                .unwrap_or_default();
            format!("{:>6}  {:<20}  {}", image.id, uploaded, image.url)
        })
        .collect()
}

/// The category's name, or `#id` when it is not in the list.
pub fn category_label(id: Option<CategoryId>, categories: &[Category]) -> Option<String> {
    let id = id?;
    Some(
        categories
            .iter()
            .find(|category| category.id == id)
            .map_or_else(|| format!("#{id}"), |category| category.name.clone()),
    )
}

/// First line of `text`, whitespace-collapsed and cut to `max_chars`.
pub fn note_preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_relative_time(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "-".to_string();
    };

    let diff = now.timestamp_millis().saturating_sub(at.timestamp_millis());
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Explicit body, else piped stdin, else empty.
pub fn resolve_body(body: Option<String>) -> Result<String, CliError> {
    if let Some(body) = body {
        return Ok(body);
    }
    Ok(read_piped_stdin()?.unwrap_or_default())
}

/// Explicit password, else the first line of piped stdin.
pub fn resolve_password(password: Option<String>) -> Result<String, CliError> {
    if let Some(password) = password.filter(|value| !value.is_empty()) {
        return Ok(password);
    }
    read_piped_stdin()?
        .and_then(|input| input.lines().next().map(str::to_string))
        .ok_or(CliError::MissingInput("password"))
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Opens the preferred editor on `initial_content` and returns what was saved.
pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(note_content)
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("scribble-note-{}-{now}.md", std::process::id()))
}
