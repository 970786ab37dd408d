use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] scribble_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Profile '{0}' is not signed in. Run `scribble login` first.")]
    NotSignedIn(String),
    #[error("No {0} provided")]
    MissingInput(&'static str),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
}

impl CliError {
    /// Follow-up advice printed under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Core(error) if error.is_auth_expired() => {
                Some("Your session is no longer valid. Run `scribble login` to sign in again.")
            }
            Self::Core(scribble_core::Error::Transport(_)) => {
                Some("Check that the API is reachable (`scribble status`).")
            }
            _ => None,
        }
    }
}
