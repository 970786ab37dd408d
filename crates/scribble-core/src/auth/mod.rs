//! Login, registration and logout against the notes API.
//!
//! These are the only writers of the session token. Both calls go out without
//! a bearer header, so a 401 here means bad credentials and leaves the
//! current session alone.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The server issued a token with the new account; the session now holds it.
    SignedIn,
    /// The account exists but the caller still has to log in.
    Registered { user_id: Option<i64> },
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    transport: Transport,
}

impl AuthClient {
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub const fn session(&self) -> &Session {
        self.transport.session()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        validate_credentials(username, password)?;

        let payload = LoginRequest {
            username: username.trim(),
            password,
        };
        let response: Option<TokenResponse> = self
            .transport
            .public_request(Method::POST, "/login", &payload)
            .await?;
        let token = response
            .and_then(|response| response.token)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                Error::InvalidState("Login response did not include a token".to_string())
            })?;

        self.session().set(token)?;
        tracing::info!("Signed in as {}", username.trim());
        Ok(())
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<SignUpOutcome> {
        validate_credentials(username, password)?;
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::validation("email is required"));
        }
        if !email.contains('@') {
            return Err(Error::validation("email must contain '@'"));
        }

        let payload = RegisterRequest {
            username: username.trim(),
            email,
            password,
        };
        let response: Option<RegisterResponse> = self
            .transport
            .public_request(Method::POST, "/register", &payload)
            .await?;
        let response = response.unwrap_or_default();

        match response.token.filter(|token| !token.trim().is_empty()) {
            Some(token) => {
                self.session().set(token)?;
                tracing::info!("Registered and signed in as {}", username.trim());
                Ok(SignUpOutcome::SignedIn)
            }
            None => {
                tracing::info!("Registered account {}", username.trim());
                Ok(SignUpOutcome::Registered {
                    user_id: response.id,
                })
            }
        }
    }

    /// Clears the local session. The API keeps no server-side session state.
    pub fn logout(&self) -> Result<()> {
        self.session().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::validation("username is required"));
    }
    if password.trim().is_empty() {
        return Err(Error::validation("password is required"));
    }
    Ok(())
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    token: Option<String>,
}
