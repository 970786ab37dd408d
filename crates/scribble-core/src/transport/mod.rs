//! Authenticated HTTP transport for the notes API.
//!
//! Every repository call goes through [`Transport`]. It attaches the bearer
//! token captured from the [`Session`] when the request is built, decodes
//! JSON payloads, and maps failures onto the crate's error taxonomy. A 401 on
//! an authenticated call clears the session before `AuthExpired` is returned;
//! deciding where to send the user next is left to the caller.

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::util::compact_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Bearer,
    Public,
}

#[derive(Debug, Clone)]
pub struct Transport {
    config: ApiConfig,
    client: Client,
    session: Session,
}

impl Transport {
    pub fn new(config: ApiConfig, session: Session) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Issues an authenticated JSON request.
    ///
    /// `body` is serialized as JSON when present and `query` is appended as
    /// URL-encoded parameters.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .request(method.clone(), self.config.endpoint(path))
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, &method, path, AuthMode::Bearer).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.request::<T, ()>(Method::GET, path, None, query).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body), &[]).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, ()>(Method::DELETE, path, None, &[]).await
    }

    /// Posts multipart form data (image uploads) with the bearer token.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let request = self
            .client
            .post(self.config.endpoint(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form);
        self.execute(request, &Method::POST, path, AuthMode::Bearer)
            .await
    }

    /// JSON request without the bearer token (login, register).
    ///
    /// A 401 here means bad credentials, not an expired session, so it is
    /// reported as `RequestFailed` and the session is left untouched.
    pub async fn public_request<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self
            .client
            .request(method.clone(), self.config.endpoint(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        self.execute(request, &method, path, AuthMode::Public).await
    }

    /// Reads the unauthenticated `GET /health` probe and returns its status text.
    pub async fn health(&self) -> Result<String> {
        let request = self.client.get(self.config.endpoint("/health"));
        let payload: Option<HealthResponse> = self
            .execute(request, &Method::GET, "/health", AuthMode::Public)
            .await?;
        Ok(payload
            .and_then(|payload| payload.status)
            .unwrap_or_else(|| "ok".to_string()))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &Method,
        path: &str,
        auth: AuthMode,
    ) -> Result<T> {
        let request = match (auth, self.session.current()) {
            (AuthMode::Bearer, Some(token)) => request.bearer_auth(token),
            _ => request,
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(
            method = %method,
            path,
            status = status.as_u16(),
            "API request completed"
        );

        let body = response.text().await?;
        if status.is_success() {
            return decode_body(&body);
        }
        Err(self.failure(status, &body, auth))
    }

    fn failure(&self, status: StatusCode, body: &str, auth: AuthMode) -> Error {
        let message = parse_api_error(status, body);
        match status {
            StatusCode::UNAUTHORIZED if auth == AuthMode::Bearer => {
                tracing::warn!("API rejected the session token ({message}); clearing session");
                if let Err(error) = self.session.clear() {
                    tracing::warn!("Failed to clear persisted session: {}", error);
                }
                Error::AuthExpired
            }
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::RequestFailed {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = body.trim();
    let body = if body.is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.error.or(payload.message) {
            let message = message.trim();
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}
