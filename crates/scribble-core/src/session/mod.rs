//! Bearer-token session slot.
//!
//! A [`Session`] is a cheap, cloneable handle to one shared slot. The
//! transport reads it before every authenticated request; login writes it;
//! logout and authentication failures clear it. An optional
//! [`SessionPersistence`] backend keeps the token across restarts.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::error::{Error, Result};

/// Durable storage for the bearer token (OS keyring, browser storage, ...).
pub trait SessionPersistence: Send + Sync + 'static {
    fn load_token(&self) -> Result<Option<String>>;
    fn save_token(&self, token: &str) -> Result<()>;
    fn clear_token(&self) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct Session {
    slot: Arc<RwLock<Option<String>>>,
    store: Option<Arc<dyn SessionPersistence>>,
}

impl Session {
    /// An in-memory session with no token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An in-memory session already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(token.into()))),
            store: None,
        }
    }

    /// Loads the persisted token (if any) and writes through to `store` from now on.
    pub fn restore(store: impl SessionPersistence) -> Result<Self> {
        let token = store
            .load_token()?
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        Ok(Self {
            slot: Arc::new(RwLock::new(token)),
            store: Some(Arc::new(store)),
        })
    }

    /// Stores the trimmed `token`, overwriting any previous value.
    pub fn set(&self, token: impl AsRef<str>) -> Result<()> {
        let token = token.as_ref().trim().to_string();
        if token.is_empty() {
            return Err(Error::validation("session token must not be empty"));
        }
        if let Some(store) = &self.store {
            store.save_token(&token)?;
        }
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    /// Removes the token. The in-memory slot is always cleared, even when the
    /// persistence backend fails.
    pub fn clear(&self) -> Result<()> {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match &self.store {
            Some(store) => store.clear_token(),
            None => Ok(()),
        }
    }

    /// The current token, if signed in.
    pub fn current(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.is_authenticated() {
            Some("[REDACTED]")
        } else {
            None
        };
        formatter
            .debug_struct("Session")
            .field("token", &token)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

/// Process-local token store, for tests and ephemeral clients.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    token: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_token(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn save_token(&self, token: &str) -> Result<()> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        self.lock()?.take();
        Ok(())
    }
}
