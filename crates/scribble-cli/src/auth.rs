//! Session token persistence in the OS keychain, one entry per profile.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;
use scribble_core::{Error, Result, SessionPersistence};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "scribble";

#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    username: String,
}

impl KeyringSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("session_token:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(test)]
    fn with_test_store<T>(&self, apply: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        Ok(apply(&mut guard))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for KeyringSessionStore {
    #[cfg(not(test))]
    fn load_token(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_token(&self) -> Result<Option<String>> {
        self.with_test_store(|store| store.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    fn save_token(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_token(&self, token: &str) -> Result<()> {
        self.with_test_store(|store| {
            store.insert(self.username.clone(), token.to_string());
        })
    }

    #[cfg(not(test))]
    fn clear_token(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_token(&self) -> Result<()> {
        self.with_test_store(|store| {
            store.remove(&self.username);
        })
    }
}
