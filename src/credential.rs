//! API key persistence via OS keyring
//!
//! The generative API key is the only value Stargazer persists. It is
//! stored under a fixed name in the operating system's credential store
//! (Keychain on macOS, Secret Service on Linux, Windows Credential Manager
//! on Windows). An empty key disables sending; no other validation is done.

use std::sync::Mutex;

use crate::error::{Result, StargazerError};

/// Keyring service name
pub const SERVICE_NAME: &str = "stargazer";

/// Fixed name the API key is stored under
pub const API_KEY_NAME: &str = "gemini_api_key";

/// Environment variable consulted when nothing is stored
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Client-local key-value store holding the API key
pub trait CredentialStore: Send + Sync {
    /// Read the stored key, `None` when nothing is stored
    fn load(&self) -> Result<Option<String>>;

    /// Persist `value`, replacing any previous key
    fn save(&self, value: &str) -> Result<()>;

    /// Remove the stored key; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Stateless accessor for the OS native keyring
///
/// # Examples
///
/// ```no_run
/// use stargazer::credential::{CredentialStore, KeyringCredentialStore};
///
/// # fn example() -> stargazer::error::Result<()> {
/// let store = KeyringCredentialStore;
/// store.save("my-key")?;
/// assert_eq!(store.load()?.as_deref(), Some("my-key"));
/// # Ok(())
/// # }
/// ```
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    fn entry() -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE_NAME, API_KEY_NAME).map_err(|e| StargazerError::Keyring(e).into())
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StargazerError::Keyring(e).into()),
        }
    }

    fn save(&self, value: &str) -> Result<()> {
        Self::entry()?
            .set_password(value)
            .map_err(StargazerError::Keyring)?;
        tracing::debug!("Stored API key in keyring");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StargazerError::Keyring(e).into()),
        }
    }
}

/// In-process store, used in tests and when no keyring is available
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create a store pre-populated with `value`
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        self.value
            .lock()
            .map(|v| v.clone())
            .map_err(|_| StargazerError::Config("credential store lock poisoned".to_string()).into())
    }

    fn save(&self, value: &str) -> Result<()> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| StargazerError::Config("credential store lock poisoned".to_string()))?;
        *guard = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| StargazerError::Config("credential store lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Read the key at startup
///
/// Falls back to `GEMINI_API_KEY` when the store is empty. Store errors
/// are logged and treated as "no key" so the session can still start and
/// the user can enter one.
pub fn load_api_key(store: &dyn CredentialStore) -> String {
    match store.load() {
        Ok(Some(value)) if !value.is_empty() => return value,
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to read stored API key: {}", e),
    }
    std::env::var(API_KEY_ENV).unwrap_or_default()
}

/// Mask a key for display, keeping the last four characters
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
