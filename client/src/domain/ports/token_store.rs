//! Driven port for persisting the session token between runs.

use std::sync::Mutex;

use super::define_port_error;
use crate::domain::AccessToken;

define_port_error! {
    /// Errors raised by token store adapters.
    pub enum TokenStoreError {
        /// Underlying storage could not be read or written.
        Io {
            /// Adapter-supplied detail.
            message: String,
        } => "token store i/o failed: {message}",
        /// Stored bytes were not a usable token.
        Corrupt {
            /// Adapter-supplied detail.
            message: String,
        } => "token store holds an unusable token: {message}",
    }
}

/// Port for loading, saving and clearing the persisted bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any.
    fn load(&self) -> Result<Option<AccessToken>, TokenStoreError>;

    /// Replace the stored token.
    fn save(&self, token: &AccessToken) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    slot: Mutex<Option<AccessToken>>,
}

impl InMemoryTokenStore {
    /// Create a store pre-loaded with `token`.
    #[must_use]
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn poisoned() -> TokenStoreError {
        TokenStoreError::io("in-memory token slot poisoned")
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<AccessToken>, TokenStoreError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| Self::poisoned())
    }

    fn save(&self, token: &AccessToken) -> Result<(), TokenStoreError> {
        let mut slot = self.slot.lock().map_err(|_| Self::poisoned())?;
        *slot = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut slot = self.slot.lock().map_err(|_| Self::poisoned())?;
        *slot = None;
        Ok(())
    }
}
