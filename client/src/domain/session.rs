//! Session context shared by every authenticated service.
//!
//! The bearer token lives in memory behind a read/write lock and is mirrored
//! to a [`TokenStore`] so a later run can pick it up again. Login and logout
//! are the only writers.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use super::Error;
use super::ports::{TokenStore, TokenStoreError};
use crate::domain::AccessToken;

/// Message used when an authenticated call is attempted without a token.
pub const NOT_LOGGED_IN: &str = "not logged in";

fn store_error(err: &TokenStoreError) -> Error {
    Error::internal(format!("token store failed: {err}"))
}

/// Current login state.
pub struct Session {
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<AccessToken>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a logged-out session backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            token: RwLock::new(None),
        }
    }

    /// Start a session from whatever token `store` already holds.
    ///
    /// An unreadable store yields a logged-out session rather than an error.
    #[must_use]
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable stored token");
                None
            }
        };
        debug!(authenticated = token.is_some(), "session restored");
        Self {
            store,
            token: RwLock::new(token),
        }
    }

    /// Persist `token` and use it for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::internal`] when the token store cannot be written;
    /// the in-memory token is left unchanged in that case.
    pub fn set_token(&self, token: AccessToken) -> Result<(), Error> {
        self.store.save(&token).map_err(|err| store_error(&err))?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    /// Forget the token in memory and in the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::internal`] when the store cannot be cleared. The
    /// in-memory token is removed regardless.
    pub fn clear_token(&self) -> Result<(), Error> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear().map_err(|err| store_error(&err))
    }

    /// Current token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current token or an [`ErrorCode::Unauthenticated`](super::ErrorCode::Unauthenticated) error.
    ///
    /// # Errors
    ///
    /// Fails when no token is present.
    pub fn require_token(&self) -> Result<AccessToken, Error> {
        self.token()
            .ok_or_else(|| Error::unauthenticated(NOT_LOGGED_IN))
    }
}
