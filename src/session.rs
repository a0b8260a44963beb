//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session is the single source of truth for the bearer token. The router
//! guard reads it before each navigation and the API client reads it before
//! each outbound request; only [`Session::login`] and [`Session::logout`]
//! change it.
//!
//! DESIGN
//! ======
//! Mutators hold the token lock across the storage write, so a concurrent
//! caller never observes memory and durable storage out of step. Storage is
//! written first: on failure the in-memory value is left untouched.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::storage::{StorageError, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token must not be empty")]
    EmptyToken,
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Shared authentication state, mirrored to a [`TokenStore`].
pub struct Session {
    token: Mutex<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Open a session, initializing the token from durable storage.
    ///
    /// A storage read failure is logged and treated as "no session".
    pub fn open(store: impl TokenStore + 'static) -> Self {
        let token = match store.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; starting logged out");
                None
            }
        };
        tracing::debug!(authenticated = token.is_some(), "session opened");
        Self { token: Mutex::new(token), store: Box::new(store) }
    }

    /// Current token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Set the token and persist it before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for an empty token, or
    /// [`SessionError::Storage`] if the durable write fails (memory unchanged).
    pub fn login(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let mut current = self.lock();
        self.store.save(token)?;
        *current = Some(token.to_owned());
        tracing::info!("session logged in");
        Ok(())
    }

    /// Clear the token and remove the persisted copy. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the durable removal fails (memory unchanged).
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut current = self.lock();
        self.store.clear()?;
        if current.take().is_some() {
            tracing::info!("session logged out");
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("authenticated", &self.is_authenticated()).finish_non_exhaustive()
    }
}
