//! Access guard for protected views.
//!
//! A guard starts in [`GuardState::Checking`], resolves once per activation
//! by reading the session marker, and is re-evaluated on every entry.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut guard = AccessGuard::new(state.session());
//! let marker = guard.require().await?; // Err(RedirectToLogin) when logged out
//! show_cart(&marker).await;
//! ```

use thiserror::Error;
use tracing::{debug, warn};

use super::{SessionMarker, SessionStore};
use crate::store::KeyValueStore;

/// Where the guard is in its check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Marker not read yet; render nothing.
    #[default]
    Checking,
    /// A marker is stored.
    Authenticated(SessionMarker),
    /// No usable marker; redirect to login.
    Unauthenticated,
}

/// Returned when a protected view is entered without a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardRejection {
    /// Send the user to the login view.
    #[error("login required")]
    RedirectToLogin,
}

/// Gatekeeper in front of views that require a login.
pub struct AccessGuard<S> {
    session: SessionStore<S>,
    state: GuardState,
}

impl<S: KeyValueStore> AccessGuard<S> {
    /// Create a guard in the [`GuardState::Checking`] state.
    #[must_use]
    pub fn new(session: SessionStore<S>) -> Self {
        Self {
            session,
            state: GuardState::Checking,
        }
    }

    /// Current state without re-reading the marker.
    #[must_use]
    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    /// Read the marker and resolve the state.
    ///
    /// Read failures and undecodable markers resolve to
    /// [`GuardState::Unauthenticated`].
    pub async fn evaluate(&mut self) -> &GuardState {
        self.state = match self.session.current().await {
            Ok(Some(marker)) => GuardState::Authenticated(marker),
            Ok(None) => GuardState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Session marker unreadable, treating as logged out");
                GuardState::Unauthenticated
            }
        };
        debug!(state = ?self.state, "Access guard resolved");
        &self.state
    }

    /// Enter the protected view.
    ///
    /// Always re-evaluates, so a logout since the last entry is seen.
    ///
    /// # Errors
    ///
    /// Returns [`GuardRejection::RedirectToLogin`] when not logged in.
    pub async fn require(&mut self) -> Result<SessionMarker, GuardRejection> {
        self.reset();
        match self.evaluate().await {
            GuardState::Authenticated(marker) => Ok(marker.clone()),
            GuardState::Checking | GuardState::Unauthenticated => {
                Err(GuardRejection::RedirectToLogin)
            }
        }
    }

    /// Leave the protected view; the next entry checks again.
    pub fn reset(&mut self) {
        self.state = GuardState::Checking;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use eleegon_core::{Email, UserId};

    use super::*;
    use crate::store::{MemoryStore, keys, save_json};

    fn marker() -> SessionMarker {
        SessionMarker {
            id: UserId::new(1),
            email: Email::parse("john@gmail.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_starts_checking() {
        let guard = AccessGuard::new(SessionStore::new(Arc::new(MemoryStore::new())));
        assert_eq!(guard.state(), &GuardState::Checking);
    }

    #[tokio::test]
    async fn test_without_marker_redirects() {
        let mut guard = AccessGuard::new(SessionStore::new(Arc::new(MemoryStore::new())));
        assert_eq!(guard.require().await, Err(GuardRejection::RedirectToLogin));
        assert_eq!(guard.state(), &GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_with_marker_admits() {
        let store = Arc::new(MemoryStore::new());
        save_json(&*store, keys::SESSION, &marker()).await.unwrap();

        let mut guard = AccessGuard::new(SessionStore::new(store));
        assert_eq!(guard.require().await.unwrap(), marker());
        assert_eq!(guard.state(), &GuardState::Authenticated(marker()));
    }

    #[tokio::test]
    async fn test_corrupt_marker_redirects() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::SESSION, "not json".to_string()).await.unwrap();

        let mut guard = AccessGuard::new(SessionStore::new(store));
        assert_eq!(guard.evaluate().await, &GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_reentry_sees_logout() {
        let store = Arc::new(MemoryStore::new());
        save_json(&*store, keys::SESSION, &marker()).await.unwrap();
        let session = SessionStore::new(Arc::clone(&store));

        let mut guard = AccessGuard::new(session.clone());
        assert!(guard.require().await.is_ok());

        session.logout().await.unwrap();
        assert_eq!(guard.require().await, Err(GuardRejection::RedirectToLogin));
    }
}
