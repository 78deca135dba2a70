//! Login state and the access guard.
//!
//! A logged-in user is represented by a small marker `{id, email}` stored
//! under [`keys::SESSION`](crate::store::keys::SESSION). Its presence is the
//! only thing that makes a user authenticated: there is no token, no expiry
//! and no server-side session.

mod guard;

pub use guard::{AccessGuard, GuardRejection, GuardState};

use std::sync::Arc;

use eleegon_core::{Email, EmailError, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::catalog::{CatalogClient, CatalogError, User};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::store::{KeyValueStore, StoreError, keys, load_json, save_json};

/// Errors that can occur during login and logout.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session marker failed.
    #[error("session storage failed: {0}")]
    Store(#[from] StoreError),

    /// Fetching users failed.
    #[error("user lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// Email or password left blank.
    #[error("email and password are required")]
    MissingCredentials,

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No user with this email and password.
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Stored identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    /// User ID in the electronics API.
    pub id: UserId,
    /// Email used to log in.
    pub email: Email,
}

/// Result of [`SessionStore::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; the marker was stored.
    LoggedIn(SessionMarker),
    /// A marker already existed, so no lookup was made.
    AlreadyLoggedIn(SessionMarker),
}

impl LoginOutcome {
    /// The marker now in effect.
    #[must_use]
    pub const fn marker(&self) -> &SessionMarker {
        match self {
            Self::LoggedIn(m) | Self::AlreadyLoggedIn(m) => m,
        }
    }
}

/// Reads and writes the session marker.
pub struct SessionStore<S> {
    store: Arc<S>,
}

impl<S> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create a session store over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The stored marker, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store cannot be read or the
    /// marker is undecodable.
    pub async fn current(&self) -> Result<Option<SessionMarker>, SessionError> {
        Ok(load_json(&*self.store, keys::SESSION).await?)
    }

    /// Log in by matching email and password against the user list.
    ///
    /// If a marker already exists the lookup is skipped and
    /// [`LoginOutcome::AlreadyLoggedIn`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredentials`] for blank input,
    /// [`SessionError::InvalidCredentials`] if no user matches, or the
    /// underlying catalog/storage error.
    #[instrument(skip(self, client, password))]
    pub async fn login(
        &self,
        client: &CatalogClient,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, SessionError> {
        if let Ok(Some(existing)) = self.current().await {
            info!(user_id = %existing.id, "Already logged in");
            return Ok(LoginOutcome::AlreadyLoggedIn(existing));
        }

        let email = validate_credentials(email, password)?;
        let users = client.users().await?;
        let marker = authenticate(&users, &email, password).ok_or_else(|| {
            warn!("Login failed");
            SessionError::InvalidCredentials
        })?;

        save_json(&*self.store, keys::SESSION, &marker).await?;
        set_sentry_user(&marker.id, Some(marker.email.as_str()));
        info!(user_id = %marker.id, "Logged in");
        Ok(LoginOutcome::LoggedIn(marker))
    }

    /// Clear the marker. Logging out while logged out succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the marker cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(keys::SESSION).await?;
        clear_sentry_user();
        info!("Logged out");
        Ok(())
    }
}

/// Check that both credentials are present and the email is well-formed.
fn validate_credentials(email: &str, password: &SecretString) -> Result<Email, SessionError> {
    if email.trim().is_empty() || password.expose_secret().is_empty() {
        return Err(SessionError::MissingCredentials);
    }
    Ok(Email::parse(email)?)
}

/// Find the user whose email and password match.
///
/// Both compare exactly. The marker carries the email as the user record
/// holds it.
#[must_use]
pub fn authenticate(users: &[User], email: &Email, password: &SecretString) -> Option<SessionMarker> {
    users
        .iter()
        .find(|user| email.matches(&user.email) && user.password_matches(password))
        .map(|user| SessionMarker {
            id: user.id,
            email: Email::parse(&user.email).unwrap_or_else(|_| email.clone()),
        })
}
