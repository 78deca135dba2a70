//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for command handlers. Failures worth
//! investigating are captured to Sentry by [`AppError::report`]; every
//! variant maps to a message that is safe to show the user.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::forms::ValidationErrors;
use crate::session::{GuardRejection, SessionError};
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog API request failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Login or logout failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Form input was rejected.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A protected command was used without logging in.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] GuardRejection),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true for failures of the service or the machine, as opposed
    /// to user mistakes.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Cart(CartError::Persistence(_))
            | Self::Session(SessionError::Store(_) | SessionError::Catalog(_))
            | Self::Store(_)
            | Self::Internal(_) => true,
            _ => false,
        }
    }

    /// Capture server errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::debug!(error = %self, "Command rejected");
        }
    }

    /// Message safe to show the user.
    ///
    /// Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::NotFound(what)) => format!("Not found: {what}"),
            Self::Catalog(CatalogError::Rejected(message)) => message.clone(),
            Self::Catalog(_) | Self::Session(SessionError::Catalog(_)) => {
                "The store is unreachable right now. Please try again.".to_string()
            }
            Self::Cart(CartError::InvalidQuantity(_)) => {
                "Quantity must be at least 1".to_string()
            }
            Self::Cart(CartError::Amount(_)) => "That quantity is too large".to_string(),
            Self::Cart(CartError::Persistence(_))
            | Self::Session(SessionError::Store(_))
            | Self::Store(_) => "Could not save your changes. Please try again.".to_string(),
            Self::Session(SessionError::MissingCredentials) => {
                "Please enter both email and password".to_string()
            }
            Self::Session(SessionError::InvalidEmail(_)) => "Invalid email address".to_string(),
            Self::Session(SessionError::InvalidCredentials) => {
                "Invalid email or password".to_string()
            }
            Self::Validation(errors) => errors.to_string(),
            Self::Config(err) => err.to_string(),
            Self::Unauthorized(_) => "Please log in first (eleegon login)".to_string(),
            Self::Internal(_) => "Internal error".to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
