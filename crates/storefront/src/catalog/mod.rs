//! Remote catalog and user service.
//!
//! Two public REST APIs back the storefront:
//!
//! - the apparel catalog, which returns bare JSON arrays and objects
//! - the electronics catalog, which also serves users and wraps every
//!   response in a `{status, message?, ...}` envelope
//!
//! Neither requires authentication. Responses are decoded leniently (see
//! [`types`]) and failures surface as [`CatalogError`] without retries.

pub mod browse;
mod client;
pub mod types;

pub use browse::{
    ALL_CATEGORIES, Greeting, Pager, Today, apparel_categories, filter_apparel, filter_electronics,
    search_users,
};
pub use client::CatalogClient;
pub use types::{
    Address, ApparelProduct, ElectronicsProduct, Geolocation, NewProduct, ProductPage, Rating,
    RegistrationRequest, Submitted, User, UserName,
};

use thiserror::Error;

/// Errors that can occur when talking to the catalog APIs.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// API answered with `status: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Configured base URL cannot be extended into an endpoint.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
