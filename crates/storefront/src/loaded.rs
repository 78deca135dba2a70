//! Data that may have come from a fallback instead of the network.

use std::fmt::Display;

/// Result of a fetch where the caller chose what to show on failure.
///
/// Keeps "the API was unreachable" distinguishable from "the API returned
/// nothing", while still giving views something to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    /// Fetched successfully.
    Fresh(T),
    /// Fetch failed; `data` is the caller's fallback.
    Fallback {
        /// Data to show instead.
        data: T,
        /// Why the fetch failed, for a notice.
        error: String,
    },
}

impl<T> Loaded<T> {
    /// Use `fallback` if `result` is an error.
    pub fn or_fallback<E: Display>(result: Result<T, E>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(data) => Self::Fresh(data),
            Err(e) => {
                tracing::warn!(error = %e, "Fetch failed, showing fallback data");
                Self::Fallback {
                    data: fallback(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// The data, fresh or not.
    #[must_use]
    pub const fn data(&self) -> &T {
        match self {
            Self::Fresh(data) | Self::Fallback { data, .. } => data,
        }
    }

    /// Take the data, fresh or not.
    #[must_use]
    pub fn into_data(self) -> T {
        match self {
            Self::Fresh(data) | Self::Fallback { data, .. } => data,
        }
    }

    /// The failure message, if the fallback was used.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Fresh(_) => None,
            Self::Fallback { error, .. } => Some(error),
        }
    }

    /// Returns true if the data came from the network.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

impl<T: Default> Loaded<T> {
    /// Use `T::default()` (usually empty) if `result` is an error.
    pub fn or_default<E: Display>(result: Result<T, E>) -> Self {
        Self::or_fallback(result, T::default)
    }
}
