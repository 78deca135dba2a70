//! Cart source discriminant.
//!
//! The storefront sells from two independently run catalogs. Every cart entry
//! records which catalog it came from, because the same numeric product ID can
//! exist in both.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`CartSource`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid cart source: {0} (expected apparel or electronics)")]
pub struct ParseCartSourceError(String);

/// The catalog a cart entry originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartSource {
    /// Clothing and accessories catalog.
    #[serde(alias = "clothing")]
    Apparel,
    /// Electronics catalog.
    Electronics,
}

impl CartSource {
    /// All sources, in cart display order.
    pub const ALL: [Self; 2] = [Self::Apparel, Self::Electronics];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Apparel => "apparel",
            Self::Electronics => "electronics",
        }
    }
}

impl fmt::Display for CartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CartSource {
    type Err = ParseCartSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apparel" | "clothing" => Ok(Self::Apparel),
            "electronics" => Ok(Self::Electronics),
            other => Err(ParseCartSourceError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        for source in CartSource::ALL {
            assert_eq!(source.to_string().parse::<CartSource>().unwrap(), source);
        }
        assert_eq!("Clothing".parse::<CartSource>().unwrap(), CartSource::Apparel);
        assert!("groceries".parse::<CartSource>().is_err());
    }

    #[test]
    fn test_display_order() {
        assert!(CartSource::Apparel < CartSource::Electronics);
    }

    #[test]
    fn test_serde_accepts_legacy_name() {
        let source: CartSource = serde_json::from_str("\"clothing\"").unwrap();
        assert_eq!(source, CartSource::Apparel);
        assert_eq!(
            serde_json::to_string(&CartSource::Electronics).unwrap(),
            "\"electronics\""
        );
    }
}
