//! Local shopping cart.
//!
//! One ordered collection of [`CartEntry`] values is persisted under a single
//! storage key. Each entry carries the [`CartSource`] it was added from, and
//! identity is the `(id, source)` pair since both catalogs number their
//! products independently.
//!
//! Carts written by older clients kept one collection per catalog under
//! separate keys; those are folded into the unified collection the first
//! time the cart is loaded.

mod store;

pub use store::CartStore;

use eleegon_core::{CartSource, Price, PriceError, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lenient;
use crate::store::StoreError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Reading or writing the cart collection failed.
    #[error("cart persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// Quantity outside the accepted range.
    #[error("invalid quantity: {0} (must be between 1 and {max})", max = u32::MAX)]
    InvalidQuantity(i64),

    /// A line or cart total is too large to represent.
    #[error("cart amount out of range: {0}")]
    Amount(#[from] PriceError),
}

/// A product line in the cart.
///
/// `total_price` is always `unit_price * quantity`; the fields are private so
/// the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    id: ProductId,
    source: CartSource,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    quantity: u32,
    unit_price: Price,
    total_price: Price,
}

impl CartEntry {
    /// Build an entry from an add-to-cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, or
    /// [`CartError::Amount`] if the line total overflows.
    pub fn from_line(line: NewCartLine) -> Result<Self, CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        let total_price = line.unit_price.checked_times(line.quantity)?;
        Ok(Self {
            id: line.id,
            source: line.source,
            title: line.title,
            image: line.image,
            category: line.category,
            brand: line.brand,
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price,
        })
    }

    /// Product ID within its source catalog.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    /// Catalog the entry came from.
    #[must_use]
    pub const fn source(&self) -> CartSource {
        self.source
    }

    /// Product title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Product image URL.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Product category.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Product brand.
    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Product description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of units.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price of one unit, after any discount.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total_price
    }

    /// Returns true if this entry is identified by `(id, source)`.
    #[must_use]
    pub fn is(&self, id: ProductId, source: CartSource) -> bool {
        self.id == id && self.source == source
    }

    /// Set the quantity and recompute the line total. On overflow the entry
    /// is left unchanged.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> Result<(), PriceError> {
        self.total_price = self.unit_price.checked_times(quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

/// Input to the "add to cart" action of a product detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    /// Product ID within its source catalog.
    pub id: ProductId,
    /// Catalog the product belongs to.
    pub source: CartSource,
    /// Product title.
    pub title: String,
    /// Product image URL.
    pub image: Option<String>,
    /// Product category.
    pub category: Option<String>,
    /// Product brand.
    pub brand: Option<String>,
    /// Product description.
    pub description: Option<String>,
    /// Discounted price of one unit.
    pub unit_price: Price,
    /// Units to add (must be at least 1).
    pub quantity: u32,
}

/// Cart badge data broadcast to subscribers after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Number of distinct entries.
    pub item_count: usize,
    /// Sum of line totals, rounded to cents.
    pub total: Price,
}

/// Result of [`CartStore::set_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// Quantity and line total were updated and persisted.
    Updated(CartEntry),
    /// The requested quantity was below 1. Nothing was written; the caller
    /// should ask the user to confirm and then call [`CartStore::remove`].
    RemovalRequested {
        /// Product ID.
        id: ProductId,
        /// Source catalog.
        source: CartSource,
    },
    /// No entry matches `(id, source)`.
    NotFound,
}

/// Stored shape of a cart entry, tolerant of what older clients wrote.
///
/// Legacy collections carry no `source` and may lack `unitPrice`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredEntry {
    id: ProductId,
    #[serde(default, deserialize_with = "lenient::or_default")]
    source: Option<CartSource>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    title: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    image: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    unit_price: Option<rust_decimal::Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    total_price: Option<rust_decimal::Decimal>,
}

impl StoredEntry {
    /// Normalize into a [`CartEntry`].
    ///
    /// A missing source falls back to `default_source`. Quantity is clamped to
    /// at least 1. Unit price falls back to `total_price / quantity`, then to
    /// zero, and the line total is always recomputed.
    ///
    /// Fails if the recomputed line total does not fit.
    pub(crate) fn into_entry(self, default_source: CartSource) -> Result<CartEntry, PriceError> {
        let quantity = self.quantity.unwrap_or(1).max(1);
        let unit_price = self.unit_price.map_or_else(
            || {
                self.total_price
                    .map(Price::saturating)
                    .map_or(Price::ZERO, |total| total.per_unit(quantity))
            },
            Price::saturating,
        );

        Ok(CartEntry {
            id: self.id,
            source: self.source.unwrap_or(default_source),
            title: self.title,
            image: self.image,
            category: self.category,
            brand: self.brand,
            description: self.description,
            quantity,
            unit_price,
            total_price: unit_price.checked_times(quantity)?,
        })
    }
}

/// Order entries for display: apparel first, then electronics, keeping the
/// insertion order within each source.
pub(crate) fn display_order(entries: &mut [CartEntry]) {
    entries.sort_by_key(CartEntry::source);
}

/// Sum of line totals, rounded to cents.
///
/// Saturates instead of overflowing; mutations reject carts whose total
/// would not fit (see [`checked_total`]).
#[must_use]
pub fn total_of(entries: &[CartEntry]) -> Price {
    entries.iter().map(CartEntry::total_price).sum::<Price>().rounded()
}

/// Sum of line totals.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the sum does not fit.
pub fn checked_total(entries: &[CartEntry]) -> Result<Price, PriceError> {
    Price::checked_sum(entries.iter().map(CartEntry::total_price))
}
