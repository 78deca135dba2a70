//! Admin listings.
//!
//! The catalog APIs are read-only for deletes and edits, so admin changes
//! apply to the fetched listing only and are lost on the next fetch.

use std::fmt::Display;

use eleegon_core::{Price, ProductId, UserId};
use rust_decimal::Decimal;
use tracing::info;

use crate::catalog::{ApparelProduct, ElectronicsProduct, User};
use crate::forms::ValidationErrors;

/// Records with a stable ID.
pub trait Identified {
    /// ID type.
    type Id: Copy + PartialEq + Display;

    /// This record's ID.
    fn id(&self) -> Self::Id;
}

impl Identified for ApparelProduct {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Identified for ElectronicsProduct {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Identified for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// A fetched list that admin actions edit in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    items: Vec<T>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> Listing<T> {
    /// Wrap a fetched list.
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Current items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item with `id`.
    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Drop the item with `id` from the listing. Returns it if it was present.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        info!(%id, "Removed from listing");
        Some(self.items.remove(index))
    }

    /// Apply `edit` to the item with `id`.
    ///
    /// # Errors
    ///
    /// Returns `Ok(false)` if no item has `id`, or whatever `edit` rejects.
    pub fn update<E>(
        &mut self,
        id: T::Id,
        edit: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Result<bool, E> {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return Ok(false);
        };
        edit(item)?;
        info!(%id, "Updated listing item");
        Ok(true)
    }
}

/// Edit form for an electronics product.
///
/// Price and discount are typed text; values that do not parse keep the
/// product's current value. A blank category keeps the current category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductEdit {
    pub title: String,
    pub brand: String,
    pub price: String,
    pub discount: String,
    pub category: String,
}

impl ProductEdit {
    /// Prefill from an existing product.
    #[must_use]
    pub fn from_product(product: &ElectronicsProduct) -> Self {
        Self {
            title: product.title.clone(),
            brand: product.brand.clone(),
            price: product.price.amount().to_string(),
            discount: product.discount.map(|d| d.to_string()).unwrap_or_default(),
            category: product.category.clone(),
        }
    }

    /// Write the edited values into `product`.
    ///
    /// # Errors
    ///
    /// Returns field errors if title or price is blank; `product` is left
    /// untouched in that case.
    pub fn apply(&self, product: &mut ElectronicsProduct) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.price.trim().is_empty() {
            errors.add("price", "Price is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        self.title.trim().clone_into(&mut product.title);
        self.brand.trim().clone_into(&mut product.brand);
        if let Ok(price) = self.price.trim().parse::<Decimal>() {
            product.price = Price::saturating(price);
        }
        if let Ok(discount) = self.discount.trim().parse::<Decimal>() {
            product.discount = Some(discount);
        }
        if !self.category.trim().is_empty() {
            self.category.trim().clone_into(&mut product.category);
        }
        Ok(())
    }
}
