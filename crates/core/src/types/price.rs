//! Type-safe price representation using decimal arithmetic.
//!
//! Both remote catalogs publish prices as JSON numbers, and the local cart
//! collections store them the same way, so a [`Price`] serializes as a plain
//! number. Deserialization is lenient and also accepts numeric strings.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The result does not fit in a decimal.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A non-negative monetary amount in the catalog's currency (USD).
///
/// ## Examples
///
/// ```
/// use eleegon_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1000, 2)).unwrap(); // 10.00
/// assert_eq!(price.times(3).to_string(), "30.00");
/// assert_eq!(price.discounted(Decimal::from(10)).to_string(), "9.00");
/// assert!(Price::new(Decimal::from(-1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price, clamping negative amounts to zero.
    #[must_use]
    pub fn saturating(amount: Decimal) -> Self {
        Self(amount.max(Decimal::ZERO))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage discount: `price - price * percent / 100`.
    ///
    /// A zero discount returns the price unchanged; discounts above 100%
    /// clamp to zero.
    #[must_use]
    pub fn discounted(&self, percent: Decimal) -> Self {
        if percent.is_zero() {
            return *self;
        }
        let off = (self.0 / Decimal::ONE_HUNDRED).saturating_mul(percent);
        Self::saturating(self.0.saturating_sub(off))
    }

    /// Multiply by a quantity, saturating at the largest representable amount.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Multiply by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn checked_times(&self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Add two prices.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the sum does not fit.
    pub fn checked_add(&self, rhs: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Sum prices, failing instead of saturating.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the running total does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(prices: I) -> Result<Self, PriceError> {
        prices
            .into_iter()
            .try_fold(Self::ZERO, |acc, price| acc.checked_add(price))
    }

    /// Divide by a quantity, returning zero for a zero quantity.
    #[must_use]
    pub fn per_unit(&self, quantity: u32) -> Self {
        if quantity == 0 {
            return Self::ZERO;
        }
        Self(self.0 / Decimal::from(quantity))
    }

    /// Round to cents, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Format for display with a dollar sign (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${self}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded().0)
    }
}

impl core::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| acc + price)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
