//! Core types for Eleegon.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod source;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use source::{CartSource, ParseCartSourceError};
