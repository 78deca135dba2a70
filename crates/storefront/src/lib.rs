//! Eleegon storefront library.
//!
//! Browsing for two public catalogs (apparel and electronics), a local cart
//! that aggregates both, and a login marker guarding the protected views.
//! The command-line front end lives in `eleegon-cli`; everything it shows
//! or changes goes through this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod lenient;
pub mod loaded;
pub mod session;
pub mod state;
pub mod store;
