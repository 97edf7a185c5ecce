//! Larek Core - Shared domain types.
//!
//! This crate provides the types shared by every Larek component:
//! - `storefront` - Headless storefront UI core (state, event bus, views)
//! - `cli` - Command-line driver for storefront sessions
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation rules - no I/O, no
//! DOM, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, products and the checkout order record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
