//! Core types for Larek.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod order;
pub mod price;
pub mod product;

pub use id::*;
pub use order::{
    ContactsInput, FormErrors, Order, OrderField, OrderInput, OrderRequest, OrderResult,
    PaymentMethod, PaymentMethodError,
};
pub use price::Price;
pub use product::{Category, Product};
