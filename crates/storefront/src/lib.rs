//! Larek Storefront library.
//!
//! A headless storefront UI core: a product catalog, a shopping basket and a
//! two-step checkout, kept in sync through a typed event bus.
//!
//! # Architecture
//!
//! - [`events`] - publish/subscribe hub every component talks through
//! - [`model`] - application state; mutations publish change events
//! - [`view`] - DOM-backed views rendered from partial patches
//! - [`app`] - handlers wiring state to views, and the checkout flow
//! - [`api`] - backend client behind the [`api::ShopApi`] seam
//! - [`dom`] / [`templates`] - in-memory element tree and page templates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod model;
pub mod templates;
pub mod view;

pub use app::{CheckoutStep, Storefront};
pub use error::{AppError, Result};
