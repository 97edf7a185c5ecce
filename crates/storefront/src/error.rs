//! Unified error handling with Sentry integration.
//!
//! Provides the storefront's error taxonomy:
//! - [`ConstructionError`] - a view's template lacks a required element (fatal at startup)
//! - [`HandlerError`] / [`PublishError`] - an event handler failed (isolated and logged)
//! - [`crate::api::ApiError`] - catalog fetch or order submission failed
//! - [`crate::config::ConfigError`] - environment configuration is missing or invalid
//!
//! Validation failures are not errors: they flow as [`larek_core::FormErrors`] data.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::events::Topic;

/// A view could not be built from its template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A required element is absent.
    #[error("required element `{selector}` not found")]
    MissingElement { selector: String },

    /// A template has no content to clone.
    #[error("template `{template}` is empty")]
    EmptyTemplate { template: String },
}

impl ConstructionError {
    pub(crate) fn missing(selector: &str) -> Self {
        Self::MissingElement {
            selector: selector.to_string(),
        }
    }
}

/// A single event handler failed.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A view built inside the handler could not be constructed.
    #[error("view construction failed: {0}")]
    Construction(#[from] ConstructionError),

    /// An event published by the handler had failing subscribers.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The storefront that registered the handler has been dropped.
    #[error("storefront has been dropped")]
    Detached,
}

/// One or more handlers failed while an event was published.
///
/// Every handler still ran; this lists the ones that failed.
#[derive(Debug, Error)]
#[error("{} handler(s) failed for `{topic}`", failures.len())]
pub struct PublishError {
    pub topic: Topic,
    pub failures: Vec<HandlerError>,
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A view could not be constructed.
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// Event handlers failed.
    #[error("Event error: {0}")]
    Publish(#[from] PublishError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Report an error to Sentry and return the event id as a string.
///
/// Without an initialised Sentry client this only generates an id.
pub fn capture(error: &(dyn std::error::Error + 'static)) -> String {
    sentry::capture_error(error).to_string()
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("basket", "Added item", Some(&[("product_id", "854cef69")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
