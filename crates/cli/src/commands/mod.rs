//! CLI subcommands.

pub mod catalog;
pub mod checkout;
pub mod render;

use larek_storefront::api::LarekClient;
use larek_storefront::{AppError, Storefront};
use larek_storefront::config::StorefrontConfig;
use larek_storefront::templates::standard_document;
use thiserror::Error;

/// Failures a session can end in.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("{0}")]
    CatalogUnavailable(String),
    #[error("product `{0}` is not in the catalog")]
    UnknownProduct(String),
    #[error("product `{0}` has no price and cannot be ordered")]
    Priceless(String),
    #[error("checkout stopped: {0}")]
    Checkout(String),
}

/// Start a storefront on the stock document and wait for the catalog.
///
/// # Errors
///
/// Returns an error if the client or the views cannot be built, or if the
/// catalog fails to load.
pub async fn session(config: &StorefrontConfig) -> Result<Storefront<LarekClient>, CommandError> {
    let client = LarekClient::new(config).map_err(AppError::from)?;
    let store = Storefront::new(standard_document(), client).map_err(AppError::from)?;
    store.start();
    store.settle().await;

    if let Some(notice) = store.page().notice() {
        return Err(CommandError::CatalogUnavailable(notice));
    }
    Ok(store)
}
