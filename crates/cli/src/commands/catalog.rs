//! List the catalog.

use larek_core::Price;
use larek_storefront::config::StorefrontConfig;
use tracing::info;

/// Print one line per product: id, category, price and title.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn list(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::session(config).await?;
    let catalog = store.state().catalog();

    info!(count = catalog.len(), "Listing catalog");
    for product in &catalog {
        println!(
            "{}  {:<16} {:>18}  {}",
            product.id,
            product.category.as_str(),
            Price::label(product.price),
            product.title
        );
    }
    Ok(())
}
