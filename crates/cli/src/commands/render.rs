//! Dump the rendered page.

use larek_storefront::config::StorefrontConfig;

/// Print the document markup once the catalog has rendered.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn page(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::session(config).await?;
    println!("{}", store.document().to_html());
    Ok(())
}
