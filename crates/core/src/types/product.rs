//! Catalog product types.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Known category names and the card modifier class each one maps to.
///
/// Category names are backend data and arrive untranslated.
const CATEGORY_MODIFIERS: &[(&str, &str)] = &[
    ("софт-скил", "card__category_soft"),
    ("хард-скил", "card__category_hard"),
    ("другое", "card__category_other"),
    ("дополнительное", "card__category_additional"),
    ("кнопка", "card__category_button"),
];

/// A product category label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create a category from its display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The category display name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The card modifier class for this category, if it is a known one.
    #[must_use]
    pub fn modifier(&self) -> Option<&'static str> {
        CATEGORY_MODIFIERS
            .iter()
            .find(|(name, _)| *name == self.0)
            .map(|(_, class)| *class)
    }

    /// Every modifier class a category can map to.
    pub fn all_modifiers() -> impl Iterator<Item = &'static str> {
        CATEGORY_MODIFIERS.iter().map(|(_, class)| *class)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// An immutable catalog entry.
///
/// A product with `price: None` is "priceless": it is shown in the catalog
/// but cannot be added to the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub price: Option<Price>,
    /// Image URL. The backend sends a path relative to the CDN; the API
    /// client resolves it before the product reaches the catalog.
    pub image: String,
}

impl Product {
    /// Whether this product has no price.
    #[must_use]
    pub const fn is_priceless(&self) -> bool {
        self.price.is_none()
    }

    /// The price contribution of this product to an order total.
    ///
    /// Priceless products contribute zero.
    #[must_use]
    pub fn price_or_zero(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }
}
