//! Product cards.
//!
//! One [`Card`] type covers the catalog tile, the preview and the basket row.
//! Which parts a card has is decided by its template; [`CardKind`] decides
//! which of those parts are required.

use std::cell::RefCell;
use std::rc::Rc;

use larek_core::{Category, Price, ProductId};

use super::{Action, View, set_disabled, set_image, set_text};
use crate::dom::{DomEvent, Element};
use crate::error::ConstructionError;
use crate::templates::clone_template;

const TITLE: &str = ".card__title";
const PRICE: &str = ".card__price";
const CATEGORY: &str = ".card__category";
const IMAGE: &str = ".card__image";
const DESCRIPTION: &str = ".card__text";
const INDEX: &str = ".basket__item-index";
const BUTTON: &str = ".card__button";

/// Card variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// Gallery tile: category, image. Clicking anywhere selects it.
    Catalog,
    /// Modal detail view: category, image, description and an action button.
    Preview,
    /// Basket row: position index and a remove button.
    Basket,
}

impl CardKind {
    /// Markers that must be present for this kind, beyond title and price.
    const fn required(self) -> &'static [&'static str] {
        match self {
            Self::Catalog => &[CATEGORY, IMAGE],
            Self::Preview => &[CATEGORY, IMAGE, DESCRIPTION, BUTTON],
            Self::Basket => &[INDEX],
        }
    }
}

/// Partial card state.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub id: Option<ProductId>,
    pub title: Option<String>,
    /// `Some(None)` shows the product as priceless.
    pub price: Option<Option<Price>>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub description: Option<String>,
    /// 1-based position in the basket.
    pub index: Option<usize>,
    /// Whether the action button is enabled.
    pub valid: Option<bool>,
}

/// A product card.
pub struct Card {
    container: Element,
    title: Element,
    price: Element,
    category: Option<Element>,
    image: Option<Element>,
    description: Option<Element>,
    index: Option<Element>,
    button: Option<Element>,
    action: Rc<RefCell<Option<Action>>>,
}

impl Card {
    /// Wrap an instantiated card template.
    ///
    /// The action fires on the card's button if it has one, otherwise on the
    /// whole card.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if the title, the price or
    /// a part required by `kind` is absent.
    pub fn new(
        container: Element,
        kind: CardKind,
        action: Option<Action>,
    ) -> Result<Self, ConstructionError> {
        for selector in kind.required() {
            container.ensure(selector)?;
        }

        let card = Self {
            title: container.ensure(TITLE)?,
            price: container.ensure(PRICE)?,
            category: container.query(CATEGORY),
            image: container.query(IMAGE),
            description: container.query(DESCRIPTION),
            index: container.query(INDEX),
            button: container.query(BUTTON),
            action: Rc::new(RefCell::new(action)),
            container,
        };

        let trigger = card.button.as_ref().unwrap_or(&card.container);
        let action = Rc::clone(&card.action);
        trigger.on(DomEvent::Click, move |_| {
            let current = action.borrow().clone();
            if let Some(current) = current {
                current();
            }
        });

        Ok(card)
    }

    /// Instantiate `template` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns a `ConstructionError` if the template is empty or lacks a
    /// required part.
    pub fn from_template(
        template: &Element,
        kind: CardKind,
        action: Option<Action>,
    ) -> Result<Self, ConstructionError> {
        Self::new(clone_template(template)?, kind, action)
    }

    /// Relabel the action button and replace what it does.
    pub fn set_action(&self, label: &str, action: Action) {
        set_text(self.button.as_ref(), label);
        *self.action.borrow_mut() = Some(action);
    }

    /// The product id stored on the card.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.container.attr("data-id")
    }

    /// The action button, if the card has one.
    #[must_use]
    pub const fn button(&self) -> Option<&Element> {
        self.button.as_ref()
    }

    fn set_category(&self, category: &Category) {
        let Some(element) = &self.category else {
            return;
        };
        element.set_text(category.as_str());
        if let Some(modifier) = category.modifier() {
            for class in Category::all_modifiers() {
                element.toggle_class(class, class == modifier);
            }
        }
    }
}

impl View for Card {
    type Patch = CardPatch;

    fn container(&self) -> &Element {
        &self.container
    }

    fn apply(&self, patch: CardPatch) {
        if let Some(id) = patch.id {
            self.container.set_attr("data-id", id.as_str());
        }
        if let Some(title) = patch.title {
            self.title.set_text(&title);
        }
        if let Some(price) = patch.price {
            self.price.set_text(&Price::label(price));
        }
        if let Some(category) = patch.category {
            self.set_category(&category);
        }
        if let (Some(src), Some(image)) = (patch.image, &self.image) {
            set_image(image, &src, Some(&self.title.text()));
        }
        if let Some(description) = patch.description {
            set_text(self.description.as_ref(), description);
        }
        if let Some(index) = patch.index {
            set_text(self.index.as_ref(), index);
        }
        if let Some(valid) = patch.valid {
            set_disabled(self.button.as_ref(), !valid);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::templates::{Templates, standard_document};

    fn templates() -> Templates {
        Templates::from_document(&standard_document()).unwrap()
    }

    fn counting_action() -> (Rc<Cell<usize>>, Action) {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        (hits, Rc::new(move || counter.set(counter.get() + 1)))
    }

    #[test]
    fn test_catalog_card_renders_fields() {
        let card = Card::from_template(&templates().card_catalog, CardKind::Catalog, None).unwrap();
        let root = card.render(CardPatch {
            id: Some("a".into()),
            title: Some("+1 hour a day".to_string()),
            price: Some(Some(Price::from_units(750))),
            category: Some(Category::new("хард-скил")),
            image: Some("https://cdn.example/5_Dots.svg".to_string()),
            ..CardPatch::default()
        });

        assert_eq!(card.id().as_deref(), Some("a"));
        assert_eq!(root.query(".card__title").unwrap().text(), "+1 hour a day");
        assert_eq!(root.query(".card__price").unwrap().text(), "750 synapses");
        let image = root.query(".card__image").unwrap();
        assert_eq!(image.attr("src").as_deref(), Some("https://cdn.example/5_Dots.svg"));
        assert_eq!(image.attr("alt").as_deref(), Some("+1 hour a day"));
    }

    #[test]
    fn test_category_swaps_modifier_class() {
        let card = Card::from_template(&templates().card_catalog, CardKind::Catalog, None).unwrap();
        let category = card.container().query(".card__category").unwrap();
        assert!(category.has_class("card__category_soft"));

        card.apply(CardPatch {
            category: Some(Category::new("хард-скил")),
            ..CardPatch::default()
        });
        assert!(category.has_class("card__category_hard"));
        assert!(!category.has_class("card__category_soft"));
        assert!(category.has_class("card__category"));
    }

    #[test]
    fn test_unknown_category_keeps_classes() {
        let card = Card::from_template(&templates().card_catalog, CardKind::Catalog, None).unwrap();
        card.apply(CardPatch {
            category: Some(Category::new("misc")),
            ..CardPatch::default()
        });
        let category = card.container().query(".card__category").unwrap();
        assert_eq!(category.text(), "misc");
        assert!(category.has_class("card__category_soft"));
    }

    #[test]
    fn test_priceless_label() {
        let card = Card::from_template(&templates().card_basket, CardKind::Basket, None).unwrap();
        let root = card.render(CardPatch {
            price: Some(None),
            index: Some(3),
            ..CardPatch::default()
        });
        assert_eq!(root.query(".card__price").unwrap().text(), "Priceless");
        assert_eq!(root.query(".basket__item-index").unwrap().text(), "3");
    }

    #[test]
    fn test_render_only_touches_given_fields() {
        let card = Card::from_template(&templates().card_basket, CardKind::Basket, None).unwrap();
        card.apply(CardPatch {
            title: Some("Kept".to_string()),
            ..CardPatch::default()
        });
        card.apply(CardPatch {
            index: Some(1),
            ..CardPatch::default()
        });
        assert_eq!(card.container().query(".card__title").unwrap().text(), "Kept");
    }

    #[test]
    fn test_catalog_click_targets_whole_card() {
        let (hits, action) = counting_action();
        let templates = templates();
        let card = Card::from_template(&templates.card_catalog, CardKind::Catalog, Some(action))
            .unwrap();
        card.container().click();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_set_action_replaces_previous() {
        let (first_hits, first) = counting_action();
        let (second_hits, second) = counting_action();
        let card =
            Card::from_template(&templates().card_preview, CardKind::Preview, Some(first)).unwrap();

        card.set_action("Remove from basket", second);
        let button = card.button().unwrap();
        assert_eq!(button.text(), "Remove from basket");
        button.click();
        assert_eq!(first_hits.get(), 0);
        assert_eq!(second_hits.get(), 1);
    }

    #[test]
    fn test_invalid_preview_disables_button() {
        let (hits, action) = counting_action();
        let templates = templates();
        let card = Card::from_template(&templates.card_preview, CardKind::Preview, Some(action))
            .unwrap();
        card.apply(CardPatch {
            valid: Some(false),
            ..CardPatch::default()
        });
        card.button().unwrap().click();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_preview_requires_button() {
        let container = Element::new("div")
            .with_child(Element::new("h2").with_class("card__title"))
            .with_child(Element::new("span").with_class("card__price"))
            .with_child(Element::new("span").with_class("card__category"))
            .with_child(Element::new("img").with_class("card__image"))
            .with_child(Element::new("p").with_class("card__text"));
        let err = Card::new(container, CardKind::Preview, None).err().unwrap();
        assert_eq!(err, ConstructionError::missing(".card__button"));
    }

    #[test]
    fn test_basket_row_tolerates_missing_button() {
        let container = Element::new("li")
            .with_child(Element::new("span").with_class("basket__item-index"))
            .with_child(Element::new("span").with_class("card__title"))
            .with_child(Element::new("span").with_class("card__price"));
        let card = Card::new(container, CardKind::Basket, None).unwrap();
        assert!(card.button().is_none());
    }
}
