//! Page markup and view templates.
//!
//! Views are instantiated from `<template>` elements found in the document by
//! id. [`standard_document`] builds the stock page so a storefront can run
//! without a browser.

use crate::dom::Element;
use crate::error::ConstructionError;

/// The view templates a storefront needs, looked up once at startup.
#[derive(Debug, Clone)]
pub struct Templates {
    pub success: Element,
    pub card_catalog: Element,
    pub card_preview: Element,
    pub card_basket: Element,
    pub basket: Element,
    pub order: Element,
    pub contacts: Element,
}

impl Templates {
    /// Find every template in `document`.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` naming the first template
    /// that is absent.
    pub fn from_document(document: &Element) -> Result<Self, ConstructionError> {
        Ok(Self {
            success: document.ensure("#success")?,
            card_catalog: document.ensure("#card-catalog")?,
            card_preview: document.ensure("#card-preview")?,
            card_basket: document.ensure("#card-basket")?,
            basket: document.ensure("#basket")?,
            order: document.ensure("#order")?,
            contacts: document.ensure("#contacts")?,
        })
    }
}

/// Instantiate a template: a detached copy of its first child.
///
/// # Errors
///
/// Returns `ConstructionError::EmptyTemplate` if the template has no content.
pub fn clone_template(template: &Element) -> Result<Element, ConstructionError> {
    template
        .children()
        .first()
        .map(Element::deep_clone)
        .ok_or_else(|| ConstructionError::EmptyTemplate {
            template: template.attr("id").unwrap_or_default(),
        })
}

fn template(id: &str, content: Element) -> Element {
    Element::new("template")
        .with_attr("id", id)
        .with_child(content)
}

fn el(tag: &str, class: &str) -> Element {
    let element = Element::new(tag);
    for class in class.split_whitespace() {
        element.add_class(class);
    }
    element
}

/// Build the stock storefront document: page chrome, modal container and
/// all view templates.
#[must_use]
pub fn standard_document() -> Element {
    Element::new("body")
        .with_child(page())
        .with_child(template("success", success()))
        .with_child(template("card-catalog", card_catalog()))
        .with_child(template("card-preview", card_preview()))
        .with_child(template("card-basket", card_basket()))
        .with_child(template("basket", basket()))
        .with_child(template("order", order_form()))
        .with_child(template("contacts", contacts_form()))
}

fn page() -> Element {
    el("div", "page")
        .with_child(
            el("div", "page__wrapper")
                .with_child(
                    el("header", "header").with_child(
                        el("div", "header__container")
                            .with_child(
                                el("a", "header__logo").with_child(
                                    el("img", "header__logo-image")
                                        .with_attr("src", "./images/logo.svg")
                                        .with_attr("alt", "Larek logo"),
                                ),
                            )
                            .with_child(
                                el("button", "header__basket").with_child(
                                    el("span", "header__basket-counter").with_text("0"),
                                ),
                            ),
                    ),
                )
                .with_child(el("main", "gallery"))
                .with_child(
                    el("div", "page__notice")
                        .with_attr("hidden", "")
                        .with_child(el("p", "page__notice-text"))
                        .with_child(el("button", "button page__retry").with_text("Try again")),
                ),
        )
        .with_child(
            el("div", "modal")
                .with_attr("id", "modal-container")
                .with_child(
                    el("div", "modal__container")
                        .with_child(el("button", "modal__close").with_attr("aria-label", "close"))
                        .with_child(el("div", "modal__content")),
                ),
        )
}

fn success() -> Element {
    el("div", "order-success")
        .with_child(el("h2", "order-success__title").with_text("Order placed"))
        .with_child(el("p", "order-success__description").with_text("Charged 0 synapses"))
        .with_child(el("button", "button order-success__close").with_text("Keep shopping!"))
}

fn card_catalog() -> Element {
    el("button", "gallery__item card")
        .with_child(el("span", "card__category card__category_soft"))
        .with_child(el("h2", "card__title"))
        .with_child(el("img", "card__image").with_attr("alt", ""))
        .with_child(el("span", "card__price"))
}

fn card_preview() -> Element {
    el("div", "card card_full")
        .with_child(el("img", "card__image").with_attr("alt", ""))
        .with_child(
            el("div", "card__column")
                .with_child(el("span", "card__category card__category_other"))
                .with_child(el("h2", "card__title"))
                .with_child(el("p", "card__text"))
                .with_child(
                    el("div", "card__row")
                        .with_child(el("button", "button card__button").with_text("Add to basket"))
                        .with_child(el("span", "card__price")),
                ),
        )
}

fn card_basket() -> Element {
    el("li", "basket__item card card_compact")
        .with_child(el("span", "basket__item-index"))
        .with_child(el("span", "card__title"))
        .with_child(el("span", "card__price"))
        .with_child(
            el("button", "basket__item-delete card__button").with_attr("aria-label", "remove"),
        )
}

fn basket() -> Element {
    el("div", "basket")
        .with_child(el("h2", "modal__title").with_text("Basket"))
        .with_child(el("ul", "basket__list"))
        .with_child(
            el("div", "modal__actions")
                .with_child(el("button", "button basket__button").with_text("Checkout"))
                .with_child(el("span", "basket__price").with_text("0 synapses")),
        )
}

fn order_form() -> Element {
    el("form", "form")
        .with_attr("name", "order")
        .with_child(
            el("div", "order")
                .with_child(
                    el("div", "order__field")
                        .with_child(el("h2", "modal__title").with_text("Payment method"))
                        .with_child(
                            el("div", "order__buttons")
                                .with_child(
                                    el("button", "button button_alt")
                                        .with_attr("name", "card")
                                        .with_attr("type", "button")
                                        .with_text("Online"),
                                )
                                .with_child(
                                    el("button", "button button_alt")
                                        .with_attr("name", "cash")
                                        .with_attr("type", "button")
                                        .with_text("On delivery"),
                                ),
                        ),
                )
                .with_child(
                    el("label", "order__field")
                        .with_child(
                            el("span", "form__label modal__title").with_text("Delivery address"),
                        )
                        .with_child(
                            el("input", "form__input")
                                .with_attr("name", "address")
                                .with_attr("type", "text")
                                .with_attr("placeholder", "Enter an address"),
                        ),
                ),
        )
        .with_child(form_actions("Next", "button order__button"))
}

fn contacts_form() -> Element {
    el("form", "form")
        .with_attr("name", "contacts")
        .with_child(
            el("div", "order")
                .with_child(
                    el("label", "order__field")
                        .with_child(el("span", "form__label modal__title").with_text("Email"))
                        .with_child(
                            el("input", "form__input")
                                .with_attr("name", "email")
                                .with_attr("type", "text")
                                .with_attr("placeholder", "Enter an email"),
                        ),
                )
                .with_child(
                    el("label", "order__field")
                        .with_child(el("span", "form__label modal__title").with_text("Phone"))
                        .with_child(
                            el("input", "form__input")
                                .with_attr("name", "phone")
                                .with_attr("type", "text")
                                .with_attr("placeholder", "+7 ("),
                        ),
                ),
        )
        .with_child(form_actions("Pay", "button"))
}

fn form_actions(label: &str, button_class: &str) -> Element {
    el("div", "modal__actions")
        .with_child(
            el("button", button_class)
                .with_attr("type", "submit")
                .with_text(label)
                .disabled(),
        )
        .with_child(el("span", "form__errors"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_document_has_every_template() {
        let document = standard_document();
        assert!(Templates::from_document(&document).is_ok());
    }

    #[test]
    fn test_missing_template_is_reported() {
        let document = Element::new("body").with_child(template("success", success()));
        let err = Templates::from_document(&document).unwrap_err();
        assert_eq!(err, ConstructionError::missing("#card-catalog"));
    }

    #[test]
    fn test_clone_template_copies_first_child() {
        let document = standard_document();
        let templates = Templates::from_document(&document).unwrap();

        let first = clone_template(&templates.card_catalog).unwrap();
        let second = clone_template(&templates.card_catalog).unwrap();
        assert!(first.has_class("card"));
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn test_empty_template_is_an_error() {
        let empty = Element::new("template").with_attr("id", "nothing");
        assert_eq!(
            clone_template(&empty).unwrap_err(),
            ConstructionError::EmptyTemplate {
                template: "nothing".to_string()
            }
        );
    }
}
