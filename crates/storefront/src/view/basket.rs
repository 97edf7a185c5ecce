//! Basket contents view.

use larek_core::Price;

use super::{View, set_disabled, set_text};
use crate::dom::{DomEvent, Element};
use crate::error::ConstructionError;
use crate::events::{Event, EventBus};

/// Partial basket state.
#[derive(Debug, Clone, Default)]
pub struct BasketPatch {
    /// Rendered basket rows, in order.
    pub items: Option<Vec<Element>>,
    pub total: Option<Price>,
    /// Whether checkout may start.
    pub valid: Option<bool>,
}

/// The basket shown in the modal.
pub struct Basket {
    container: Element,
    list: Element,
    total: Option<Element>,
    button: Option<Element>,
}

impl Basket {
    /// Wrap an instantiated basket template. The checkout button publishes
    /// [`Event::OrderOpen`].
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if `.basket__list` is absent.
    pub fn new(container: Element, bus: &EventBus) -> Result<Self, ConstructionError> {
        let basket = Self {
            list: container.ensure(".basket__list")?,
            total: container.query(".basket__price"),
            button: container.query(".basket__button"),
            container,
        };

        if let Some(button) = &basket.button {
            let bus = bus.clone();
            button.on(DomEvent::Click, move |_| bus.emit(Event::OrderOpen));
        }

        Ok(basket)
    }

    /// The rows currently listed.
    #[must_use]
    pub fn rows(&self) -> Vec<Element> {
        self.list.children()
    }

    /// The checkout button, if present.
    #[must_use]
    pub const fn button(&self) -> Option<&Element> {
        self.button.as_ref()
    }
}

impl View for Basket {
    type Patch = BasketPatch;

    fn container(&self) -> &Element {
        &self.container
    }

    fn apply(&self, patch: BasketPatch) {
        if let Some(items) = patch.items {
            self.list.replace_children(items);
        }
        if let Some(total) = patch.total {
            set_text(self.total.as_ref(), total);
        }
        if let Some(valid) = patch.valid {
            set_disabled(self.button.as_ref(), !valid);
        }
    }
}
