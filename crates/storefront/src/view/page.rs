//! Page chrome: gallery, basket counter, scroll lock and the notice line.

use super::View;
use crate::dom::{DomEvent, Element};
use crate::error::ConstructionError;
use crate::events::{Event, EventBus};

const LOCKED: &str = "page__wrapper_locked";

/// Partial page state.
#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    /// Number shown on the basket icon.
    pub counter: Option<usize>,
    /// Gallery cards, in catalog order.
    pub catalog: Option<Vec<Element>>,
    /// Freeze scrolling while the modal is open.
    pub locked: Option<bool>,
    /// `Some(None)` hides the notice.
    pub notice: Option<Option<String>>,
}

/// The storefront page.
pub struct Page {
    container: Element,
    gallery: Element,
    counter: Element,
    wrapper: Element,
    basket: Element,
    notice: Option<Element>,
    notice_text: Option<Element>,
    retry: Option<Element>,
}

impl Page {
    /// Wrap the page element. The basket icon publishes
    /// [`Event::BasketOpen`]; the retry button, if present, publishes
    /// [`Event::CatalogRequest`].
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if the gallery, the basket
    /// icon, its counter or the page wrapper is absent.
    pub fn new(container: Element, bus: &EventBus) -> Result<Self, ConstructionError> {
        let page = Self {
            gallery: container.ensure(".gallery")?,
            counter: container.ensure(".header__basket-counter")?,
            wrapper: container.ensure(".page__wrapper")?,
            basket: container.ensure(".header__basket")?,
            notice: container.query(".page__notice"),
            notice_text: container.query(".page__notice-text"),
            retry: container.query(".page__retry"),
            container,
        };

        let emitter = bus.clone();
        page.basket
            .on(DomEvent::Click, move |_| emitter.emit(Event::BasketOpen));

        if let Some(retry) = &page.retry {
            let emitter = bus.clone();
            retry.on(DomEvent::Click, move |_| emitter.emit(Event::CatalogRequest));
        }

        Ok(page)
    }

    #[must_use]
    pub const fn gallery(&self) -> &Element {
        &self.gallery
    }

    #[must_use]
    pub const fn basket_button(&self) -> &Element {
        &self.basket
    }

    #[must_use]
    pub const fn retry_button(&self) -> Option<&Element> {
        self.retry.as_ref()
    }

    /// Current counter text.
    #[must_use]
    pub fn counter(&self) -> String {
        self.counter.text()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.wrapper.has_class(LOCKED)
    }

    /// The notice text, if the notice is showing.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        let notice = self.notice.as_ref()?;
        if notice.is_hidden() {
            return None;
        }
        Some(
            self.notice_text
                .as_ref()
                .map_or_else(|| notice.text(), Element::text),
        )
    }

    fn set_notice(&self, message: Option<&str>) {
        let Some(notice) = &self.notice else {
            if let Some(message) = message {
                tracing::warn!(notice = message, "Page has no notice area");
            }
            return;
        };
        let target = self.notice_text.as_ref().unwrap_or(notice);
        target.set_text(message.unwrap_or_default());
        notice.set_hidden(message.is_none());
    }
}

impl View for Page {
    type Patch = PagePatch;

    fn container(&self) -> &Element {
        &self.container
    }

    fn apply(&self, patch: PagePatch) {
        if let Some(counter) = patch.counter {
            self.counter.set_text(&counter.to_string());
        }
        if let Some(catalog) = patch.catalog {
            self.gallery.replace_children(catalog);
        }
        if let Some(locked) = patch.locked {
            self.wrapper.toggle_class(LOCKED, locked);
        }
        if let Some(notice) = patch.notice {
            self.set_notice(notice.as_deref());
        }
    }
}
