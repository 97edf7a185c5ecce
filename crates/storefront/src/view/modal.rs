//! The single modal dialog.

use std::rc::Rc;

use super::{Action, View, set_disabled};
use crate::dom::{DomEvent, Element, WeakElement};
use crate::error::ConstructionError;
use crate::events::{Event, EventBus};

const ACTIVE: &str = "modal_active";

/// Modal dialog. Cloning yields another handle to the same dialog.
#[derive(Clone)]
pub struct Modal {
    container: Element,
    content: Element,
    close_button: Element,
    bus: EventBus,
}

impl Modal {
    /// Wrap the modal container. The close button closes it.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if `.modal__content` or
    /// `.modal__close` is absent.
    pub fn new(container: Element, bus: &EventBus) -> Result<Self, ConstructionError> {
        let modal = Self {
            content: container.ensure(".modal__content")?,
            close_button: container.ensure(".modal__close")?,
            container,
            bus: bus.clone(),
        };

        let close = modal.close_action();
        modal.close_button.on(DomEvent::Click, move |_| close());

        Ok(modal)
    }

    /// A callback that closes this dialog without keeping it alive.
    #[must_use]
    pub fn close_action(&self) -> Action {
        let parts = WeakModal {
            container: self.container.downgrade(),
            content: self.content.downgrade(),
            close_button: self.close_button.downgrade(),
            bus: self.bus.clone(),
        };
        Rc::new(move || {
            if let Some(modal) = parts.upgrade() {
                modal.close();
            }
        })
    }

    /// Show the dialog and publish [`Event::ModalOpen`].
    pub fn open(&self) {
        self.container.add_class(ACTIVE);
        self.bus.emit(Event::ModalOpen);
    }

    /// Hide the dialog, drop its content and publish [`Event::ModalClose`].
    ///
    /// Does nothing while closing is blocked.
    pub fn close(&self) {
        if self.close_button.is_disabled() {
            tracing::debug!("Modal close blocked");
            return;
        }
        self.container.remove_class(ACTIVE);
        self.content.replace_children(Vec::new());
        self.bus.emit(Event::ModalClose);
    }

    /// Whether the dialog is showing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.container.has_class(ACTIVE)
    }

    /// The element currently shown, if any.
    #[must_use]
    pub fn content(&self) -> Option<Element> {
        self.content.children().into_iter().next()
    }

    #[must_use]
    pub const fn close_button(&self) -> &Element {
        &self.close_button
    }

    /// Allow or block closing, e.g. while an order is being placed.
    pub fn set_closable(&self, closable: bool) {
        set_disabled(Some(&self.close_button), !closable);
    }
}

struct WeakModal {
    container: WeakElement,
    content: WeakElement,
    close_button: WeakElement,
    bus: EventBus,
}

impl WeakModal {
    fn upgrade(&self) -> Option<Modal> {
        Some(Modal {
            container: self.container.upgrade()?,
            content: self.content.upgrade()?,
            close_button: self.close_button.upgrade()?,
            bus: self.bus.clone(),
        })
    }
}

impl View for Modal {
    /// New content for the dialog.
    type Patch = Element;

    fn container(&self) -> &Element {
        &self.container
    }

    /// Replace the content and open the dialog. Opening an already open
    /// dialog only swaps its content.
    fn apply(&self, content: Element) {
        self.content.replace_children(vec![content]);
        if !self.is_open() {
            self.open();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::Topic;
    use crate::templates::standard_document;

    fn modal(bus: &EventBus) -> Modal {
        let document = standard_document();
        Modal::new(document.ensure("#modal-container").unwrap(), bus).unwrap()
    }

    fn record(bus: &EventBus) -> Rc<RefCell<Vec<Topic>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        bus.subscribe_all(move |event| {
            sink.borrow_mut().push(event.topic());
            Ok(())
        });
        log
    }

    #[test]
    fn test_render_opens_with_content() {
        let bus = EventBus::new();
        let log = record(&bus);
        let modal = modal(&bus);

        let content = Element::new("p").with_text("hello");
        modal.render(content.clone());

        assert!(modal.is_open());
        assert!(modal.content().unwrap().ptr_eq(&content));
        assert_eq!(*log.borrow(), vec![Topic::ModalOpen]);
    }

    #[test]
    fn test_rerender_swaps_content_without_reopening() {
        let bus = EventBus::new();
        let log = record(&bus);
        let modal = modal(&bus);

        modal.render(Element::new("p"));
        let second = Element::new("div");
        modal.render(second.clone());

        assert!(modal.content().unwrap().ptr_eq(&second));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_close_button_clears_content() {
        let bus = EventBus::new();
        let log = record(&bus);
        let modal = modal(&bus);

        modal.render(Element::new("p"));
        modal.close_button().click();

        assert!(!modal.is_open());
        assert!(modal.content().is_none());
        assert_eq!(*log.borrow(), vec![Topic::ModalOpen, Topic::ModalClose]);
    }

    #[test]
    fn test_unclosable_modal_ignores_close_button() {
        let bus = EventBus::new();
        let modal = modal(&bus);
        modal.render(Element::new("p"));

        modal.set_closable(false);
        modal.close_button().click();
        assert!(modal.is_open());

        modal.set_closable(true);
        modal.close_button().click();
        assert!(!modal.is_open());
    }

    #[test]
    fn test_blocked_modal_ignores_programmatic_close() {
        let bus = EventBus::new();
        let log = record(&bus);
        let modal = modal(&bus);
        modal.render(Element::new("p"));

        modal.set_closable(false);
        modal.close();
        assert!(modal.is_open());
        assert!(modal.content().is_some());
        assert_eq!(*log.borrow(), vec![Topic::ModalOpen]);
    }

    #[test]
    fn test_close_button_does_not_keep_modal_alive() {
        let bus = EventBus::new();
        let document = standard_document();
        let container = document.ensure("#modal-container").unwrap();
        let close_button = container.query(".modal__close").unwrap().downgrade();

        let modal = Modal::new(container, &bus).unwrap();
        let action = modal.close_action();
        drop(modal);
        drop(document);

        assert!(close_button.upgrade().is_none());
        action();
    }
}
