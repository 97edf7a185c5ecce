//! Order confirmation.

use larek_core::Price;

use super::{Action, View};
use crate::dom::{DomEvent, Element};
use crate::error::ConstructionError;

#[derive(Debug, Clone, Default)]
pub struct SuccessPatch {
    /// Amount the backend charged.
    pub total: Option<Price>,
}

/// "Order placed" view.
pub struct Success {
    container: Element,
    description: Element,
    close_button: Element,
}

impl Success {
    /// Wrap an instantiated success template. The close button runs `on_close`.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if the description or the
    /// close button is absent.
    pub fn new(container: Element, on_close: Action) -> Result<Self, ConstructionError> {
        let success = Self {
            description: container.ensure(".order-success__description")?,
            close_button: container.ensure(".order-success__close")?,
            container,
        };
        success
            .close_button
            .on(DomEvent::Click, move |_| on_close());
        Ok(success)
    }

    #[must_use]
    pub const fn close_button(&self) -> &Element {
        &self.close_button
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.description.text()
    }
}

impl View for Success {
    type Patch = SuccessPatch;

    fn container(&self) -> &Element {
        &self.container
    }

    fn apply(&self, patch: SuccessPatch) {
        if let Some(total) = patch.total {
            self.description.set_text(&format!("Charged {total}"));
        }
    }
}
