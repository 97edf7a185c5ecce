//! Presentable views.
//!
//! A view wraps a container [`Element`] and looks up the child elements it
//! drives once, at construction. Rendering takes a *patch*: a struct whose
//! fields are all `Option`, and only the `Some` fields are applied. Callers
//! never have to resupply fields they are not changing, and every setter is
//! idempotent.
//!
//! Views translate DOM interaction into [`crate::events::Event`]s; they never
//! touch application state directly.

use std::fmt::Display;
use std::rc::Rc;

use crate::dom::Element;

pub mod basket;
pub mod card;
pub mod form;
pub mod modal;
pub mod page;
pub mod success;

pub use basket::{Basket, BasketPatch};
pub use card::{Card, CardKind, CardPatch};
pub use form::{ContactsForm, ContactsPatch, Form, FormPatch, OrderForm, OrderPatch};
pub use modal::Modal;
pub use page::{Page, PagePatch};
pub use success::{Success, SuccessPatch};

/// Callback run when a view's control is activated.
pub type Action = Rc<dyn Fn()>;

/// A DOM-backed component rendered from partial state.
pub trait View {
    /// Partial state accepted by [`View::render`].
    type Patch;

    /// The root element of the view.
    fn container(&self) -> &Element;

    /// Apply the `Some` fields of `patch`.
    fn apply(&self, patch: Self::Patch);

    /// Apply `patch` and return the root element.
    fn render(&self, patch: Self::Patch) -> Element {
        self.apply(patch);
        self.container().clone()
    }
}

/// Set the text of an optional element.
pub(crate) fn set_text(element: Option<&Element>, value: impl Display) {
    if let Some(element) = element {
        element.set_text(&value.to_string());
    }
}

/// Set the disabled state of an optional element.
pub(crate) fn set_disabled(element: Option<&Element>, disabled: bool) {
    if let Some(element) = element {
        element.set_disabled(disabled);
    }
}

/// Point an image at `src`, using `alt` as alternative text when given.
pub(crate) fn set_image(element: &Element, src: &str, alt: Option<&str>) {
    element.set_attr("src", src);
    if let Some(alt) = alt {
        element.set_attr("alt", alt);
    }
}
