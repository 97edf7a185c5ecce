//! In-memory element tree standing in for the browser DOM.
//!
//! Elements are cheap, shared handles (`Rc<RefCell<..>>`): cloning an
//! [`Element`] yields another handle to the same node, while
//! [`Element::deep_clone`] copies the subtree the way a `<template>` is
//! instantiated. Everything here is single-threaded.
//!
//! Listeners that reach back to their own subtree should hold a
//! [`WeakElement`], otherwise the node keeps itself alive.
//!
//! Lookups use a small selector subset: an optional tag followed by any mix
//! of `.class`, `#id` and `[attr]` / `[attr=value]` parts, e.g.
//! `button[type=submit]` or `.card__title`. There are no combinators.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use crate::error::ConstructionError;

/// Kinds of user interaction an element can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Click,
    Input,
    Submit,
}

/// Callback attached to an element.
pub type Listener = Rc<dyn Fn(&Element)>;

/// Handle to a node in the tree.
#[derive(Clone)]
pub struct Element(Rc<RefCell<Node>>);

/// Non-owning handle to a node.
#[derive(Clone)]
pub struct WeakElement(Weak<RefCell<Node>>);

impl WeakElement {
    /// The node, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Element> {
        self.0.upgrade().map(Element)
    }
}

#[derive(Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    children: Vec<Element>,
    listeners: Vec<(DomEvent, Listener)>,
}

impl Element {
    /// Create a detached element.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(Node {
            tag: tag.to_string(),
            ..Node::default()
        })))
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    /// Add a class and return the element.
    #[must_use]
    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Set an attribute and return the element.
    #[must_use]
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set the text content and return the element.
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Append a child and return the element.
    #[must_use]
    pub fn with_child(self, child: Self) -> Self {
        self.append(child);
        self
    }

    /// Mark disabled and return the element.
    #[must_use]
    pub fn disabled(self) -> Self {
        self.set_disabled(true);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }

    /// Whether both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn set_text(&self, text: &str) {
        let mut node = self.0.borrow_mut();
        if node.text != text {
            text.clone_into(&mut node.text);
        }
    }

    /// Current value of an input.
    #[must_use]
    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    /// Set an input's value without dispatching [`DomEvent::Input`].
    pub fn set_value(&self, value: &str) {
        value.clone_into(&mut self.0.borrow_mut().value);
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.borrow().attrs.get(name).cloned()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&self, name: &str) {
        self.0.borrow_mut().attrs.remove(name);
    }

    /// Whether the element carries the `hidden` attribute.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.0.borrow().attrs.contains_key("hidden")
    }

    pub fn set_hidden(&self, hidden: bool) {
        if hidden {
            self.set_attr("hidden", "");
        } else {
            self.remove_attr("hidden");
        }
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.0.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.0.borrow_mut().disabled = disabled;
    }

    // -------------------------------------------------------------------------
    // Classes
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.clone()
    }

    pub fn add_class(&self, class: &str) {
        let mut node = self.0.borrow_mut();
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.0.borrow().children.clone()
    }

    pub fn append(&self, child: Self) {
        self.0.borrow_mut().children.push(child);
    }

    pub fn replace_children(&self, children: Vec<Self>) {
        self.0.borrow_mut().children = children;
    }

    /// First descendant (not including `self`) matching `selector`, depth-first.
    #[must_use]
    pub fn query(&self, selector: &str) -> Option<Self> {
        let selector = Selector::parse(selector);
        self.find(&selector)
    }

    /// Every descendant matching `selector`, in document order.
    #[must_use]
    pub fn query_all(&self, selector: &str) -> Vec<Self> {
        let selector = Selector::parse(selector);
        let mut found = Vec::new();
        self.collect(&selector, &mut found);
        found
    }

    /// Like [`Element::query`], but a missing element is a [`ConstructionError`].
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if nothing matches.
    pub fn ensure(&self, selector: &str) -> Result<Self, ConstructionError> {
        self.query(selector)
            .ok_or_else(|| ConstructionError::missing(selector))
    }

    fn find(&self, selector: &Selector) -> Option<Self> {
        for child in self.children() {
            if selector.matches(&child) {
                return Some(child);
            }
            if let Some(found) = child.find(selector) {
                return Some(found);
            }
        }
        None
    }

    fn collect(&self, selector: &Selector, found: &mut Vec<Self>) {
        for child in self.children() {
            if selector.matches(&child) {
                found.push(child.clone());
            }
            child.collect(selector, found);
        }
    }

    /// Copy this subtree. Listeners are not copied.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let node = self.0.borrow();
        Self(Rc::new(RefCell::new(Node {
            tag: node.tag.clone(),
            classes: node.classes.clone(),
            attrs: node.attrs.clone(),
            text: node.text.clone(),
            value: node.value.clone(),
            disabled: node.disabled,
            children: node.children.iter().map(Self::deep_clone).collect(),
            listeners: Vec::new(),
        })))
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Attach a listener for `event`.
    pub fn on(&self, event: DomEvent, listener: impl Fn(&Self) + 'static) {
        self.0
            .borrow_mut()
            .listeners
            .push((event, Rc::new(listener)));
    }

    /// Run every listener attached for `event`, in attachment order.
    ///
    /// Listeners may freely mutate this element; no borrow is held while
    /// they run.
    pub fn dispatch(&self, event: DomEvent) {
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(kind, _)| *kind == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(self);
        }
    }

    /// Simulate a click. Disabled elements ignore clicks.
    pub fn click(&self) {
        if !self.is_disabled() {
            self.dispatch(DomEvent::Click);
        }
    }

    /// Simulate typing: set the value, then dispatch [`DomEvent::Input`].
    pub fn input(&self, value: &str) {
        self.set_value(value);
        self.dispatch(DomEvent::Input);
    }

    /// Simulate a form submission.
    pub fn submit(&self) {
        self.dispatch(DomEvent::Submit);
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Render the subtree as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let node = self.0.borrow();
        let _ = write!(out, "<{}", node.tag);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
        }
        for (name, value) in &node.attrs {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
        }
        if !node.value.is_empty() {
            let _ = write!(out, " value=\"{}\"", escape(&node.value));
        }
        if node.disabled {
            out.push_str(" disabled");
        }
        out.push('>');
        out.push_str(&escape(&node.text));
        for child in &node.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.0.borrow();
        f.debug_struct("Element")
            .field("tag", &node.tag)
            .field("classes", &node.classes)
            .field("attrs", &node.attrs)
            .field("children", &node.children.len())
            .finish_non_exhaustive()
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// Selectors
// =============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    fn parse(raw: &str) -> Self {
        let mut selector = Self::default();
        let mut rest = raw.trim();

        let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(tag_end);
        if !tag.is_empty() {
            selector.tag = Some(tag.to_string());
        }
        rest = tail;

        while let Some(marker) = rest.chars().next() {
            let body = &rest[marker.len_utf8()..];
            match marker {
                '[' => {
                    let end = body.find(']').unwrap_or(body.len());
                    let (inner, tail) = body.split_at(end);
                    let attr = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        ),
                        None => (inner.trim().to_string(), None),
                    };
                    selector.attrs.push(attr);
                    rest = tail.strip_prefix(']').unwrap_or(tail);
                }
                _ => {
                    let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                    let (name, tail) = body.split_at(end);
                    if marker == '#' {
                        selector.id = Some(name.to_string());
                    } else {
                        selector.classes.push(name.to_string());
                    }
                    rest = tail;
                }
            }
        }

        selector
    }

    fn matches(&self, element: &Element) -> bool {
        let node = element.0.borrow();
        self.tag.as_ref().is_none_or(|tag| *tag == node.tag)
            && self
                .id
                .as_ref()
                .is_none_or(|id| node.attrs.get("id") == Some(id))
            && self
                .classes
                .iter()
                .all(|class| node.classes.iter().any(|c| c == class))
            && self.attrs.iter().all(|(name, value)| match value {
                Some(value) => node.attrs.get(name) == Some(value),
                None => node.attrs.contains_key(name),
            })
    }
}
