//! Typed publish/subscribe hub.
//!
//! Every interaction between the state, the views and the orchestration layer
//! goes through an [`EventBus`]. Topics form a closed enum; an event carries
//! its payload in the matching [`Event`] variant.
//!
//! # Dispatch rules
//!
//! - Handlers run synchronously on the publishing thread: catch-all listeners
//!   first, then topic handlers in subscription order.
//! - A handler may publish. The nested publish runs to completion before the
//!   outer publish moves on to its next handler (depth-first).
//! - Handlers are isolated: a failing handler is logged and reported, and the
//!   remaining handlers still run. [`EventBus::publish`] then returns every
//!   failure in a [`PublishError`].
//! - Subscribing or unsubscribing during a publish takes effect from the next
//!   publish.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use larek_core::{ContactsInput, FormErrors, OrderInput, OrderResult, Product};

use crate::error::{self, HandlerError, PublishError};

/// Event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    CatalogChanged,
    CatalogRequest,
    CatalogFailed,
    ItemSelect,
    PreviewChanged,
    ItemAdd,
    ItemRemove,
    CartChanged,
    BasketOpen,
    OrderOpen,
    OrderInput,
    OrderSubmit,
    ContactsOpen,
    ContactsInput,
    ContactsSubmit,
    FormErrorsChanged,
    OrderPlaced,
    OrderFailed,
    ModalOpen,
    ModalClose,
}

impl Topic {
    /// Stable name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CatalogChanged => "items:changed",
            Self::CatalogRequest => "items:request",
            Self::CatalogFailed => "items:failed",
            Self::ItemSelect => "item:select",
            Self::PreviewChanged => "preview:changed",
            Self::ItemAdd => "item:add",
            Self::ItemRemove => "item:remove",
            Self::CartChanged => "cart:changed",
            Self::BasketOpen => "cart:open",
            Self::OrderOpen => "order:open",
            Self::OrderInput => "order:input",
            Self::OrderSubmit => "order:submit",
            Self::ContactsOpen => "contacts:open",
            Self::ContactsInput => "contacts:input",
            Self::ContactsSubmit => "contacts:submit",
            Self::FormErrorsChanged => "formErrors:change",
            Self::OrderPlaced => "order:placed",
            Self::OrderFailed => "order:failed",
            Self::ModalOpen => "modal:open",
            Self::ModalClose => "modal:close",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event and its payload.
#[derive(Debug, Clone)]
pub enum Event {
    /// The catalog was replaced.
    CatalogChanged { catalog: Vec<Product> },
    /// The user asked to (re)load the catalog.
    CatalogRequest,
    /// Loading the catalog failed.
    CatalogFailed { message: String },
    /// A catalog card was activated.
    ItemSelect(Product),
    /// The previewed product changed.
    PreviewChanged(Product),
    /// The user asked to put a product in the basket.
    ItemAdd(Product),
    /// The user asked to take a product out of the basket.
    ItemRemove(Product),
    /// Cart membership changed. Consumers re-read state.
    CartChanged,
    BasketOpen,
    OrderOpen,
    OrderInput(OrderInput),
    OrderSubmit,
    ContactsOpen,
    ContactsInput(ContactsInput),
    ContactsSubmit,
    /// Validation was recomputed.
    FormErrorsChanged(FormErrors),
    /// The backend accepted the order.
    OrderPlaced(OrderResult),
    /// Submitting the order failed.
    OrderFailed { message: String },
    ModalOpen,
    ModalClose,
}

impl Event {
    /// The topic this event is published on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::CatalogChanged { .. } => Topic::CatalogChanged,
            Self::CatalogRequest => Topic::CatalogRequest,
            Self::CatalogFailed { .. } => Topic::CatalogFailed,
            Self::ItemSelect(_) => Topic::ItemSelect,
            Self::PreviewChanged(_) => Topic::PreviewChanged,
            Self::ItemAdd(_) => Topic::ItemAdd,
            Self::ItemRemove(_) => Topic::ItemRemove,
            Self::CartChanged => Topic::CartChanged,
            Self::BasketOpen => Topic::BasketOpen,
            Self::OrderOpen => Topic::OrderOpen,
            Self::OrderInput(_) => Topic::OrderInput,
            Self::OrderSubmit => Topic::OrderSubmit,
            Self::ContactsOpen => Topic::ContactsOpen,
            Self::ContactsInput(_) => Topic::ContactsInput,
            Self::ContactsSubmit => Topic::ContactsSubmit,
            Self::FormErrorsChanged(_) => Topic::FormErrorsChanged,
            Self::OrderPlaced(_) => Topic::OrderPlaced,
            Self::OrderFailed { .. } => Topic::OrderFailed,
            Self::ModalOpen => Topic::ModalOpen,
            Self::ModalClose => Topic::ModalClose,
        }
    }
}

/// Identifies a subscription for [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event) -> Result<(), HandlerError>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    topics: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
    all: Vec<(SubscriptionId, Handler)>,
}

impl Registry {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }
}

/// Shared event bus. Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Registry>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `topic`.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Result<(), HandlerError> + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id();
        registry
            .topics
            .entry(topic)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Subscribe `handler` to every topic.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> Result<(), HandlerError> + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id();
        registry.all.push((id, Rc::new(handler)));
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let before = registry.all.len();
        registry.all.retain(|(sid, _)| *sid != id);
        if registry.all.len() != before {
            return true;
        }
        registry.topics.values_mut().any(|handlers| {
            let before = handlers.len();
            handlers.retain(|(sid, _)| *sid != id);
            handlers.len() != before
        })
    }

    /// Number of handlers subscribed to `topic`, excluding catch-all listeners.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .borrow()
            .topics
            .get(&topic)
            .map_or(0, Vec::len)
    }

    /// Publish `event` to its topic.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` listing every handler that failed. All
    /// handlers run regardless.
    pub fn publish(&self, event: Event) -> Result<(), PublishError> {
        let topic = event.topic();
        let handlers: Vec<Handler> = {
            let registry = self.inner.borrow();
            registry
                .all
                .iter()
                .chain(registry.topics.get(&topic).into_iter().flatten())
                .map(|(_, handler)| Rc::clone(handler))
                .collect()
        };

        let mut failures = Vec::new();
        for handler in handlers {
            if let Err(err) = handler(&event) {
                let sentry_event_id = error::capture(&err);
                tracing::error!(
                    topic = %topic,
                    error = %err,
                    sentry_event_id = %sentry_event_id,
                    "Event handler failed"
                );
                failures.push(err);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError { topic, failures })
        }
    }

    /// Publish from a DOM callback, where there is no caller to return to.
    ///
    /// Failures are already logged by [`EventBus::publish`].
    pub fn emit(&self, event: Event) {
        let _ = self.publish(event);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("topics", &registry.topics.len())
            .field("catch_all", &registry.all.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn recorder(
        log: &Rc<RefCell<Vec<String>>>,
        label: &'static str,
    ) -> impl Fn(&Event) -> Result<(), HandlerError> + 'static {
        let log = Rc::clone(log);
        move |event| {
            log.borrow_mut().push(format!("{label}:{}", event.topic()));
            Ok(())
        }
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(Topic::CartChanged, recorder(&log, "first"));
        bus.subscribe(Topic::CartChanged, recorder(&log, "second"));
        bus.subscribe(Topic::ModalOpen, recorder(&log, "other"));

        bus.publish(Event::CartChanged).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["first:cart:changed", "second:cart:changed"]
        );
    }

    #[test]
    fn test_catch_all_sees_every_event_first() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(Topic::ModalOpen, recorder(&log, "topic"));
        bus.subscribe_all(recorder(&log, "all"));

        bus.publish(Event::ModalOpen).unwrap();
        bus.publish(Event::ModalClose).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["all:modal:open", "topic:modal:open", "all:modal:close"]
        );
    }

    #[test]
    fn test_nested_publish_is_depth_first() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let nested_bus = bus.clone();
        let nested_log = Rc::clone(&log);
        bus.subscribe(Topic::ItemAdd, move |_| {
            nested_log.borrow_mut().push("outer-1".to_string());
            nested_bus.publish(Event::CartChanged)?;
            Ok(())
        });
        bus.subscribe(Topic::ItemAdd, recorder(&log, "outer-2"));
        bus.subscribe(Topic::CartChanged, recorder(&log, "inner"));

        let product = larek_core::Product {
            id: "a".into(),
            title: "A".to_string(),
            category: "другое".into(),
            description: String::new(),
            price: None,
            image: String::new(),
        };
        bus.publish(Event::ItemAdd(product)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["outer-1", "inner:cart:changed", "outer-2:item:add"]
        );
    }

    #[test]
    fn test_failing_handler_does_not_suppress_siblings() {
        let bus = EventBus::new();
        let ran = Rc::new(Cell::new(0));

        bus.subscribe(Topic::CartChanged, |_| Err(HandlerError::Detached));
        let counter = Rc::clone(&ran);
        bus.subscribe(Topic::CartChanged, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let err = bus.publish(Event::CartChanged).unwrap_err();
        assert_eq!(err.topic, Topic::CartChanged);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(ran.get(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let ran = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ran);
        let id = bus.subscribe(Topic::CartChanged, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        bus.publish(Event::CartChanged).unwrap();
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(Event::CartChanged).unwrap();
        assert_eq!(ran.get(), 1);
        assert_eq!(bus.subscriber_count(Topic::CartChanged), 0);
    }

    #[test]
    fn test_subscribe_during_publish_applies_next_time() {
        let bus = EventBus::new();
        let ran = Rc::new(Cell::new(0));

        let inner_bus = bus.clone();
        let counter = Rc::clone(&ran);
        bus.subscribe(Topic::CartChanged, move |_| {
            let counter = Rc::clone(&counter);
            inner_bus.subscribe(Topic::CartChanged, move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            });
            Ok(())
        });

        bus.publish(Event::CartChanged).unwrap();
        assert_eq!(ran.get(), 0);
        bus.publish(Event::CartChanged).unwrap();
        assert_eq!(ran.get(), 1);
    }
}
