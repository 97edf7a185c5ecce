//! Storefront orchestration.
//!
//! [`Storefront`] owns the bus, the state, the long-lived views and the API
//! client, and subscribes the handlers that keep them in step. All of it runs
//! on one thread: network calls are `spawn_local` tasks, so a storefront must
//! be driven from inside a [`tokio::task::LocalSet`].
//!
//! # Checkout
//!
//! ```text
//! Closed -> CartOpen -> OrderOpen -> ContactsOpen -> Submitting -> SuccessShown
//!    ^                                   ^              |
//!    |                                   +-- failure ---+
//!    +------------- modal dismissed from any step
//! ```
//!
//! `Preview` is entered from the catalog and only leads back to `Closed`.
//! Each checkout step opens only from the one before it, and while an order
//! is in flight navigation and cart edits are ignored.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use larek_core::{OrderField, OrderResult, Product, ProductId};
use tokio::task::JoinHandle;

use crate::api::ShopApi;
use crate::dom::Element;
use crate::error::{self, ConstructionError, HandlerError};
use crate::events::{Event, EventBus, Topic};
use crate::model::AppState;
use crate::templates::{Templates, clone_template};
use crate::view::{
    Action, Basket, BasketPatch, Card, CardKind, CardPatch, ContactsForm, ContactsPatch, Modal,
    OrderForm, OrderPatch, Page, PagePatch, Success, SuccessPatch, View,
};

const ADD_LABEL: &str = "Add to basket";
const REMOVE_LABEL: &str = "Remove from basket";

/// Where the user is in the modal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    /// No modal is showing.
    Closed,
    /// A product is previewed.
    Preview,
    CartOpen,
    /// Payment and address.
    OrderOpen,
    /// Email and phone.
    ContactsOpen,
    /// The order request is in flight.
    Submitting,
    SuccessShown,
}

/// A running storefront session.
pub struct Storefront<A: ShopApi + 'static> {
    shared: Rc<Shared<A>>,
}

struct Shared<A: ShopApi + 'static> {
    bus: EventBus,
    state: AppState,
    api: Rc<A>,
    document: Element,
    templates: Templates,
    page: Page,
    modal: Modal,
    basket: Basket,
    order_form: OrderForm,
    contacts_form: ContactsForm,
    success: Success,
    step: Cell<CheckoutStep>,
    submitting: Cell<bool>,
    tasks: RefCell<Vec<JoinHandle<()>>>,
}

impl<A: ShopApi + 'static> Storefront<A> {
    /// Build the views from `document` and wire every handler.
    ///
    /// Nothing is fetched until [`Storefront::start`].
    ///
    /// # Errors
    ///
    /// Returns a `ConstructionError` if the document lacks a template or a
    /// required element.
    pub fn new(document: Element, api: A) -> Result<Self, ConstructionError> {
        let bus = EventBus::new();
        bus.subscribe_all(|event| {
            tracing::debug!(topic = %event.topic(), "Event published");
            Ok(())
        });

        let templates = Templates::from_document(&document)?;
        let page = Page::new(document.clone(), &bus)?;
        let modal = Modal::new(document.ensure("#modal-container")?, &bus)?;
        let basket = Basket::new(clone_template(&templates.basket)?, &bus)?;
        let order_form = OrderForm::new(clone_template(&templates.order)?, &bus)?;
        let contacts_form = ContactsForm::new(clone_template(&templates.contacts)?, &bus)?;
        let success = Success::new(clone_template(&templates.success)?, modal.close_action())?;

        let shared = Rc::new(Shared {
            state: AppState::new(bus.clone()),
            bus,
            api: Rc::new(api),
            document,
            templates,
            page,
            modal,
            basket,
            order_form,
            contacts_form,
            success,
            step: Cell::new(CheckoutStep::Closed),
            submitting: Cell::new(false),
            tasks: RefCell::new(Vec::new()),
        });
        wire(&shared);

        shared.render_cart()?;

        Ok(Self { shared })
    }

    /// Fetch the catalog in the background.
    pub fn start(&self) {
        self.shared.load_catalog();
    }

    /// Wait until no network task is in flight, including tasks spawned
    /// while waiting.
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.shared.tasks.borrow_mut());
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    tracing::error!(error = %err, "Storefront task failed");
                }
            }
        }
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.shared.bus
    }

    /// The backend client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.shared.api
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.shared.state
    }

    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.shared.step.get()
    }

    /// Whether an order request is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.shared.submitting.get()
    }

    #[must_use]
    pub fn document(&self) -> &Element {
        &self.shared.document
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.shared.page
    }

    #[must_use]
    pub fn modal(&self) -> &Modal {
        &self.shared.modal
    }

    #[must_use]
    pub fn basket(&self) -> &Basket {
        &self.shared.basket
    }

    #[must_use]
    pub fn order_form(&self) -> &OrderForm {
        &self.shared.order_form
    }

    #[must_use]
    pub fn contacts_form(&self) -> &ContactsForm {
        &self.shared.contacts_form
    }

    #[must_use]
    pub fn success(&self) -> &Success {
        &self.shared.success
    }

    /// The gallery card showing `id`.
    #[must_use]
    pub fn catalog_card(&self, id: &ProductId) -> Option<Element> {
        self.shared
            .page
            .gallery()
            .query(&format!("[data-id={id}]"))
    }
}

/// Subscribe `handler` to `topic` without keeping the storefront alive.
fn on<A, F>(shared: &Rc<Shared<A>>, topic: Topic, handler: F)
where
    A: ShopApi + 'static,
    F: Fn(&Rc<Shared<A>>, &Event) -> Result<(), HandlerError> + 'static,
{
    let weak = Rc::downgrade(shared);
    shared.bus.subscribe(topic, move |event| {
        let shared = weak.upgrade().ok_or(HandlerError::Detached)?;
        handler(&shared, event)
    });
}

fn wire<A: ShopApi + 'static>(shared: &Rc<Shared<A>>) {
    // Catalog
    on(shared, Topic::CatalogChanged, |s, event| match event {
        Event::CatalogChanged { catalog } => s.render_catalog(catalog),
        _ => Ok(()),
    });
    on(shared, Topic::CatalogRequest, |s, _| {
        s.load_catalog();
        Ok(())
    });
    on(shared, Topic::CatalogFailed, |s, event| {
        if let Event::CatalogFailed { message } = event {
            s.page.apply(PagePatch {
                notice: Some(Some(format!("Could not load the catalog: {message}"))),
                ..PagePatch::default()
            });
        }
        Ok(())
    });

    // Preview
    on(shared, Topic::ItemSelect, |s, event| match event {
        Event::ItemSelect(_) if s.busy(Topic::ItemSelect) => Ok(()),
        Event::ItemSelect(product) => Ok(s.state.set_preview(product.clone())?),
        _ => Ok(()),
    });
    on(shared, Topic::PreviewChanged, |s, event| match event {
        Event::PreviewChanged(product) => s.render_preview(product),
        _ => Ok(()),
    });

    // Cart
    on(shared, Topic::ItemAdd, |s, event| match event {
        Event::ItemAdd(_) if s.busy(Topic::ItemAdd) => Ok(()),
        Event::ItemAdd(product) => s.add_to_cart(product),
        _ => Ok(()),
    });
    on(shared, Topic::ItemRemove, |s, event| match event {
        Event::ItemRemove(_) if s.busy(Topic::ItemRemove) => Ok(()),
        Event::ItemRemove(product) => {
            error::add_breadcrumb(
                "basket",
                "Removed item",
                Some(&[("product_id", product.id.as_str())]),
            );
            Ok(s.state.remove_item(&product.id)?)
        }
        _ => Ok(()),
    });
    on(shared, Topic::CartChanged, |s, _| Ok(s.render_cart()?));
    on(shared, Topic::BasketOpen, |s, _| {
        if s.busy(Topic::BasketOpen) {
            return Ok(());
        }
        s.modal.render(s.basket.render(BasketPatch::default()));
        s.step.set(CheckoutStep::CartOpen);
        Ok(())
    });

    // Checkout
    on(shared, Topic::OrderOpen, |s, _| {
        if s.busy(Topic::OrderOpen) || !s.at(CheckoutStep::CartOpen, Topic::OrderOpen) {
            return Ok(());
        }
        s.open_order()
    });
    on(shared, Topic::OrderInput, |s, event| {
        if let Event::OrderInput(input) = event {
            s.state.set_order_field(input.clone())?;
        }
        Ok(())
    });
    on(shared, Topic::OrderSubmit, |s, _| {
        if !s.at(CheckoutStep::OrderOpen, Topic::OrderSubmit) {
            return Ok(());
        }
        if !s.state.order_step_valid() {
            tracing::debug!("Order step submitted while incomplete");
            return Ok(());
        }
        Ok(s.bus.publish(Event::ContactsOpen)?)
    });
    on(shared, Topic::ContactsOpen, |s, _| {
        if !s.at(CheckoutStep::OrderOpen, Topic::ContactsOpen) {
            return Ok(());
        }
        s.open_contacts()
    });
    on(shared, Topic::ContactsInput, |s, event| {
        if let Event::ContactsInput(input) = event {
            s.state.set_client_field(input.clone())?;
        }
        Ok(())
    });
    on(shared, Topic::ContactsSubmit, |s, _| {
        s.submit_order();
        Ok(())
    });
    on(shared, Topic::FormErrorsChanged, |s, event| {
        if let Event::FormErrorsChanged(errors) = event {
            s.order_form.apply(OrderPatch {
                valid: Some(errors.passes(&OrderField::ORDER_STEP)),
                errors: Some(errors.summary(&OrderField::ORDER_STEP)),
                ..OrderPatch::default()
            });
            s.contacts_form.apply(ContactsPatch {
                valid: Some(errors.passes(&OrderField::CONTACTS_STEP) && !s.submitting.get()),
                errors: Some(errors.summary(&OrderField::CONTACTS_STEP)),
                ..ContactsPatch::default()
            });
        }
        Ok(())
    });
    on(shared, Topic::OrderPlaced, |s, event| match event {
        Event::OrderPlaced(result) => s.order_placed(result),
        _ => Ok(()),
    });
    on(shared, Topic::OrderFailed, |s, event| {
        if let Event::OrderFailed { message } = event {
            s.order_failed(message);
        }
        Ok(())
    });

    // Modal
    on(shared, Topic::ModalOpen, |s, _| {
        s.page.apply(PagePatch {
            locked: Some(true),
            ..PagePatch::default()
        });
        Ok(())
    });
    on(shared, Topic::ModalClose, |s, _| {
        s.page.apply(PagePatch {
            locked: Some(false),
            ..PagePatch::default()
        });
        s.step.set(CheckoutStep::Closed);
        s.state.clear_preview();
        Ok(())
    });
}

impl<A: ShopApi + 'static> Shared<A> {
    fn spawn(&self, task: impl std::future::Future<Output = ()> + 'static) {
        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(tokio::task::spawn_local(task));
    }

    /// Whether an order is in flight; navigation is ignored until it settles.
    fn busy(&self, topic: Topic) -> bool {
        let busy = self.submitting.get();
        if busy {
            tracing::warn!(%topic, "Ignored while an order is being placed");
        }
        busy
    }

    /// Whether the flow is at `expected`, the only step `topic` may leave from.
    fn at(&self, expected: CheckoutStep, topic: Topic) -> bool {
        let step = self.step.get();
        if step != expected {
            tracing::debug!(%topic, ?step, "Ignored outside its checkout step");
        }
        step == expected
    }

    fn emitter(&self, event: Event) -> Action {
        let bus = self.bus.clone();
        Rc::new(move || bus.emit(event.clone()))
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    fn load_catalog(self: &Rc<Self>) {
        let shared = Rc::clone(self);
        self.spawn(async move {
            match shared.api.product_list().await {
                Ok(catalog) => {
                    tracing::info!(count = catalog.len(), "Catalog loaded");
                    if let Err(err) = shared.state.set_catalog(catalog) {
                        tracing::error!(error = %err, "Catalog handlers failed");
                    }
                }
                Err(err) => {
                    let sentry_event_id = error::capture(&err);
                    tracing::error!(
                        error = %err,
                        sentry_event_id = %sentry_event_id,
                        "Failed to load catalog"
                    );
                    shared.bus.emit(Event::CatalogFailed {
                        message: err.to_string(),
                    });
                }
            }
        });
    }

    fn render_catalog(&self, catalog: &[Product]) -> Result<(), HandlerError> {
        let cards = catalog
            .iter()
            .map(|product| {
                let card = Card::from_template(
                    &self.templates.card_catalog,
                    CardKind::Catalog,
                    Some(self.emitter(Event::ItemSelect(product.clone()))),
                )?;
                Ok(card.render(CardPatch {
                    id: Some(product.id.clone()),
                    title: Some(product.title.clone()),
                    price: Some(product.price),
                    category: Some(product.category.clone()),
                    image: Some(product.image.clone()),
                    ..CardPatch::default()
                }))
            })
            .collect::<Result<Vec<_>, ConstructionError>>()?;

        self.page.apply(PagePatch {
            catalog: Some(cards),
            notice: Some(None),
            ..PagePatch::default()
        });
        // Ids that were stale before may resolve now.
        Ok(self.render_cart()?)
    }

    fn render_preview(&self, product: &Product) -> Result<(), HandlerError> {
        let card = Card::from_template(&self.templates.card_preview, CardKind::Preview, None)?;

        let in_cart = self.state.contains(&product.id);
        if in_cart {
            let bus = self.bus.clone();
            let item = product.clone();
            card.set_action(
                REMOVE_LABEL,
                Rc::new(move || {
                    bus.emit(Event::ItemRemove(item.clone()));
                    bus.emit(Event::PreviewChanged(item.clone()));
                }),
            );
        } else {
            card.set_action(ADD_LABEL, self.emitter(Event::ItemAdd(product.clone())));
        }

        self.modal.render(card.render(CardPatch {
            id: Some(product.id.clone()),
            title: Some(product.title.clone()),
            price: Some(product.price),
            category: Some(product.category.clone()),
            image: Some(product.image.clone()),
            description: Some(product.description.clone()),
            valid: Some(in_cart || !product.is_priceless()),
            ..CardPatch::default()
        }));
        self.step.set(CheckoutStep::Preview);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    fn add_to_cart(&self, product: &Product) -> Result<(), HandlerError> {
        if product.is_priceless() {
            tracing::warn!(product_id = %product.id, "Priceless product cannot be added");
            return Ok(());
        }
        error::add_breadcrumb(
            "basket",
            "Added item",
            Some(&[("product_id", product.id.as_str())]),
        );
        self.state.add_item(&product.id)?;
        self.modal.close();
        Ok(())
    }

    fn render_cart(&self) -> Result<(), ConstructionError> {
        let lines = self.state.cart_lines();
        let rows = lines
            .iter()
            .map(|line| {
                let card = Card::from_template(
                    &self.templates.card_basket,
                    CardKind::Basket,
                    Some(self.emitter(Event::ItemRemove(line.product.clone()))),
                )?;
                Ok(card.render(CardPatch {
                    id: Some(line.product.id.clone()),
                    title: Some(line.product.title.clone()),
                    price: Some(line.product.price),
                    index: Some(line.index),
                    ..CardPatch::default()
                }))
            })
            .collect::<Result<Vec<_>, ConstructionError>>()?;

        self.basket.apply(BasketPatch {
            items: Some(rows),
            total: Some(self.state.recompute_total()),
            valid: Some(!lines.is_empty()),
        });
        self.page.apply(PagePatch {
            counter: Some(lines.len()),
            ..PagePatch::default()
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    fn open_order(&self) -> Result<(), HandlerError> {
        self.state.reset_order_step()?;
        self.modal.render(self.order_form.render(OrderPatch {
            payment: Some(None),
            address: Some(String::new()),
            valid: Some(false),
            errors: Some(String::new()),
        }));
        self.step.set(CheckoutStep::OrderOpen);
        Ok(())
    }

    fn open_contacts(&self) -> Result<(), HandlerError> {
        self.state.reset_contacts_step()?;
        self.modal.render(self.contacts_form.render(ContactsPatch {
            email: Some(String::new()),
            phone: Some(String::new()),
            valid: Some(false),
            errors: Some(String::new()),
        }));
        self.step.set(CheckoutStep::ContactsOpen);
        Ok(())
    }

    fn submit_order(self: &Rc<Self>) {
        if self.submitting.get() {
            tracing::warn!("Order submission already in flight; ignoring");
            return;
        }
        if !self.at(CheckoutStep::ContactsOpen, Topic::ContactsSubmit) {
            return;
        }
        if !self.state.order_step_valid() || !self.state.contacts_step_valid() {
            tracing::debug!("Contacts step submitted while incomplete");
            return;
        }

        let request = self.state.order_request();
        let count = request.items.len().to_string();
        error::add_breadcrumb(
            "checkout",
            "Submitting order",
            Some(&[("items", count.as_str())]),
        );

        self.submitting.set(true);
        self.step.set(CheckoutStep::Submitting);
        self.modal.set_closable(false);
        self.contacts_form.apply(ContactsPatch {
            valid: Some(false),
            ..ContactsPatch::default()
        });

        let shared = Rc::clone(self);
        self.spawn(async move {
            match shared.api.order_products(&request).await {
                Ok(result) => shared.bus.emit(Event::OrderPlaced(result)),
                Err(err) => {
                    let sentry_event_id = error::capture(&err);
                    tracing::error!(
                        error = %err,
                        sentry_event_id = %sentry_event_id,
                        "Failed to place order"
                    );
                    shared.bus.emit(Event::OrderFailed {
                        message: err.to_string(),
                    });
                }
            }
        });
    }

    fn finish_submission(&self) {
        self.submitting.set(false);
        self.modal.set_closable(true);
    }

    fn order_placed(&self, result: &OrderResult) -> Result<(), HandlerError> {
        self.finish_submission();
        tracing::info!(order_id = %result.id, total = %result.total, "Order placed");

        self.state.clear_order()?;
        self.modal.render(self.success.render(SuccessPatch {
            total: Some(result.total),
        }));
        self.step.set(CheckoutStep::SuccessShown);
        Ok(())
    }

    fn order_failed(&self, message: &str) {
        self.finish_submission();
        self.step.set(CheckoutStep::ContactsOpen);
        self.contacts_form.apply(ContactsPatch {
            valid: Some(self.state.contacts_step_valid()),
            errors: Some(format!(
                "Could not place the order: {message}. Please try again."
            )),
            ..ContactsPatch::default()
        });
    }
}
