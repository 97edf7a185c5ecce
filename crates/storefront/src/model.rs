//! Application state: catalog, cart, in-progress order, validation and preview.
//!
//! [`AppState`] is the single owner of mutable storefront data. Every mutation
//! publishes a notification on the [`EventBus`]; the data borrow is always
//! released first, so handlers are free to read state back.

use std::cell::RefCell;
use std::collections::HashMap;

use larek_core::{
    ContactsInput, FormErrors, Order, OrderField, OrderInput, OrderRequest, Price, Product,
    ProductId,
};

use crate::error::PublishError;
use crate::events::{Event, EventBus};

/// A resolved basket row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// 1-based position among resolved rows.
    pub index: usize,
    pub product: Product,
}

#[derive(Debug, Default)]
struct StateData {
    catalog: Vec<Product>,
    order: Order,
    preview: Option<ProductId>,
    form_errors: FormErrors,
}

impl StateData {
    /// Cart membership joined against the catalog. Ids with no catalog entry
    /// are skipped.
    fn lines(&self) -> Vec<CartLine> {
        let index: HashMap<&ProductId, &Product> = self
            .catalog
            .iter()
            .map(|product| (&product.id, product))
            .collect();

        self.order
            .items
            .iter()
            .filter_map(|id| index.get(id).copied())
            .enumerate()
            .map(|(position, product)| CartLine {
                index: position + 1,
                product: product.clone(),
            })
            .collect()
    }

    fn in_catalog(&self, id: &ProductId) -> bool {
        self.catalog.iter().any(|product| &product.id == id)
    }

    fn warn_stale(&self, id: &ProductId) {
        if !self.in_catalog(id) {
            tracing::warn!(product_id = %id, "Cart references a product missing from the catalog");
        }
    }

    fn refresh_total(&mut self) -> Price {
        let total = self
            .lines()
            .iter()
            .map(|line| line.product.price_or_zero())
            .sum();
        self.order.total = total;
        total
    }
}

/// Storefront state. Shared as `Rc<AppState>`.
#[derive(Debug)]
pub struct AppState {
    data: RefCell<StateData>,
    bus: EventBus,
}

impl AppState {
    /// Empty state publishing on `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            data: RefCell::new(StateData::default()),
            bus,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn catalog(&self) -> Vec<Product> {
        self.data.borrow().catalog.clone()
    }

    /// Look up a catalog product.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.data
            .borrow()
            .catalog
            .iter()
            .find(|product| &product.id == id)
            .cloned()
    }

    #[must_use]
    pub fn order(&self) -> Order {
        self.data.borrow().order.clone()
    }

    /// Cart membership in insertion order, stale ids included.
    #[must_use]
    pub fn items(&self) -> Vec<ProductId> {
        self.data.borrow().order.items.clone()
    }

    #[must_use]
    pub fn preview(&self) -> Option<ProductId> {
        self.data.borrow().preview.clone()
    }

    /// Errors from the last validation.
    #[must_use]
    pub fn form_errors(&self) -> FormErrors {
        self.data.borrow().form_errors.clone()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.data.borrow().order.items.contains(id)
    }

    /// Basket rows, numbered from 1.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.data.borrow().lines()
    }

    /// Recompute the order total from the catalog and store it.
    ///
    /// Priceless products count as zero.
    pub fn recompute_total(&self) -> Price {
        self.data.borrow_mut().refresh_total()
    }

    /// Payment and address both pass.
    #[must_use]
    pub fn order_step_valid(&self) -> bool {
        self.step_valid(&OrderField::ORDER_STEP)
    }

    /// Email and phone both pass.
    #[must_use]
    pub fn contacts_step_valid(&self) -> bool {
        self.step_valid(&OrderField::CONTACTS_STEP)
    }

    fn step_valid(&self, fields: &[OrderField]) -> bool {
        let data = self.data.borrow();
        fields.iter().all(|field| data.order.field_passes(*field))
    }

    /// Snapshot of the order for submission. Only products present in the
    /// catalog are listed.
    #[must_use]
    pub fn order_request(&self) -> OrderRequest {
        let mut data = self.data.borrow_mut();
        let total = data.refresh_total();
        let items = data
            .lines()
            .into_iter()
            .map(|line| line.product.id)
            .collect();
        let order = &data.order;
        OrderRequest {
            payment: order.payment,
            email: order.email.clone(),
            phone: order.phone.clone(),
            address: order.address.clone(),
            total,
            items,
        }
    }

    // -------------------------------------------------------------------------
    // Catalog and preview
    // -------------------------------------------------------------------------

    /// Replace the catalog.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `CatalogChanged` handler fails.
    pub fn set_catalog(&self, catalog: Vec<Product>) -> Result<(), PublishError> {
        {
            let mut data = self.data.borrow_mut();
            data.catalog.clone_from(&catalog);
            for id in &data.order.items {
                data.warn_stale(id);
            }
            data.refresh_total();
        }
        self.bus.publish(Event::CatalogChanged { catalog })
    }

    /// Record `product` as the previewed one.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `PreviewChanged` handler fails.
    pub fn set_preview(&self, product: Product) -> Result<(), PublishError> {
        self.data.borrow_mut().preview = Some(product.id.clone());
        self.bus.publish(Event::PreviewChanged(product))
    }

    /// Forget the preview. Publishes nothing.
    pub fn clear_preview(&self) {
        self.data.borrow_mut().preview = None;
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Put `id` in the cart. An id already in the cart is left alone and
    /// nothing is published.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `CartChanged` handler fails.
    pub fn add_item(&self, id: &ProductId) -> Result<(), PublishError> {
        {
            let mut data = self.data.borrow_mut();
            if data.order.items.contains(id) {
                tracing::debug!(product_id = %id, "Product already in cart");
                return Ok(());
            }
            data.warn_stale(id);
            data.order.items.push(id.clone());
            data.refresh_total();
        }
        self.bus.publish(Event::CartChanged)
    }

    /// Take every occurrence of `id` out of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `CartChanged` handler fails.
    pub fn remove_item(&self, id: &ProductId) -> Result<(), PublishError> {
        {
            let mut data = self.data.borrow_mut();
            data.order.items.retain(|item| item != id);
            data.refresh_total();
        }
        self.bus.publish(Event::CartChanged)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `CartChanged` handler fails.
    pub fn clear_cart(&self) -> Result<(), PublishError> {
        {
            let mut data = self.data.borrow_mut();
            data.order.items.clear();
            data.order.total = Price::ZERO;
        }
        self.bus.publish(Event::CartChanged)
    }

    // -------------------------------------------------------------------------
    // Order
    // -------------------------------------------------------------------------

    /// Assign a payment or address field, then revalidate.
    ///
    /// Returns whether the whole order is valid.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `FormErrorsChanged` handler fails.
    pub fn set_order_field(&self, input: OrderInput) -> Result<bool, PublishError> {
        self.data.borrow_mut().order.apply_order_input(input);
        self.validate_order()
    }

    /// Assign an email or phone field, then revalidate.
    ///
    /// Returns whether the whole order is valid.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `FormErrorsChanged` handler fails.
    pub fn set_client_field(&self, input: ContactsInput) -> Result<bool, PublishError> {
        self.data.borrow_mut().order.apply_contacts_input(input);
        self.validate_order()
    }

    /// Recompute every field error from scratch and publish the result.
    ///
    /// Returns whether no field fails.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `FormErrorsChanged` handler fails.
    pub fn validate_order(&self) -> Result<bool, PublishError> {
        let errors = {
            let mut data = self.data.borrow_mut();
            data.form_errors = data.order.validate();
            data.form_errors.clone()
        };
        let valid = errors.is_empty();
        self.bus.publish(Event::FormErrorsChanged(errors))?;
        Ok(valid)
    }

    /// Blank payment and address, then revalidate.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `FormErrorsChanged` handler fails.
    pub fn reset_order_step(&self) -> Result<bool, PublishError> {
        {
            let mut data = self.data.borrow_mut();
            data.order.payment = None;
            data.order.address.clear();
        }
        self.validate_order()
    }

    /// Blank email and phone, then revalidate.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a `FormErrorsChanged` handler fails.
    pub fn reset_contacts_step(&self) -> Result<bool, PublishError> {
        {
            let mut data = self.data.borrow_mut();
            data.order.email.clear();
            data.order.phone.clear();
        }
        self.validate_order()
    }

    /// Forget the placed order: blank every field, empty the cart, zero the
    /// total. Publishes `CartChanged`, then revalidates.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if a handler of either event fails.
    pub fn clear_order(&self) -> Result<(), PublishError> {
        self.data.borrow_mut().order.clear();
        self.bus.publish(Event::CartChanged)?;
        self.validate_order()?;
        Ok(())
    }
}
