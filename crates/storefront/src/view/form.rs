//! Checkout forms.
//!
//! [`Form`] holds what both steps share: a submit button that follows the
//! step's validity and an error line. [`OrderForm`] and [`ContactsForm`] add
//! their own fields and translate edits into input events.

use std::rc::Rc;

use larek_core::{ContactsInput, OrderInput, PaymentMethod};

use super::View;
use crate::dom::{DomEvent, Element, WeakElement};
use crate::error::ConstructionError;
use crate::events::{Event, EventBus};

const SUBMIT: &str = "button[type=submit]";
const ERRORS: &str = ".form__errors";
const ACTIVE_PAYMENT: &str = "button_alt-active";

/// Partial state shared by every form.
#[derive(Debug, Clone, Default)]
pub struct FormPatch {
    /// Whether the form may be submitted.
    pub valid: Option<bool>,
    /// Error summary shown under the fields. An empty string clears it.
    pub errors: Option<String>,
}

/// A form with a submit button and an error line.
pub struct Form {
    container: Element,
    submit: Element,
    errors: Element,
}

impl Form {
    /// Wrap a form element. Submitting it publishes `on_submit`.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if the submit button or the
    /// error line is absent.
    pub fn new(
        container: Element,
        bus: &EventBus,
        on_submit: Event,
    ) -> Result<Self, ConstructionError> {
        let form = Self {
            submit: container.ensure(SUBMIT)?,
            errors: container.ensure(ERRORS)?,
            container,
        };

        let target = form.container.downgrade();
        form.submit.on(DomEvent::Click, move |_| {
            if let Some(container) = target.upgrade() {
                container.submit();
            }
        });

        let bus = bus.clone();
        form.container
            .on(DomEvent::Submit, move |_| bus.emit(on_submit.clone()));

        Ok(form)
    }

    /// The named field of this form.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if no element carries `name`.
    pub fn field(&self, name: &str) -> Result<Element, ConstructionError> {
        self.container.ensure(&format!("[name={name}]"))
    }

    #[must_use]
    pub const fn submit_button(&self) -> &Element {
        &self.submit
    }

    /// Text of the error line.
    #[must_use]
    pub fn errors(&self) -> String {
        self.errors.text()
    }
}

impl View for Form {
    type Patch = FormPatch;

    fn container(&self) -> &Element {
        &self.container
    }

    fn apply(&self, patch: FormPatch) {
        if let Some(valid) = patch.valid {
            self.submit.set_disabled(!valid);
        }
        if let Some(errors) = patch.errors {
            self.errors.set_text(&errors);
        }
    }
}

// =============================================================================
// Order step
// =============================================================================

/// Partial state of the payment and address step.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    /// `Some(None)` clears the payment selection.
    pub payment: Option<Option<PaymentMethod>>,
    pub address: Option<String>,
    pub valid: Option<bool>,
    pub errors: Option<String>,
}

/// Payment method and delivery address.
pub struct OrderForm {
    form: Form,
    payments: Rc<[(PaymentMethod, Element)]>,
    address: Element,
}

impl OrderForm {
    /// Wrap an instantiated order template.
    ///
    /// Payment buttons are named after [`PaymentMethod::as_str`]; clicking one
    /// marks it active and publishes the choice. Typing in the address field
    /// publishes the new value. Submitting publishes [`Event::OrderSubmit`].
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if a payment button, the
    /// address field or a shared form part is absent.
    pub fn new(container: Element, bus: &EventBus) -> Result<Self, ConstructionError> {
        let form = Form::new(container, bus, Event::OrderSubmit)?;
        let payments: Rc<[(PaymentMethod, Element)]> = PaymentMethod::ALL
            .into_iter()
            .map(|method| Ok((method, form.field(method.as_str())?)))
            .collect::<Result<Vec<_>, ConstructionError>>()?
            .into();
        let address = form.field("address")?;

        let weak: Rc<[(PaymentMethod, WeakElement)]> = payments
            .iter()
            .map(|(method, button)| (*method, button.downgrade()))
            .collect();
        for (method, button) in payments.iter() {
            let method = *method;
            let all = Rc::clone(&weak);
            let bus = bus.clone();
            button.on(DomEvent::Click, move |_| {
                let live: Vec<_> = all
                    .iter()
                    .filter_map(|(kind, button)| Some((*kind, button.upgrade()?)))
                    .collect();
                highlight(&live, Some(method));
                bus.emit(Event::OrderInput(OrderInput::Payment(Some(method))));
            });
        }

        let bus = bus.clone();
        address.on(DomEvent::Input, move |field| {
            bus.emit(Event::OrderInput(OrderInput::Address(field.value())));
        });

        Ok(Self {
            form,
            payments,
            address,
        })
    }

    /// Mark `method` as the active payment button. Visual only.
    pub fn select_payment(&self, method: Option<PaymentMethod>) {
        highlight(&self.payments, method);
    }

    /// The button for `method`.
    #[must_use]
    pub fn payment_button(&self, method: PaymentMethod) -> Option<&Element> {
        self.payments
            .iter()
            .find(|(candidate, _)| *candidate == method)
            .map(|(_, button)| button)
    }

    /// The payment method whose button is active.
    #[must_use]
    pub fn selected_payment(&self) -> Option<PaymentMethod> {
        self.payments
            .iter()
            .find(|(_, button)| button.has_class(ACTIVE_PAYMENT))
            .map(|(method, _)| *method)
    }

    #[must_use]
    pub const fn address(&self) -> &Element {
        &self.address
    }

    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.form
    }
}

fn highlight(payments: &[(PaymentMethod, Element)], selected: Option<PaymentMethod>) {
    for (method, button) in payments {
        button.toggle_class(ACTIVE_PAYMENT, Some(*method) == selected);
    }
}

impl View for OrderForm {
    type Patch = OrderPatch;

    fn container(&self) -> &Element {
        self.form.container()
    }

    fn apply(&self, patch: OrderPatch) {
        if let Some(payment) = patch.payment {
            self.select_payment(payment);
        }
        if let Some(address) = patch.address {
            self.address.set_value(&address);
        }
        self.form.apply(FormPatch {
            valid: patch.valid,
            errors: patch.errors,
        });
    }
}

// =============================================================================
// Contacts step
// =============================================================================

/// Partial state of the contacts step.
#[derive(Debug, Clone, Default)]
pub struct ContactsPatch {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub valid: Option<bool>,
    pub errors: Option<String>,
}

/// Email and phone number.
pub struct ContactsForm {
    form: Form,
    email: Element,
    phone: Element,
}

impl ContactsForm {
    /// Wrap an instantiated contacts template. Typing in either field
    /// publishes the new value; submitting publishes [`Event::ContactsSubmit`].
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::MissingElement` if a field or a shared form
    /// part is absent.
    pub fn new(container: Element, bus: &EventBus) -> Result<Self, ConstructionError> {
        let form = Form::new(container, bus, Event::ContactsSubmit)?;
        let email = form.field("email")?;
        let phone = form.field("phone")?;

        let emitter = bus.clone();
        email.on(DomEvent::Input, move |field| {
            emitter.emit(Event::ContactsInput(ContactsInput::Email(field.value())));
        });
        let emitter = bus.clone();
        phone.on(DomEvent::Input, move |field| {
            emitter.emit(Event::ContactsInput(ContactsInput::Phone(field.value())));
        });

        Ok(Self { form, email, phone })
    }

    #[must_use]
    pub const fn email(&self) -> &Element {
        &self.email
    }

    #[must_use]
    pub const fn phone(&self) -> &Element {
        &self.phone
    }

    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.form
    }
}

impl View for ContactsForm {
    type Patch = ContactsPatch;

    fn container(&self) -> &Element {
        self.form.container()
    }

    fn apply(&self, patch: ContactsPatch) {
        if let Some(email) = patch.email {
            self.email.set_value(&email);
        }
        if let Some(phone) = patch.phone {
            self.phone.set_value(&phone);
        }
        self.form.apply(FormPatch {
            valid: patch.valid,
            errors: patch.errors,
        });
    }
}
