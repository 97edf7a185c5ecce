//! The in-progress checkout record and its validation rules.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{OrderId, ProductId};
use super::price::Price;

/// Errors that can occur when parsing a [`PaymentMethod`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct PaymentMethodError(String);

/// How the buyer pays. Exactly one may be selected at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Pay online by card.
    Card,
    /// Pay on delivery.
    Cash,
}

impl PaymentMethod {
    /// Every payment method, in display order.
    pub const ALL: [Self; 2] = [Self::Card, Self::Cash];

    /// Wire name, also used as the name of the payment button.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| PaymentMethodError(s.to_owned()))
    }
}

/// The user-editable fields of an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    Payment,
    Address,
    Email,
    Phone,
}

impl OrderField {
    /// Fields edited on the order (first) checkout step.
    pub const ORDER_STEP: [Self; 2] = [Self::Payment, Self::Address];

    /// Fields edited on the contacts (second) checkout step.
    pub const CONTACTS_STEP: [Self; 2] = [Self::Email, Self::Phone];

    /// Field name as used in forms and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Address => "address",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Message shown while the field fails its rule.
    #[must_use]
    pub const fn requirement(&self) -> &'static str {
        match self {
            Self::Payment => "Select a payment method",
            Self::Address => "Enter a delivery address",
            Self::Email => "Enter an email",
            Self::Phone => "Enter a phone number",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single edit made on the order step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderInput {
    Payment(Option<PaymentMethod>),
    Address(String),
}

impl OrderInput {
    /// The field this input edits.
    #[must_use]
    pub const fn field(&self) -> OrderField {
        match self {
            Self::Payment(_) => OrderField::Payment,
            Self::Address(_) => OrderField::Address,
        }
    }
}

/// A single edit made on the contacts step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactsInput {
    Email(String),
    Phone(String),
}

impl ContactsInput {
    /// The field this input edits.
    #[must_use]
    pub const fn field(&self) -> OrderField {
        match self {
            Self::Email(_) => OrderField::Email,
            Self::Phone(_) => OrderField::Phone,
        }
    }
}

/// Per-field validation messages.
///
/// A field has an entry exactly when it currently fails its rule. The map is
/// rebuilt from scratch by [`Order::validate`], never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<OrderField, String>);

impl FormErrors {
    /// Whether every field passes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `field` currently fails.
    #[must_use]
    pub fn contains(&self, field: OrderField) -> bool {
        self.0.contains_key(&field)
    }

    /// The message for `field`, if it fails.
    #[must_use]
    pub fn get(&self, field: OrderField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether none of `fields` fail.
    #[must_use]
    pub fn passes(&self, fields: &[OrderField]) -> bool {
        fields.iter().all(|field| !self.contains(*field))
    }

    /// Messages for `fields` joined with `"; "`, in the order given.
    #[must_use]
    pub fn summary(&self, fields: &[OrderField]) -> String {
        fields
            .iter()
            .filter_map(|field| self.get(*field))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Iterate failing fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (OrderField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// The in-progress checkout record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    pub payment: Option<PaymentMethod>,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Derived from the cart; only recomputed, never typed in.
    pub total: Price,
    /// Cart membership, in the order items were added.
    pub items: Vec<ProductId>,
}

impl Order {
    /// Apply an order-step edit.
    pub fn apply_order_input(&mut self, input: OrderInput) {
        match input {
            OrderInput::Payment(method) => self.payment = method,
            OrderInput::Address(address) => self.address = address,
        }
    }

    /// Apply a contacts-step edit.
    pub fn apply_contacts_input(&mut self, input: ContactsInput) {
        match input {
            ContactsInput::Email(email) => self.email = email,
            ContactsInput::Phone(phone) => self.phone = phone,
        }
    }

    /// Whether `field` satisfies its rule.
    ///
    /// Payment must be chosen; text fields must contain something other
    /// than whitespace.
    #[must_use]
    pub fn field_passes(&self, field: OrderField) -> bool {
        match field {
            OrderField::Payment => self.payment.is_some(),
            OrderField::Address => !self.address.trim().is_empty(),
            OrderField::Email => !self.email.trim().is_empty(),
            OrderField::Phone => !self.phone.trim().is_empty(),
        }
    }

    /// Check every rule and build the error map from scratch.
    #[must_use]
    pub fn validate(&self) -> FormErrors {
        FormErrors(
            OrderField::ORDER_STEP
                .into_iter()
                .chain(OrderField::CONTACTS_STEP)
                .filter(|field| !self.field_passes(*field))
                .map(|field| (field, field.requirement().to_string()))
                .collect(),
        )
    }

    /// Blank every user-editable field and empty the cart.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Body of the order submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub payment: Option<PaymentMethod>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub total: Price,
    pub items: Vec<ProductId>,
}

/// Successful order submission acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderResult {
    pub id: OrderId,
    /// Amount charged, as reported by the backend.
    pub total: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_order() -> Order {
        Order {
            payment: Some(PaymentMethod::Card),
            email: "buyer@example.com".to_string(),
            phone: "+7 900 000 00 00".to_string(),
            address: "123 Main St".to_string(),
            ..Order::default()
        }
    }

    #[test]
    fn test_empty_order_fails_every_rule() {
        let errors = Order::default().validate();
        assert_eq!(errors.len(), 4);
        for field in [
            OrderField::Payment,
            OrderField::Address,
            OrderField::Email,
            OrderField::Phone,
        ] {
            assert_eq!(errors.get(field), Some(field.requirement()));
        }
    }

    #[test]
    fn test_filled_order_passes() {
        assert!(filled_order().validate().is_empty());
    }

    #[test]
    fn test_whitespace_is_empty() {
        let mut order = filled_order();
        order.apply_order_input(OrderInput::Address("   ".to_string()));
        let errors = order.validate();
        assert!(errors.contains(OrderField::Address));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_summary_follows_field_order() {
        let errors = Order::default().validate();
        assert_eq!(
            errors.summary(&OrderField::ORDER_STEP),
            "Select a payment method; Enter a delivery address"
        );
        assert_eq!(
            errors.summary(&OrderField::CONTACTS_STEP),
            "Enter an email; Enter a phone number"
        );
        assert!(!errors.passes(&OrderField::ORDER_STEP));
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_request_wire_format() {
        let request = OrderRequest {
            payment: Some(PaymentMethod::Cash),
            email: "buyer@example.com".to_string(),
            phone: "+71234567890".to_string(),
            address: "Spb Vosstania 1".to_string(),
            total: Price::from_units(2200),
            items: vec![ProductId::new("854cef69")],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["payment"], "cash");
        assert_eq!(value["items"][0], "854cef69");
        assert_eq!(value["total"].as_f64(), Some(2200.0));
    }

    #[test]
    fn test_result_wire_format() {
        let result: OrderResult =
            serde_json::from_str(r#"{"id": "28c57cb4-3002-4445-8aa1-2a06a5055ae5", "total": 2200}"#)
                .unwrap();
        assert_eq!(result.id.as_str(), "28c57cb4-3002-4445-8aa1-2a06a5055ae5");
        assert_eq!(result.total, Price::from_units(2200));
    }

    #[test]
    fn test_clear_blanks_everything() {
        let mut order = filled_order();
        order.items.push(ProductId::new("a"));
        order.total = Price::from_units(10);
        order.clear();
        assert_eq!(order, Order::default());
    }
}
