//! Request and response bodies as the backend sees them.

#![allow(clippy::unwrap_used)]

use larek_core::{ContactsInput, OrderInput, OrderResult, PaymentMethod, Price, Product, ProductId};
use larek_integration_tests::sample_catalog;
use larek_storefront::events::EventBus;
use larek_storefront::model::AppState;
use serde_json::json;

#[test]
fn test_order_request_body() {
    let state = AppState::new(EventBus::new());
    state.set_catalog(sample_catalog()).unwrap();
    state.add_item(&ProductId::new("a")).unwrap();
    state.add_item(&ProductId::new("b")).unwrap();
    state
        .set_order_field(OrderInput::Payment(Some(PaymentMethod::Cash)))
        .unwrap();
    state
        .set_order_field(OrderInput::Address("Moscow".to_string()))
        .unwrap();
    state
        .set_client_field(ContactsInput::Email("buyer@example.com".to_string()))
        .unwrap();
    state
        .set_client_field(ContactsInput::Phone("+7 900".to_string()))
        .unwrap();

    let body = serde_json::to_value(state.order_request()).unwrap();
    assert_eq!(
        body,
        json!({
            "payment": "cash",
            "email": "buyer@example.com",
            "phone": "+7 900",
            "address": "Moscow",
            "total": 100.0,
            "items": ["a", "b"],
        })
    );
}

#[test]
fn test_backend_product_and_result() {
    let product: Product = serde_json::from_value(json!({
        "id": "c101ab44-ed99-4a54-990d-47aa2bb4e7d9",
        "description": "Лизните этот леденец, чтобы мгновенно запоминать и узнавать всех коллег.",
        "image": "/Shell.svg",
        "title": "HEX-леденец",
        "category": "другое",
        "price": 1450
    }))
    .unwrap();
    assert_eq!(product.price, Some(Price::from_units(1450)));
    assert_eq!(product.category.modifier(), Some("card__category_other"));

    let result: OrderResult = serde_json::from_value(json!({
        "id": "28c57cb4-3002-4445-8aa1-2a06a5055ae5",
        "total": 2200
    }))
    .unwrap();
    assert_eq!(result.total, Price::from_units(2200));
}
