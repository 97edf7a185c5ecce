//! Property tests for cart membership, totals and validation.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use larek_core::{ContactsInput, OrderField, OrderInput, PaymentMethod, Price, ProductId};
use larek_integration_tests::product;
use larek_storefront::events::EventBus;
use larek_storefront::model::AppState;
use proptest::prelude::*;
use proptest::test_runner::Config;

const IDS: [&str; 6] = ["a", "b", "c", "d", "e", "gone"];

#[derive(Debug, Clone)]
enum CartOp {
    Add(usize),
    Remove(usize),
    Clear,
}

fn cart_op() -> impl Strategy<Value = CartOp> {
    prop_oneof![
        4 => (0..IDS.len()).prop_map(CartOp::Add),
        2 => (0..IDS.len()).prop_map(CartOp::Remove),
        1 => Just(CartOp::Clear),
    ]
}

/// `a`..`e` are in the catalog with the given prices; `gone` is not.
fn catalog_state(prices: &[Option<i64>]) -> AppState {
    let state = AppState::new(EventBus::new());
    let catalog = IDS
        .iter()
        .take(5)
        .zip(prices)
        .map(|(id, price)| product(id, *price))
        .collect();
    state.set_catalog(catalog).unwrap();
    state
}

fn price_strategy() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(0_i64..50_000), 5)
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn membership_matches_added_minus_removed(
        prices in price_strategy(),
        ops in prop::collection::vec(cart_op(), 0..40)
    ) {
        let state = catalog_state(&prices);
        let mut expected: Vec<&str> = Vec::new();

        for op in &ops {
            match op {
                CartOp::Add(i) => {
                    state.add_item(&ProductId::new(IDS[*i])).unwrap();
                    if !expected.contains(&IDS[*i]) {
                        expected.push(IDS[*i]);
                    }
                }
                CartOp::Remove(i) => {
                    state.remove_item(&ProductId::new(IDS[*i])).unwrap();
                    expected.retain(|id| *id != IDS[*i]);
                }
                CartOp::Clear => {
                    state.clear_cart().unwrap();
                    prop_assert!(state.items().is_empty());
                    expected.clear();
                }
            }
        }

        let actual: Vec<ProductId> = state.items();
        let expected: Vec<ProductId> = expected.into_iter().map(ProductId::new).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn total_is_sum_of_resolved_prices(
        prices in price_strategy(),
        picks in prop::collection::btree_set(0..IDS.len(), 0..IDS.len())
    ) {
        let state = catalog_state(&prices);
        for i in &picks {
            state.add_item(&ProductId::new(IDS[*i])).unwrap();
        }

        let expected: Price = picks
            .iter()
            .filter_map(|i| prices.get(*i).copied().flatten())
            .map(Price::from_units)
            .sum();
        prop_assert_eq!(state.recompute_total(), expected);
        prop_assert_eq!(state.order().total, expected);

        let resolved: BTreeSet<usize> = picks.iter().copied().filter(|i| *i < 5).collect();
        prop_assert_eq!(state.cart_lines().len(), resolved.len());
    }

    #[test]
    fn validation_is_a_pure_function_of_fields(
        payment in prop::option::of(prop_oneof![
            Just(PaymentMethod::Card),
            Just(PaymentMethod::Cash),
        ]),
        address in "[ a-z]{0,6}",
        email in "[ a-z@.]{0,6}",
        phone in "[ 0-9+]{0,6}"
    ) {
        let state = AppState::new(EventBus::new());
        state.set_order_field(OrderInput::Payment(payment)).unwrap();
        state.set_order_field(OrderInput::Address(address.clone())).unwrap();
        state.set_client_field(ContactsInput::Email(email.clone())).unwrap();
        let valid = state.set_client_field(ContactsInput::Phone(phone.clone())).unwrap();

        let first = state.form_errors();
        prop_assert_eq!(state.validate_order().unwrap(), valid);
        prop_assert_eq!(&state.form_errors(), &first);

        let checks = [
            (OrderField::Payment, payment.is_some()),
            (OrderField::Address, !address.trim().is_empty()),
            (OrderField::Email, !email.trim().is_empty()),
            (OrderField::Phone, !phone.trim().is_empty()),
        ];
        for (field, passes) in checks {
            prop_assert_eq!(first.contains(field), !passes);
        }
        prop_assert_eq!(valid, first.is_empty());
    }
}
