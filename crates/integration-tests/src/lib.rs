//! Integration tests for Larek.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p larek-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - End-to-end storefront sessions against [`FakeApi`]
//! - `cart_properties` - Property tests for cart membership and totals
//! - `wire_format` - Request and response bodies as the backend sees them
//!
//! Storefront sessions spawn local tasks, so every async test runs inside
//! [`run_local`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;

use larek_core::{Category, OrderId, OrderRequest, OrderResult, Price, Product, ProductId};
use larek_storefront::Storefront;
use larek_storefront::api::{ApiError, ShopApi};
use larek_storefront::templates::standard_document;

/// Scripted reply to an order submission.
#[derive(Debug, Clone)]
pub enum OrderReply {
    /// Accept and report this total.
    Accept(Price),
    /// Accept and echo the requested total.
    Echo,
    /// Reject with this message.
    Reject(String),
}

/// In-memory backend.
///
/// Serves a fixed catalog and records every order request. Each submission
/// consumes the next scripted reply; with none left it echoes the total.
#[derive(Debug, Default)]
pub struct FakeApi {
    catalog: Vec<Product>,
    catalog_failures: RefCell<usize>,
    replies: RefCell<VecDeque<OrderReply>>,
    orders: RefCell<Vec<OrderRequest>>,
}

impl FakeApi {
    #[must_use]
    pub fn with_catalog(catalog: Vec<Product>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Fail the next `count` catalog fetches.
    #[must_use]
    pub fn failing_catalog(self, count: usize) -> Self {
        *self.catalog_failures.borrow_mut() = count;
        self
    }

    /// Queue a reply for the next submission.
    #[must_use]
    pub fn reply(self, reply: OrderReply) -> Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    /// Every order request received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.borrow().clone()
    }
}

impl ShopApi for FakeApi {
    async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
        tokio::task::yield_now().await;
        let fail = {
            let mut remaining = self.catalog_failures.borrow_mut();
            let fail = *remaining > 0;
            *remaining = remaining.saturating_sub(1);
            fail
        };
        if fail {
            return Err(ApiError::Api {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(self.catalog.clone())
    }

    async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
        self.orders.borrow_mut().push(order.clone());
        tokio::task::yield_now().await;

        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(OrderReply::Echo);
        let id = OrderId::new(format!("order-{}", self.orders.borrow().len()));
        match reply {
            OrderReply::Accept(total) => Ok(OrderResult { id, total }),
            OrderReply::Echo => Ok(OrderResult {
                id,
                total: order.total,
            }),
            OrderReply::Reject(message) => Err(ApiError::Api {
                status: 400,
                message,
            }),
        }
    }
}

/// A catalog product with a predictable title and image.
#[must_use]
pub fn product(id: &str, price: Option<i64>) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        category: Category::new("софт-скил"),
        description: format!("Everything about {id}"),
        price: price.map(Price::from_units),
        image: format!("https://cdn.example/{id}.svg"),
    }
}

/// The two-product catalog used throughout: `a` costs 100, `b` is priceless.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    vec![product("a", Some(100)), product("b", None)]
}

/// Run `future` on a `LocalSet` so storefront tasks can be spawned.
pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// A storefront over the stock document whose catalog has finished loading.
///
/// # Panics
///
/// Panics if the stock document cannot be turned into views.
#[allow(clippy::expect_used)]
pub async fn loaded_storefront(api: FakeApi) -> Storefront<FakeApi> {
    let store = Storefront::new(standard_document(), api).expect("stock document builds");
    store.start();
    store.settle().await;
    store
}
