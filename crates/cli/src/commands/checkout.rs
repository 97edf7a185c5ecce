//! Place an order by driving the storefront the way a shopper would.

use larek_core::{PaymentMethod, ProductId};
use larek_storefront::api::ShopApi;
use larek_storefront::config::StorefrontConfig;
use larek_storefront::{CheckoutStep, Storefront};
use tracing::info;

use super::CommandError;

/// What to order and where to send it.
#[derive(Debug, Clone)]
pub struct CheckoutArgs {
    pub items: Vec<String>,
    pub payment: PaymentMethod,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// Fill the basket, complete both checkout steps and submit.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, a product cannot be
/// added, a step does not validate, or the backend rejects the order.
#[allow(clippy::print_stdout)]
pub async fn place(
    config: &StorefrontConfig,
    args: &CheckoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::session(config).await?;
    drive(&store, args).await?;
    println!("{}", store.success().description());
    Ok(())
}

/// Click through a loaded storefront until the success view shows.
async fn drive<A: ShopApi + 'static>(
    store: &Storefront<A>,
    args: &CheckoutArgs,
) -> Result<(), CommandError> {
    for item in &args.items {
        add_to_basket(store, &ProductId::new(item.as_str()))?;
    }

    store.page().basket_button().click();
    let checkout = store
        .basket()
        .button()
        .ok_or_else(|| CommandError::Checkout("basket has no checkout button".to_string()))?;
    if checkout.is_disabled() {
        return Err(CommandError::Checkout("basket is empty".to_string()));
    }
    checkout.click();

    let order = store.order_form();
    if let Some(button) = order.payment_button(args.payment) {
        button.click();
    }
    order.address().input(&args.address);
    order.form().submit_button().click();
    expect_step(store, CheckoutStep::ContactsOpen, || order.form().errors())?;

    let contacts = store.contacts_form();
    contacts.email().input(&args.email);
    contacts.phone().input(&args.phone);
    contacts.form().submit_button().click();
    expect_step(store, CheckoutStep::Submitting, || contacts.form().errors())?;

    info!(items = args.items.len(), "Order submitted");
    store.settle().await;
    expect_step(store, CheckoutStep::SuccessShown, || contacts.form().errors())
}

fn add_to_basket<A: ShopApi + 'static>(
    store: &Storefront<A>,
    id: &ProductId,
) -> Result<(), CommandError> {
    let card = store
        .catalog_card(id)
        .ok_or_else(|| CommandError::UnknownProduct(id.to_string()))?;
    card.click();

    let button = store
        .modal()
        .content()
        .and_then(|preview| preview.query(".card__button"))
        .ok_or_else(|| CommandError::Checkout("preview has no action button".to_string()))?;
    if button.is_disabled() {
        store.modal().close();
        return Err(CommandError::Priceless(id.to_string()));
    }
    if store.state().contains(id) {
        // Already in the basket; the button would take it out.
        store.modal().close();
        return Ok(());
    }
    button.click();
    Ok(())
}

fn expect_step<A: ShopApi + 'static>(
    store: &Storefront<A>,
    expected: CheckoutStep,
    errors: impl FnOnce() -> String,
) -> Result<(), CommandError> {
    if store.step() == expected {
        Ok(())
    } else {
        Err(CommandError::Checkout(errors()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use larek_core::{Category, OrderId, OrderRequest, OrderResult, Price, Product};
    use larek_storefront::api::ApiError;
    use larek_storefront::templates::standard_document;
    use tokio::task::LocalSet;

    use super::*;

    #[derive(Default)]
    struct StubApi {
        reject: bool,
        orders: RefCell<Vec<OrderRequest>>,
    }

    impl ShopApi for StubApi {
        async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
            Ok(vec![
                Product {
                    id: ProductId::new("a"),
                    title: "Framework".to_string(),
                    category: Category::new("хард-скил"),
                    description: String::new(),
                    price: Some(Price::from_units(1450)),
                    image: "https://cdn.example/a.svg".to_string(),
                },
                Product {
                    id: ProductId::new("b"),
                    title: "Mascot".to_string(),
                    category: Category::new("другое"),
                    description: String::new(),
                    price: None,
                    image: "https://cdn.example/b.svg".to_string(),
                },
            ])
        }

        async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
            self.orders.borrow_mut().push(order.clone());
            if self.reject {
                return Err(ApiError::Api {
                    status: 400,
                    message: "Wrong total".to_string(),
                });
            }
            Ok(OrderResult {
                id: OrderId::new("o-1"),
                total: order.total,
            })
        }
    }

    fn args(items: &[&str]) -> CheckoutArgs {
        CheckoutArgs {
            items: items.iter().map(ToString::to_string).collect(),
            payment: PaymentMethod::Cash,
            address: "Moscow".to_string(),
            email: "buyer@example.com".to_string(),
            phone: "+7 900 000 00 00".to_string(),
        }
    }

    async fn loaded(api: StubApi) -> Storefront<StubApi> {
        let store = Storefront::new(standard_document(), api).unwrap();
        store.start();
        store.settle().await;
        store
    }

    #[tokio::test]
    async fn test_drive_places_order() {
        LocalSet::new()
            .run_until(async {
                let store = loaded(StubApi::default()).await;
                drive(&store, &args(&["a", "a"])).await.unwrap();
                assert_eq!(store.success().description(), "Charged 1 450 synapses");
            })
            .await;
    }

    #[tokio::test]
    async fn test_unknown_and_priceless_products() {
        LocalSet::new()
            .run_until(async {
                let store = loaded(StubApi::default()).await;
                let err = drive(&store, &args(&["zzz"])).await.unwrap_err();
                assert!(matches!(err, CommandError::UnknownProduct(id) if id == "zzz"));

                let err = drive(&store, &args(&["b"])).await.unwrap_err();
                assert!(matches!(err, CommandError::Priceless(id) if id == "b"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_rejected_order_reports_message() {
        LocalSet::new()
            .run_until(async {
                let store = loaded(StubApi {
                    reject: true,
                    ..StubApi::default()
                })
                .await;
                let err = drive(&store, &args(&["a"])).await.unwrap_err();
                assert!(err.to_string().contains("Wrong total"));
                assert_eq!(store.step(), CheckoutStep::ContactsOpen);
            })
            .await;
    }
}
