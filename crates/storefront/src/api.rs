//! Backend API client.
//!
//! [`ShopApi`] is the seam the storefront talks through; [`LarekClient`] is
//! the HTTP implementation. Product image paths come back relative to the
//! CDN and are resolved here, so the rest of the storefront only sees
//! absolute URLs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use larek_core::{OrderRequest, OrderResult, Product};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

/// Errors from the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Backend operations the storefront needs.
pub trait ShopApi {
    /// Fetch the full catalog.
    fn product_list(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>>;

    /// Place an order.
    fn order_products(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderResult, ApiError>>;
}

/// Paged list envelope.
#[derive(Debug, Deserialize)]
struct ApiList<T> {
    #[allow(dead_code)]
    total: usize,
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

// =============================================================================
// LarekClient
// =============================================================================

/// HTTP client for the Larek backend.
#[derive(Clone)]
pub struct LarekClient {
    inner: Arc<LarekClientInner>,
}

struct LarekClientInner {
    client: reqwest::Client,
    api_url: Url,
    cdn_url: Url,
}

impl LarekClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(LarekClientInner {
                client,
                api_url: config.api_url.clone(),
                cdn_url: config.cdn_url.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        join(&self.inner.api_url, path)
    }

    /// Read a response body, mapping non-success statuses to `ApiError::Api`.
    async fn read<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body, status.canonical_reason());
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

impl ShopApi for LarekClient {
    #[instrument(skip(self))]
    async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("product/"))
            .send()
            .await?;
        let list: ApiList<Product> = Self::read(response).await?;

        debug!(count = list.items.len(), "Fetched catalog");
        Ok(list
            .items
            .into_iter()
            .map(|product| Product {
                image: resolve_image(&self.inner.cdn_url, &product.image),
                ..product
            })
            .collect())
    }

    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    async fn order_products(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("order"))
            .json(order)
            .send()
            .await?;
        let result: OrderResult = Self::read(response).await?;

        debug!(order_id = %result.id, "Order accepted");
        Ok(result)
    }
}

/// Append `path` to `base`, keeping exactly one slash between them.
fn join(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolve a product image path against the CDN. Absolute URLs are kept.
fn resolve_image(cdn: &Url, image: &str) -> String {
    if Url::parse(image).is_ok() {
        return image.to_string();
    }
    join(cdn, image)
}

/// The `error` field of a failure body, or a fallback when there is none.
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| reason.unwrap_or("Unexpected response").to_string(),
        |parsed| parsed.error,
    )
}
