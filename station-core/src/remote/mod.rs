//! Remote catalog/order service boundary
//!
//! The engine talks to the remote store through the two gateway traits so
//! every consumer is testable without a network; [`RemoteClient`] is the
//! reqwest implementation used in production wiring.
//!
//! Error mapping: transport failures become `RemoteUnavailable` (read
//! paths fall back to cached data), non-success responses become
//! `RemoteRejected` (surfaced to the initiator, never retried here).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{OrderRecord, OrderSubmission, Product};
use shared::{AppError, AppResult};

/// Remote product catalog operations
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch the authoritative product set
    async fn fetch_products(&self) -> AppResult<Vec<Product>>;

    /// Delete a product by its `(name, price)` catalog key
    async fn remove_product(&self, name: &str, price: i64) -> AppResult<()>;
}

/// Remote order store operations
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Fetch the authoritative order list
    async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>>;

    /// Create an order; success means the write is durably accepted
    async fn submit_order(&self, order: &OrderSubmission) -> AppResult<()>;

    /// Delete an order by id
    async fn remove_order(&self, id: &str) -> AppResult<()>;
}

/// HTTP client for the remote catalog/order service
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| AppError::remote_unavailable(e.to_string()))?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body, discarding the response body
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> AppResult<()> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::remote_unavailable(e.to_string()))?;
        Self::check_status(response).await
    }

    /// Make a DELETE request, optionally with a JSON body
    async fn delete<B: Serialize>(&self, path: &str, body: Option<&B>) -> AppResult<()> {
        let mut request = self.client.delete(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AppError::remote_unavailable(e.to_string()))?;
        Self::check_status(response).await
    }

    /// Decode a successful JSON response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::remote_rejected(format!("HTTP {status}: {text}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::remote_rejected(format!("Invalid response body: {e}")))
    }

    /// Check a write response status without decoding a body
    async fn check_status(response: reqwest::Response) -> AppResult<()> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::remote_rejected(format!("HTTP {status}: {text}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for RemoteClient {
    async fn fetch_products(&self) -> AppResult<Vec<Product>> {
        self.get("/products").await
    }

    async fn remove_product(&self, name: &str, price: i64) -> AppResult<()> {
        #[derive(Serialize)]
        struct RemoveProductRequest<'a> {
            name: &'a str,
            price: i64,
        }

        self.delete("/products", Some(&RemoveProductRequest { name, price }))
            .await
    }
}

#[async_trait]
impl OrderGateway for RemoteClient {
    async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>> {
        self.get("/orders").await
    }

    async fn submit_order(&self, order: &OrderSubmission) -> AppResult<()> {
        self.post("/orders", order).await
    }

    async fn remove_order(&self, id: &str) -> AppResult<()> {
        self.delete::<()>(&format!("/orders/{id}"), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = RemoteClient::new("http://localhost:5000/", 5);
        assert_eq!(client.url("/products"), "http://localhost:5000/products");
        assert_eq!(client.url("orders/42"), "http://localhost:5000/orders/42");
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_remote_unavailable() {
        // Reserved TEST-NET address; nothing listens there.
        let client = RemoteClient::new("http://192.0.2.1:9", 1);
        let err = client.fetch_products().await.unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable { .. }), "got {err:?}");
    }
}
