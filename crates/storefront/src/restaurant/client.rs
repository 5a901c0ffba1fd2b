//! HTTP implementation of [`RestaurantApi`].

use std::sync::Arc;

use fast_pizza_core::{MenuItem, NewOrder, Order, OrderId};
use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ApiEnvelope, RestaurantApi, RestaurantError, failure_message};
use crate::config::RestaurantApiConfig;

const MENU_CACHE_KEY: &str = "menu";

/// Client for the restaurant REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and menu cache.
#[derive(Clone)]
pub struct RestaurantClient {
    inner: Arc<RestaurantClientInner>,
}

struct RestaurantClientInner {
    client: reqwest::Client,
    base_url: String,
    menu_cache: Option<Cache<&'static str, Arc<Vec<MenuItem>>>>,
}

impl RestaurantClient {
    /// Create a new restaurant API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &RestaurantApiConfig) -> Result<Self, RestaurantError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let menu_cache = (!config.menu_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1)
                .time_to_live(config.menu_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(RestaurantClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                menu_cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Send a request and unwrap the `data` envelope of a success response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RestaurantError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Restaurant API returned non-success status"
            );
            return Err(RestaurantError::from_status(
                status,
                failure_message(status, &body),
            ));
        }

        match serde_json::from_str::<ApiEnvelope<T>>(&body) {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse restaurant API response"
                );
                Err(RestaurantError::Parse(e))
            }
        }
    }
}

impl RestaurantApi for RestaurantClient {
    #[instrument(skip(self))]
    async fn menu(&self) -> Result<Vec<MenuItem>, RestaurantError> {
        if let Some(cache) = &self.inner.menu_cache
            && let Some(menu) = cache.get(MENU_CACHE_KEY).await
        {
            debug!("Cache hit for menu");
            return Ok(menu.as_ref().clone());
        }

        let menu: Vec<MenuItem> = self
            .execute(self.inner.client.get(self.endpoint("menu")))
            .await?;

        if let Some(cache) = &self.inner.menu_cache {
            cache.insert(MENU_CACHE_KEY, Arc::new(menu.clone())).await;
        }

        Ok(menu)
    }

    #[instrument(skip(self, order), fields(lines = order.cart.len(), priority = order.priority))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RestaurantError> {
        let created: Order = self
            .execute(self.inner.client.post(self.endpoint("order")).json(order))
            .await?;
        tracing::info!(order_id = %created.id, "Order created");
        Ok(created)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn order(&self, id: &OrderId) -> Result<Order, RestaurantError> {
        let url = self.endpoint(&format!("order/{}", id.as_str()));
        match self.execute(self.inner.client.get(url)).await {
            Err(RestaurantError::Validation { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(RestaurantError::NotFound(id.clone()))
            }
            other => other,
        }
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn update_order_priority(&self, id: &OrderId) -> Result<(), RestaurantError> {
        let url = self.endpoint(&format!("order/{}/priority", id.as_str()));
        let request = self
            .inner
            .client
            .patch(url)
            .json(&json!({ "priority": true }));

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RestaurantError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let body = response.text().await?;
            tracing::warn!(status = %status, "Priority update rejected");
            return Err(RestaurantError::from_status(
                status,
                failure_message(status, &body),
            ));
        }

        tracing::info!("Order marked as priority");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;

    fn config(base: &str) -> RestaurantApiConfig {
        RestaurantApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
            menu_cache_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_endpoint_appends_path() {
        let client = RestaurantClient::new(&config("https://pizza.example.com/api")).unwrap();
        assert_eq!(
            client.endpoint("order/ABC"),
            "https://pizza.example.com/api/order/ABC"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let client = RestaurantClient::new(&config("https://pizza.example.com/api/")).unwrap();
        assert_eq!(client.endpoint("menu"), "https://pizza.example.com/api/menu");
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let mut cfg = config("https://pizza.example.com/api");
        cfg.menu_cache_ttl = Duration::ZERO;
        let client = RestaurantClient::new(&cfg).unwrap();
        assert!(client.inner.menu_cache.is_none());
    }
}
