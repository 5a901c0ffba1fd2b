//! Restaurant REST API client.
//!
//! # Endpoints
//!
//! ```text
//! GET   /menu                 - Menu catalogue
//! POST  /order                - Create an order
//! GET   /order/{id}           - Fetch an order
//! PATCH /order/{id}/priority  - Mark an order as priority
//! ```
//!
//! Every response is wrapped as `{"status": "...", "data": ...}`; failures
//! carry a `message` instead of `data`.
//!
//! The menu is cached in-memory via `moka` for `MENU_CACHE_TTL_SECS`. Orders
//! are never cached since their priority flag can change.

mod client;

use std::future::Future;

use fast_pizza_core::{MenuItem, NewOrder, Order, OrderId};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub use client::RestaurantClient;

/// Errors that can occur when talking to the restaurant API.
#[derive(Debug, Error)]
pub enum RestaurantError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// No order exists with this id.
    #[error("Couldn't find order #{0}")]
    NotFound(OrderId),

    /// The API rejected the request (4xx).
    #[error("request rejected ({status}): {message}")]
    Validation { status: StatusCode, message: String },

    /// The API failed to handle the request (5xx).
    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RestaurantError {
    /// Classify a non-success response.
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        if status.is_client_error() {
            Self::Validation { status, message }
        } else {
            Self::Server { status, message }
        }
    }
}

/// Operations the storefront needs from the restaurant.
///
/// Implemented by [`RestaurantClient`] over HTTP; tests substitute an
/// in-memory fake.
pub trait RestaurantApi: Send + Sync {
    /// Fetch the menu catalogue.
    fn menu(&self) -> impl Future<Output = Result<Vec<MenuItem>, RestaurantError>> + Send;

    /// Submit a new order, returning it with its server-assigned id.
    fn create_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RestaurantError>> + Send;

    /// Fetch an order by id.
    fn order(&self, id: &OrderId) -> impl Future<Output = Result<Order, RestaurantError>> + Send;

    /// Mark an order as priority.
    fn update_order_priority(
        &self,
        id: &OrderId,
    ) -> impl Future<Output = Result<(), RestaurantError>> + Send;
}

/// Successful response wrapper.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

/// Failed response body.
#[derive(Debug, Default, Deserialize)]
struct ApiFailure {
    #[serde(default)]
    message: Option<String>,
}

/// Pull a human-readable message out of an error body.
fn failure_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiFailure>(body)
        .ok()
        .and_then(|f| f.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                snippet
            }
        })
}
