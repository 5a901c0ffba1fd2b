//! Application state shared across handlers.

use std::sync::Arc;

use fast_pizza_core::CurrencyCode;

use crate::config::StorefrontConfig;
use crate::geocode::{GeocodeError, GeocodingClient};
use crate::restaurant::{RestaurantClient, RestaurantError};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("restaurant client: {0}")]
    Restaurant(#[from] RestaurantError),
    #[error("geocoding client: {0}")]
    Geocode(#[from] GeocodeError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the upstream API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    restaurant: RestaurantClient,
    geocoder: GeocodingClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let restaurant = RestaurantClient::new(&config.restaurant)?;
        let geocoder = GeocodingClient::new(&config.geocoding)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                restaurant,
                geocoder,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Currency prices are displayed in.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.inner.config.currency
    }

    /// Get a reference to the restaurant API client.
    #[must_use]
    pub fn restaurant(&self) -> &RestaurantClient {
        &self.inner.restaurant
    }

    /// Get a reference to the reverse geocoding client.
    #[must_use]
    pub fn geocoder(&self) -> &GeocodingClient {
        &self.inner.geocoder
    }
}
