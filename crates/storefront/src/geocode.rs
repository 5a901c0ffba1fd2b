//! Reverse geocoding: coordinates to a postal address.

use std::future::Future;
use std::sync::Arc;

use fast_pizza_core::Position;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::GeocodingConfig;

/// Errors from the reverse geocoding service.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding service returned {0}")]
    Status(StatusCode),

    #[error("geocoding response was malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no address found for these coordinates")]
    NoAddress,
}

/// Turns coordinates into a single-line postal address.
pub trait ReverseGeocode: Send + Sync {
    fn reverse(&self, position: Position)
    -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

/// Fields of interest in a reverse geocoding response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country_name: String,
}

/// Format as `"{locality}, {city} {postcode}, {country}"`, skipping blank
/// parts. Returns `None` when every part is blank.
#[must_use]
pub fn format_address(response: &GeocodeResponse) -> Option<String> {
    let city_line = [response.city.trim(), response.postcode.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let parts: Vec<&str> = [
        response.locality.trim(),
        city_line.as_str(),
        response.country_name.trim(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// HTTP reverse geocoding client.
#[derive(Clone)]
pub struct GeocodingClient {
    inner: Arc<GeocodingClientInner>,
}

struct GeocodingClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl GeocodingClient {
    /// Create a new geocoding client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(GeocodingClientInner {
                client,
                endpoint: config.endpoint.clone(),
            }),
        })
    }
}

impl ReverseGeocode for GeocodingClient {
    #[instrument(skip(self, position), fields(position = %position))]
    async fn reverse(&self, position: Position) -> Result<String, GeocodeError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .query(&[
                ("latitude", position.latitude),
                ("longitude", position.longitude),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Reverse geocoding failed");
            return Err(GeocodeError::Status(status));
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse = serde_json::from_str(&body)?;
        format_address(&parsed).ok_or(GeocodeError::NoAddress)
    }
}
