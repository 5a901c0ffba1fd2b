//! Address lookup service.
//!
//! The browser reports either coordinates or why it could not get them. We
//! reverse-geocode the coordinates and record the outcome on the visitor's
//! [`AddressResolution`]. Failures are recorded, never returned, so the order
//! form can show them next to the address field.

use fast_pizza_core::{AddressResolution, GeolocationError, Position};
use tracing::instrument;

use crate::geocode::ReverseGeocode;

/// Appended to every lookup failure shown to the visitor.
pub const ADDRESS_HINT: &str = "Make sure to fill in the address field!";

/// Resolves geolocation reports into postal addresses.
pub struct AddressService<'a, G> {
    geocoder: &'a G,
}

impl<'a, G: ReverseGeocode> AddressService<'a, G> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(geocoder: &'a G) -> Self {
        Self { geocoder }
    }

    /// Resolve a geolocation report into an address.
    ///
    /// Leaves `state` ready with position and address on success, or in the
    /// error state with a message on failure. Earlier values survive a
    /// failure. There is no retry.
    #[instrument(skip(self, state))]
    pub async fn fetch_address(
        &self,
        located: Result<Position, GeolocationError>,
        state: &mut AddressResolution,
    ) {
        state.begin();

        let position = match located {
            Ok(position) => position,
            Err(err) => {
                tracing::info!(error = %err, "Browser could not provide a position");
                state.fail(format!("Could not get your position: {err}. {ADDRESS_HINT}"));
                return;
            }
        };

        match self.geocoder.reverse(position).await {
            Ok(address) => {
                tracing::debug!(%address, "Address resolved");
                state.resolve(position, address);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Reverse geocoding failed");
                state.fail(format!(
                    "There was a problem getting your address. {ADDRESS_HINT}"
                ));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use fast_pizza_core::AddressStatus;

    use super::*;
    use crate::geocode::GeocodeError;

    struct FakeGeocoder {
        answer: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        const fn new(answer: Option<&'static str>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ReverseGeocode for FakeGeocoder {
        async fn reverse(&self, _position: Position) -> Result<String, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map(str::to_string)
                .ok_or(GeocodeError::NoAddress)
        }
    }

    fn naples() -> Position {
        Position::new(40.8518, 14.2681).unwrap()
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let geocoder = FakeGeocoder::new(Some("Chiaia, Naples 80121, Italy"));
        let mut state = AddressResolution::new();

        AddressService::new(&geocoder)
            .fetch_address(Ok(naples()), &mut state)
            .await;

        assert_eq!(state.status(), AddressStatus::Ready);
        assert_eq!(state.position(), Some(naples()));
        assert_eq!(state.address(), Some("Chiaia, Naples 80121, Italy"));
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_position_unavailable_skips_geocoding() {
        let geocoder = FakeGeocoder::new(Some("unused"));
        let mut state = AddressResolution::new();

        AddressService::new(&geocoder)
            .fetch_address(Err(GeolocationError::PermissionDenied), &mut state)
            .await;

        assert_eq!(state.status(), AddressStatus::Error);
        assert!(state.error().unwrap().ends_with(ADDRESS_HINT));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_geocoding_failure_keeps_previous_address() {
        let mut state = AddressResolution::new();
        let good = FakeGeocoder::new(Some("Chiaia, Naples 80121, Italy"));
        AddressService::new(&good)
            .fetch_address(Ok(naples()), &mut state)
            .await;

        let broken = FakeGeocoder::new(None);
        let elsewhere = Position::new(41.9, 12.5).unwrap();
        AddressService::new(&broken)
            .fetch_address(Ok(elsewhere), &mut state)
            .await;

        assert_eq!(state.status(), AddressStatus::Error);
        assert_eq!(
            state.error(),
            Some("There was a problem getting your address. Make sure to fill in the address field!")
        );
        assert_eq!(state.position(), Some(naples()));
        assert_eq!(state.address(), Some("Chiaia, Naples 80121, Italy"));
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
    }
}
