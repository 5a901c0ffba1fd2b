//! Address resolution lifecycle.
//!
//! Resolving an address is two steps: the browser reports the visitor's
//! coordinates, then a geocoding service turns them into a postal address.
//! [`AddressResolution`] tracks where that process stands. A failure keeps
//! whatever position and address were resolved before.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::Position;
use crate::types::AddressStatus;

/// Why the browser could not report a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("permission to access your location was denied")]
    PermissionDenied,
    #[error("your position is unavailable: {0}")]
    Unavailable(String),
    #[error("locating you took too long")]
    Timeout,
}

impl GeolocationError {
    /// Map a browser `GeolocationPositionError` code and message.
    #[must_use]
    pub fn from_browser(code: Option<u16>, message: &str) -> Self {
        match code {
            Some(1) => Self::PermissionDenied,
            Some(3) => Self::Timeout,
            _ if message.trim().is_empty() => Self::Unavailable("no coordinates".to_string()),
            _ => Self::Unavailable(message.trim().to_string()),
        }
    }
}

/// State of the visitor's address lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressResolution {
    status: AddressStatus,
    position: Option<Position>,
    address: Option<String>,
    error: Option<String>,
}

impl AddressResolution {
    /// A lookup that has not started.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a lookup as in flight.
    pub fn begin(&mut self) {
        self.status = AddressStatus::Loading;
        self.error = None;
    }

    /// Record a successful lookup.
    pub fn resolve(&mut self, position: Position, address: impl Into<String>) {
        self.status = AddressStatus::Ready;
        self.position = Some(position);
        self.address = Some(address.into());
        self.error = None;
    }

    /// Record a failed lookup, keeping any previously resolved values.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = AddressStatus::Error;
        self.error = Some(message.into());
    }

    #[must_use]
    pub const fn status(&self) -> AddressStatus {
        self.status
    }

    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == AddressStatus::Loading
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn naples() -> Position {
        Position::new(40.8518, 14.2681).unwrap()
    }

    #[test]
    fn test_starts_idle() {
        let state = AddressResolution::new();
        assert_eq!(state.status(), AddressStatus::Idle);
        assert!(state.position().is_none());
        assert!(state.address().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_successful_lookup() {
        let mut state = AddressResolution::new();
        state.begin();
        assert!(state.is_loading());

        state.resolve(naples(), "Naples, 80100, Italy");
        assert_eq!(state.status(), AddressStatus::Ready);
        assert_eq!(state.position(), Some(naples()));
        assert_eq!(state.address(), Some("Naples, 80100, Italy"));
    }

    #[test]
    fn test_failure_keeps_previous_values() {
        let mut state = AddressResolution::new();
        state.begin();
        state.resolve(naples(), "Naples, 80100, Italy");

        state.begin();
        state.fail("geocoding failed");
        assert_eq!(state.status(), AddressStatus::Error);
        assert_eq!(state.error(), Some("geocoding failed"));
        assert_eq!(state.position(), Some(naples()));
        assert_eq!(state.address(), Some("Naples, 80100, Italy"));
    }

    #[test]
    fn test_retry_after_failure_clears_error() {
        let mut state = AddressResolution::new();
        state.begin();
        state.fail("denied");
        state.begin();
        assert!(state.error().is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn test_browser_error_codes() {
        assert_eq!(
            GeolocationError::from_browser(Some(1), "User denied Geolocation"),
            GeolocationError::PermissionDenied
        );
        assert_eq!(
            GeolocationError::from_browser(Some(3), ""),
            GeolocationError::Timeout
        );
        assert_eq!(
            GeolocationError::from_browser(Some(2), "no fix"),
            GeolocationError::Unavailable("no fix".to_string())
        );
        assert_eq!(
            GeolocationError::from_browser(None, " "),
            GeolocationError::Unavailable("no coordinates".to_string())
        );
    }
}
