//! Order PIN type.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pin`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// Fewer or more digits than [`Pin::LENGTH`].
    #[error("pin must be exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// Contains something other than ASCII digits.
    #[error("pin must contain only digits")]
    NotNumeric,
}

/// A 4-digit code the customer picks when placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
    /// Number of digits in a PIN.
    pub const LENGTH: usize = 4;

    /// Parse a PIN.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly four ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PinError> {
        let s = s.trim();
        let actual = s.chars().count();
        if actual != Self::LENGTH {
            return Err(PinError::WrongLength {
                expected: Self::LENGTH,
                actual,
            });
        }
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PinError::NotNumeric);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the PIN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
