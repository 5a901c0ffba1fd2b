//! Core types for Fast Pizza.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod phone;
pub mod pin;
pub mod status;

pub use id::*;
pub use money::{CurrencyCode, Price};
pub use phone::{PhoneError, PhoneNumber};
pub use pin::{Pin, PinError};
pub use status::*;
