//! Business logic services for storefront.
//!
//! # Services
//!
//! - `ordering` - Order placement and priority upgrades
//! - `address` - Geolocation report to postal address
//!
//! Services borrow their collaborators and take the visitor's state
//! explicitly, so handlers decide what gets loaded from and saved to the
//! session.

pub mod address;
pub mod ordering;

pub use address::{ADDRESS_HINT, AddressService};
pub use ordering::{CreateOrderOutcome, OrderingService};
