//! Fast Pizza Core - Shared domain types.
//!
//! This crate provides the types and pure state logic used by the storefront:
//! - [`cart`] - The visitor's cart store and its derived totals
//! - [`menu`] - Menu catalogue items
//! - [`order`] - Orders, order submissions, and delivery estimates
//! - [`address`] - The address resolution lifecycle
//! - [`user`] - The visitor's profile (name and address)
//! - [`validation`] - Order form validation
//!
//! # Architecture
//!
//! The core crate contains only types and state transitions - no I/O, no HTTP
//! clients, no sessions. Everything here is a total function over in-memory
//! state so it can be tested in isolation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod menu;
pub mod order;
pub mod types;
pub mod user;
pub mod validation;

pub use address::{AddressResolution, GeolocationError};
pub use cart::{Cart, CartError, CartItem};
pub use menu::MenuItem;
pub use order::{NewOrder, Order, OrderLine, OrderSubmission, Position, SubmissionError};
pub use types::*;
pub use user::UserProfile;
pub use validation::{Field, FieldErrors};
