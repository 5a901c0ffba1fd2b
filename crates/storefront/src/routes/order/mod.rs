//! Order route handlers.
//!
//! - `create` - the order form, its submission action and address lookup
//! - `detail` - order status loader, priority action and order search

pub mod create;
pub mod detail;
