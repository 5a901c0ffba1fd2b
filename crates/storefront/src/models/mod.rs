//! Per-visitor state kept in the session.

pub mod session;

pub use session::{keys as session_keys, load_cart, load_user, save_cart, save_user};
