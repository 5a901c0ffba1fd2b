//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create numeric ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Order IDs are assigned
//! by the restaurant API as opaque strings and get their own type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use fast_pizza_core::define_id;
/// define_id!(ToppingId);
/// define_id!(StoreId);
///
/// let topping = ToppingId::new(1);
/// let store = StoreId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ToppingId = store;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(PizzaId);

/// Identifier of an order, assigned by the restaurant API.
///
/// Order IDs end up in request paths both here and upstream, so parsing only
/// accepts ASCII alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Maximum accepted length of an order ID.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an order ID, trimming surrounding whitespace and a leading `#`.
    ///
    /// Returns `None` for empty, oversized, or non-alphanumeric input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim().trim_start_matches('#');
        let valid = !trimmed.is_empty()
            && trimmed.len() <= Self::MAX_LENGTH
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(trimmed.to_owned()))
    }

    /// Returns the order ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pizza_id_roundtrip() {
        let id = PizzaId::new(7);
        assert_eq!(id.as_i32(), 7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn test_order_id_parse_valid() {
        assert_eq!(OrderId::parse("IIDSAT").unwrap().as_str(), "IIDSAT");
        assert_eq!(OrderId::parse("  #CQE92U ").unwrap().as_str(), "CQE92U");
        assert!(OrderId::parse("order_12-a").is_some());
    }

    #[test]
    fn test_order_id_parse_rejects_paths() {
        assert!(OrderId::parse("").is_none());
        assert!(OrderId::parse("   ").is_none());
        assert!(OrderId::parse("../menu").is_none());
        assert!(OrderId::parse("abc/def").is_none());
        assert!(OrderId::parse(&"A".repeat(65)).is_none());
    }

    #[test]
    fn test_order_id_serializes_as_string() {
        let id = OrderId::parse("ABC123").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ABC123\"");
        assert_eq!(format!("{id}"), "ABC123");
    }
}
