//! Session-stored stores.
//!
//! The cart and the user profile are the visitor's client-side state. They
//! live in the session under fixed keys; a missing entry reads as the empty
//! default. Writes replace the whole value, so concurrent requests from the
//! same visitor resolve last-write-wins.

use fast_pizza_core::{Cart, UserProfile};
use tower_sessions::Session;

/// Session keys for visitor state.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the visitor's name and address lookup.
    pub const USER: &str = "user";
}

/// Load the visitor's cart, empty if none was stored.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Load the visitor's profile, default if none was stored.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_user(session: &Session) -> Result<UserProfile, tower_sessions::session::Error> {
    Ok(session
        .get::<UserProfile>(keys::USER)
        .await?
        .unwrap_or_default())
}

/// Store the visitor's profile.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_user(
    session: &Session,
    user: &UserProfile,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::USER, user).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use fast_pizza_core::{CartItem, PizzaId};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let session = session();
        assert!(load_cart(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_roundtrip() {
        let session = session();
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(PizzaId::new(3), "Diavola", Decimal::from(14)));
        cart.increment_quantity(PizzaId::new(3));

        save_cart(&session, &cart).await.unwrap();
        let loaded = load_cart(&session).await.unwrap();
        assert_eq!(loaded, cart);
        assert_eq!(loaded.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_user_roundtrip() {
        let session = session();
        let mut user = load_user(&session).await.unwrap();
        assert!(user.username().is_none());

        user.set_username("Jonas");
        save_user(&session, &user).await.unwrap();
        assert_eq!(load_user(&session).await.unwrap().username(), Some("Jonas"));
    }
}
