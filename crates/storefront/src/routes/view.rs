//! Display data shared by every page.
//!
//! Templates only see preformatted strings, numbers and flags.

use chrono::{DateTime, Utc};
use fast_pizza_core::{Cart, CartItem, CurrencyCode, Price, UserProfile};
use rust_decimal::Decimal;
use tower_sessions::Session;

use crate::models::{load_cart, load_user};

/// Format an amount in the display currency, e.g. `€12.00`.
#[must_use]
pub fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).to_string()
}

/// Format a timestamp the way the order page shows it, e.g. `Oct 18, 12:45`.
#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%b %-d, %H:%M").to_string()
}

/// `"1 pizza"` / `"3 pizzas"`.
#[must_use]
pub fn pizza_count(quantity: u32) -> String {
    if quantity == 1 {
        "1 pizza".to_string()
    } else {
        format!("{quantity} pizzas")
    }
}

/// Header and cart overview bar shown on every page.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    /// Visitor's name, empty until they told us.
    pub username: String,
    /// Total pizzas in the cart; the overview bar is hidden at zero.
    pub cart_quantity: u32,
    /// `"3 pizzas"`.
    pub cart_label: String,
    /// Formatted cart total.
    pub cart_total: String,
}

impl PageContext {
    #[must_use]
    pub fn new(user: &UserProfile, cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            username: user.username().unwrap_or_default().to_string(),
            cart_quantity: cart.total_quantity(),
            cart_label: pizza_count(cart.total_quantity()),
            cart_total: format_price(cart.total_price(), currency),
        }
    }

    /// Build the page context straight from the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(
        session: &Session,
        currency: CurrencyCode,
    ) -> Result<Self, tower_sessions::session::Error> {
        let user = load_user(session).await?;
        let cart = load_cart(session).await?;
        Ok(Self::new(&user, &cart, currency))
    }
}

/// One cart line as displayed.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub pizza_id: i32,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
}

impl CartLineView {
    #[must_use]
    pub fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            pizza_id: item.pizza_id.as_i32(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: format_price(item.unit_price, currency),
            total_price: format_price(item.total_price(), currency),
        }
    }
}

/// Only allow redirects back into this site.
///
/// Accepts absolute paths (`/menu`), rejects scheme-relative (`//evil`) and
/// anything else, falling back to `default`.
#[must_use]
pub fn safe_return_to<'a>(requested: Option<&'a str>, default: &'a str) -> &'a str {
    match requested {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => default,
    }
}
