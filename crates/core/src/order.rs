//! Orders and order submissions.
//!
//! - [`OrderSubmission`] is the raw order form as posted by the browser.
//! - [`NewOrder`] is the validated payload sent to the restaurant API.
//! - [`Order`] is what the restaurant API returns. Its cart is a snapshot taken
//!   at submission time; only the priority flag changes afterwards, and only on
//!   the server.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, CartError, CartItem};
use crate::types::{OrderId, OrderStatus, PhoneNumber, Pin, PizzaId};
use crate::validation::{FieldErrors, check_order_fields};

/// Priority orders cost an extra 20% of the pizza price.
pub const PRIORITY_FEE_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Fee charged for giving an order priority.
#[must_use]
pub fn priority_fee(pizza_price: Decimal) -> Decimal {
    (pizza_price * PRIORITY_FEE_RATE).round_dp(2)
}

/// Amount to pay for a cart, with or without priority.
#[must_use]
pub fn order_total(pizza_price: Decimal, priority: bool) -> Decimal {
    if priority {
        pizza_price + priority_fee(pizza_price)
    } else {
        pizza_price
    }
}

// =============================================================================
// Position
// =============================================================================

/// Errors parsing a `"lat, long"` position string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionParseError {
    #[error("expected \"latitude, longitude\"")]
    MissingSeparator,
    #[error("invalid coordinate: {0}")]
    InvalidNumber(String),
    #[error("coordinates out of range")]
    OutOfRange,
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Create a position, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns `PositionParseError::OutOfRange` when latitude is outside
    /// ±90 or longitude outside ±180.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PositionParseError> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !in_range {
            return Err(PositionParseError::OutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, long) = s
            .split_once(',')
            .ok_or(PositionParseError::MissingSeparator)?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| PositionParseError::InvalidNumber(part.trim().to_owned()))
        };
        Self::new(parse(lat)?, parse(long)?)
    }
}

/// Serde adapter: position travels as a `"lat, long"` string, empty when unknown.
mod position_text {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Position;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        position: &Option<Position>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match position {
            Some(position) => serializer.collect_str(position),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Position>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// Order lines
// =============================================================================

/// A cart line as stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub pizza_id: PizzaId,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            pizza_id: item.pizza_id,
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price(),
        }
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Errors turning a submission into a [`NewOrder`].
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// User-entered fields failed validation.
    #[error("{0}")]
    Invalid(FieldErrors),

    /// The hidden cart snapshot could not be read.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// The hidden position field could not be read.
    #[error("malformed position: {0}")]
    Position(#[from] PositionParseError),
}

/// The order form as submitted by the browser.
///
/// `cart` is the serialized cart snapshot, `position` the `"lat, long"` string
/// filled in when the address was looked up, and `priority` is present only
/// when the checkbox was ticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSubmission {
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub cart: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub pin: String,
    #[serde(default)]
    pub position: String,
}

impl OrderSubmission {
    /// Whether the priority checkbox was ticked.
    #[must_use]
    pub fn wants_priority(&self) -> bool {
        matches!(
            self.priority.as_deref().map(str::trim),
            Some("true" | "on" | "1")
        )
    }

    /// Validate the user-entered fields.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        check_order_fields(&self.customer, &self.phone, &self.address, &self.pin)
    }

    /// Build the order payload, stamping it with the time it was placed.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Invalid` when validation fails, or an error
    /// for a malformed cart snapshot or position.
    pub fn into_new_order(self, time_ordered: DateTime<Utc>) -> Result<NewOrder, SubmissionError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SubmissionError::Invalid(errors));
        }

        let priority = self.wants_priority();
        let phone = PhoneNumber::parse(&self.phone).map_err(|_| invalid_phone())?;
        let pin = Pin::parse(&self.pin).map_err(|_| invalid_pin())?;
        let cart = Cart::from_snapshot(&self.cart)?;
        let position = match self.position.trim() {
            "" => None,
            text => Some(text.parse::<Position>()?),
        };

        Ok(NewOrder {
            customer: self.customer.trim().to_owned(),
            phone,
            address: self.address.trim().to_owned(),
            position,
            cart: cart.items().iter().map(OrderLine::from).collect(),
            priority,
            pin,
            time_ordered,
        })
    }
}

fn invalid_phone() -> SubmissionError {
    let mut errors = FieldErrors::new();
    errors.insert(crate::validation::Field::Phone, crate::validation::PHONE_INVALID);
    SubmissionError::Invalid(errors)
}

fn invalid_pin() -> SubmissionError {
    let mut errors = FieldErrors::new();
    errors.insert(crate::validation::Field::Pin, crate::validation::PIN_INVALID);
    SubmissionError::Invalid(errors)
}

/// Validated order payload for the restaurant API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: String,
    pub phone: PhoneNumber,
    pub address: String,
    #[serde(default, with = "position_text")]
    pub position: Option<Position>,
    pub cart: Vec<OrderLine>,
    pub priority: bool,
    pub pin: Pin,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time_ordered: DateTime<Utc>,
}

impl NewOrder {
    /// Sum of the line totals.
    #[must_use]
    pub fn pizza_price(&self) -> Decimal {
        self.cart.iter().map(|line| line.total_price).sum()
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order as stored by the restaurant API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(alias = "customerName")]
    pub customer: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, with = "position_text")]
    pub position: Option<Position>,
    #[serde(default)]
    pub cart: Vec<OrderLine>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub order_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub priority_price: Option<Decimal>,
}

impl Order {
    /// Price of the pizzas, as reported by the API or summed from the snapshot.
    #[must_use]
    pub fn pizza_price(&self) -> Decimal {
        self.order_price
            .unwrap_or_else(|| self.cart.iter().map(|line| line.total_price).sum())
    }

    /// Priority surcharge, zero for regular orders.
    #[must_use]
    pub fn priority_price(&self) -> Decimal {
        if !self.priority {
            return Decimal::ZERO;
        }
        self.priority_price
            .filter(|price| !price.is_zero())
            .unwrap_or_else(|| priority_fee(self.pizza_price()))
    }

    /// Total to pay on delivery.
    #[must_use]
    pub fn amount_due(&self) -> Decimal {
        self.pizza_price() + self.priority_price()
    }

    /// Minutes until the estimated delivery, rounded to the nearest minute.
    /// Negative once the estimate has passed.
    #[must_use]
    pub fn minutes_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.estimated_delivery
            .map(|eta| (eta - now).num_seconds())
            .map(|seconds| (seconds + 30).div_euclid(60))
    }

    /// Whether the estimated delivery time has passed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.minutes_left(now).is_some_and(|minutes| minutes < 0)
    }
}
