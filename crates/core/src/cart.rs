//! The visitor's cart.
//!
//! A [`Cart`] maps pizza IDs to a line with name, unit price and quantity.
//! Every operation is total: unknown IDs are ignored and quantities never drop
//! below one (a line that would reach zero is removed instead).
//!
//! Lines keep insertion order so the cart page lists pizzas in the order they
//! were added.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::PizzaId;

/// Highest unit price a cart line may carry.
pub const MAX_UNIT_PRICE: u32 = 100_000;

/// Errors reading a cart snapshot.
#[derive(Debug, Error)]
pub enum CartError {
    /// The snapshot is not a JSON array of cart lines.
    #[error("malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A line's unit price is negative or above [`MAX_UNIT_PRICE`].
    #[error("price of pizza {0} is out of range")]
    PriceOutOfRange(PizzaId),
}

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Menu item this line refers to.
    pub pizza_id: PizzaId,
    /// Pizza name at the time it was added.
    pub name: String,
    /// Price of a single pizza.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Number of pizzas, always at least 1 while the line is in a cart.
    pub quantity: u32,
}

impl CartItem {
    /// Create a line for a single pizza.
    #[must_use]
    pub fn new(pizza_id: PizzaId, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            pizza_id,
            name: name.into(),
            unit_price,
            quantity: 1,
        }
    }

    /// Whether the unit price lies within `0..=MAX_UNIT_PRICE`.
    ///
    /// Bounded prices keep every total far below the `Decimal` range.
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.unit_price >= Decimal::ZERO && self.unit_price <= Decimal::from(MAX_UNIT_PRICE)
    }

    /// Price of the whole line (`unit_price × quantity`).
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Client-held collection of pizzas pending order submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from its serialized snapshot (see [`Cart::snapshot`]).
    ///
    /// Lines go through [`Cart::add_item`], so duplicates are merged as if
    /// they had been added one by one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a JSON array of cart lines, or
    /// if a line's price is out of range.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, CartError> {
        let items: Vec<CartItem> = serde_json::from_str(snapshot)?;
        let mut cart = Self::new();
        for item in items {
            if !item.has_valid_price() {
                return Err(CartError::PriceOutOfRange(item.pizza_id));
            }
            cart.add_item(item);
        }
        Ok(cart)
    }

    /// Serialize the cart lines so they can travel with a form submission.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a pizza.
    #[must_use]
    pub fn get(&self, pizza_id: PizzaId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.pizza_id == pizza_id)
    }

    /// Quantity of a pizza in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, pizza_id: PizzaId) -> u32 {
        self.get(pizza_id).map_or(0, |item| item.quantity)
    }

    /// Add a line, or increase the quantity of an existing line for the same pizza.
    ///
    /// A quantity of 0 is treated as 1. Lines priced below zero or above
    /// [`MAX_UNIT_PRICE`] are ignored, so the total is never negative and
    /// never overflows.
    pub fn add_item(&mut self, item: CartItem) {
        if !item.has_valid_price() {
            return;
        }
        let quantity = item.quantity.max(1);
        match self.get_mut(item.pizza_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { quantity, ..item }),
        }
    }

    /// Remove the line for a pizza regardless of its quantity.
    pub fn remove_item(&mut self, pizza_id: PizzaId) {
        self.items.retain(|item| item.pizza_id != pizza_id);
    }

    /// Add one to a line's quantity. No-op for pizzas not in the cart.
    pub fn increment_quantity(&mut self, pizza_id: PizzaId) {
        if let Some(item) = self.get_mut(pizza_id) {
            item.quantity = item.quantity.saturating_add(1);
        }
    }

    /// Subtract one from a line's quantity, removing the line when it reaches zero.
    /// No-op for pizzas not in the cart.
    pub fn decrement_quantity(&mut self, pizza_id: PizzaId) {
        let Some(item) = self.get_mut(pizza_id) else {
            return;
        };
        item.quantity = item.quantity.saturating_sub(1);
        if item.quantity == 0 {
            self.remove_item(pizza_id);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of pizzas across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::total_price).sum()
    }

    fn get_mut(&mut self, pizza_id: PizzaId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.pizza_id == pizza_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn margherita() -> CartItem {
        CartItem::new(PizzaId::new(1), "Margherita", Decimal::from(12))
    }

    fn diavola() -> CartItem {
        CartItem::new(PizzaId::new(2), "Diavola", Decimal::new(1650, 2))
    }

    fn expected_total(cart: &Cart) -> Decimal {
        cart.items()
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum()
    }

    #[test]
    fn test_add_item_inserts_new_line() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(PizzaId::new(1)), 1);
    }

    #[test]
    fn test_add_item_increments_existing_line() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        cart.add_item(margherita());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(PizzaId::new(1)), 2);
    }

    #[test]
    fn test_add_item_zero_quantity_counts_as_one() {
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            quantity: 0,
            ..margherita()
        });
        assert_eq!(cart.quantity_of(PizzaId::new(1)), 1);
    }

    #[test]
    fn test_add_item_ignores_negative_price() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(PizzaId::new(9), "Refund", Decimal::from(-5)));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_add_item_ignores_absurd_price() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(PizzaId::new(9), "Gold leaf", Decimal::MAX));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_item_accepts_free_item() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(PizzaId::new(9), "On the house", Decimal::ZERO));
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_remove_item_regardless_of_quantity() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        cart.increment_quantity(PizzaId::new(1));
        cart.increment_quantity(PizzaId::new(1));
        cart.remove_item(PizzaId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        cart.decrement_quantity(PizzaId::new(1));
        assert!(cart.get(PizzaId::new(1)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        let before = cart.clone();
        cart.decrement_quantity(PizzaId::new(42));
        cart.increment_quantity(PizzaId::new(42));
        cart.remove_item(PizzaId::new(42));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        cart.add_item(diavola());
        cart.increment_quantity(PizzaId::new(2));
        assert_eq!(cart.total_quantity(), 3);
        // 12 + 2 * 16.50
        assert_eq!(cart.total_price(), Decimal::from(45));
    }

    #[test]
    fn test_clear_zeroes_totals() {
        let mut cart = Cart::new();
        cart.add_item(margherita());
        cart.add_item(diavola());
        cart.clear();
        assert_eq!(cart.total_quantity(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_tracks_any_operation_sequence() {
        let mut cart = Cart::new();
        let ids = [1, 2, 3];
        // Deterministic pseudo-random walk over all operations.
        let mut seed: u32 = 17;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = PizzaId::new(ids[(seed as usize >> 8) % ids.len()]);
            match (seed >> 16) % 5 {
                0 => cart.add_item(CartItem::new(
                    id,
                    "Pizza",
                    Decimal::from(id.as_i32()) + Decimal::new(50, 2),
                )),
                1 => cart.remove_item(id),
                2 => cart.increment_quantity(id),
                3 => cart.decrement_quantity(id),
                _ => {
                    if seed % 7 == 0 {
                        cart.clear();
                    }
                }
            }
            assert_eq!(cart.total_price(), expected_total(&cart));
            assert!(cart.total_price() >= Decimal::ZERO);
            assert!(cart.items().iter().all(|i| i.quantity >= 1));
        }
    }

    #[test]
    fn test_snapshot_roundtrip_merges_duplicates() {
        let snapshot = r#"[
            {"pizzaId": 1, "name": "Margherita", "unitPrice": 12, "quantity": 2},
            {"pizzaId": 1, "name": "Margherita", "unitPrice": 12, "quantity": 1},
            {"pizzaId": 2, "name": "Diavola", "unitPrice": 16.5, "quantity": 0}
        ]"#;
        let cart = Cart::from_snapshot(snapshot).unwrap();
        assert_eq!(cart.quantity_of(PizzaId::new(1)), 3);
        assert_eq!(cart.quantity_of(PizzaId::new(2)), 1);

        let again = Cart::from_snapshot(&cart.snapshot().unwrap()).unwrap();
        assert_eq!(again, cart);
    }

    #[test]
    fn test_snapshot_rejects_garbage() {
        assert!(Cart::from_snapshot("not json").is_err());
        assert!(Cart::from_snapshot("{}").is_err());
    }

    #[test]
    fn test_snapshot_rejects_out_of_range_price() {
        let huge = r#"[{"pizzaId":1,"name":"X","unitPrice":50000000000000000000000000000,"quantity":2}]"#;
        assert!(matches!(
            Cart::from_snapshot(huge),
            Err(CartError::PriceOutOfRange(id)) if id == PizzaId::new(1)
        ));

        let negative = r#"[{"pizzaId":4,"name":"Refund","unitPrice":-3,"quantity":1}]"#;
        assert!(matches!(
            Cart::from_snapshot(negative),
            Err(CartError::PriceOutOfRange(_))
        ));
    }

    #[test]
    fn test_largest_cart_total_fits() {
        let mut cart = Cart::new();
        for id in 0..100 {
            cart.add_item(CartItem {
                quantity: u32::MAX,
                ..CartItem::new(PizzaId::new(id), "Max", Decimal::from(MAX_UNIT_PRICE))
            });
        }
        assert!(cart.total_price() > Decimal::ZERO);
    }
}
