//! Menu catalogue items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::PizzaId;

/// A pizza on the menu, as returned by the restaurant API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: PizzaId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sold_out: bool,
}

impl MenuItem {
    /// A single-pizza cart line for this item, or `None` when sold out.
    #[must_use]
    pub fn to_cart_item(&self) -> Option<CartItem> {
        (!self.sold_out).then(|| CartItem::new(self.id, self.name.clone(), self.unit_price))
    }

    /// Ingredients as a comma separated, capitalized list.
    #[must_use]
    pub fn ingredients_line(&self) -> String {
        let line = self.ingredients.join(", ");
        let mut chars = line.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}
