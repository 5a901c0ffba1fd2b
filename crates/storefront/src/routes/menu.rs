//! Menu route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use fast_pizza_core::{Cart, CurrencyCode, MenuItem};
use tower_sessions::Session;
use tracing::instrument;

use super::view::{PageContext, format_price};
use crate::error::Result;
use crate::models::{load_cart, load_user};
use crate::restaurant::RestaurantApi;
use crate::state::AppState;

/// Menu entry display data for templates.
#[derive(Clone, Debug)]
pub struct MenuItemView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub ingredients: String,
    pub image_url: String,
    pub sold_out: bool,
    /// How many of this pizza are already in the cart.
    pub in_cart: u32,
}

impl MenuItemView {
    #[must_use]
    pub fn new(item: &MenuItem, cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            price: format_price(item.unit_price, currency),
            ingredients: item.ingredients_line(),
            image_url: item.image_url.clone().unwrap_or_default(),
            sold_out: item.sold_out,
            in_cart: cart.quantity_of(item.id),
        }
    }
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub page: PageContext,
    pub items: Vec<MenuItemView>,
}

/// Display the menu.
///
/// Loader: fetches the catalogue before rendering. A failing restaurant API
/// renders the error page.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<MenuTemplate> {
    let menu = state.restaurant().menu().await?;
    let cart = load_cart(&session).await?;
    let user = load_user(&session).await?;
    let currency = state.currency();

    tracing::debug!(items = menu.len(), "Menu loaded");

    Ok(MenuTemplate {
        page: PageContext::new(&user, &cart, currency),
        items: menu
            .iter()
            .map(|item| MenuItemView::new(item, &cart, currency))
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fast_pizza_core::{CartItem, PizzaId};
    use rust_decimal::Decimal;

    use super::*;

    fn margherita(sold_out: bool) -> MenuItem {
        MenuItem {
            id: PizzaId::new(1),
            name: "Margherita".to_string(),
            unit_price: Decimal::from(12),
            ingredients: vec!["tomato".to_string(), "mozzarella".to_string()],
            image_url: None,
            sold_out,
        }
    }

    #[test]
    fn test_menu_item_view_shows_cart_quantity() {
        let item = margherita(false);
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(PizzaId::new(1), "Margherita", Decimal::from(12)));
        cart.increment_quantity(PizzaId::new(1));

        let view = MenuItemView::new(&item, &cart, CurrencyCode::EUR);
        assert_eq!(view.in_cart, 2);
        assert_eq!(view.price, "€12.00");
        assert_eq!(view.ingredients, "Tomato, mozzarella");
    }

    #[test]
    fn test_menu_template_hides_add_for_sold_out() {
        let cart = Cart::new();
        let template = MenuTemplate {
            page: PageContext::default(),
            items: vec![MenuItemView::new(&margherita(true), &cart, CurrencyCode::EUR)],
        };
        let html = template.render().unwrap();
        assert!(html.contains("Sold out"));
        assert!(!html.contains("Add to cart"));
    }
}
