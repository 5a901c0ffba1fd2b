//! Cart route handlers.
//!
//! The cart lives in the session. Every mutation is a form post that
//! redirects back to where it came from (the menu or the cart page).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use fast_pizza_core::PizzaId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::{CartLineView, PageContext, format_price, safe_return_to};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{load_cart, load_user, save_cart};
use crate::restaurant::RestaurantApi;
use crate::state::AppState;

/// Cart display data for templates.
#[derive(Clone, Debug, Default)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Form for every per-line cart action.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub pizza_id: i32,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Form for clearing the cart.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnToForm {
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let cart = load_cart(&session).await?;
    let user = load_user(&session).await?;
    let currency = state.currency();

    Ok(CartShowTemplate {
        page: PageContext::new(&user, &cart, currency),
        cart: CartView {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView::new(item, currency))
                .collect(),
            total: format_price(cart.total_price(), currency),
        },
    })
}

/// Add a pizza from the menu.
///
/// Name and price come from the menu, not the form. Unknown or sold-out
/// pizzas are rejected.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let pizza_id = PizzaId::new(form.pizza_id);
    let menu = state.restaurant().menu().await?;
    let item = menu
        .iter()
        .find(|item| item.id == pizza_id)
        .ok_or_else(|| AppError::NotFound(format!("pizza {pizza_id}")))?;
    let line = item
        .to_cart_item()
        .ok_or_else(|| AppError::BadRequest(format!("{} is sold out", item.name)))?;

    let mut cart = load_cart(&session).await?;
    cart.add_item(line);
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added pizza",
        Some(&[("pizza_id", pizza_id.to_string().as_str())]),
    );
    Ok(redirect_back(form.return_to.as_deref(), "/menu"))
}

/// Add one more of a pizza already in the cart.
#[instrument(skip(session))]
pub async fn increment(session: Session, Form(form): Form<CartLineForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.increment_quantity(PizzaId::new(form.pizza_id));
    save_cart(&session, &cart).await?;
    Ok(redirect_back(form.return_to.as_deref(), "/cart"))
}

/// Take one away; the line disappears at zero.
#[instrument(skip(session))]
pub async fn decrement(session: Session, Form(form): Form<CartLineForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.decrement_quantity(PizzaId::new(form.pizza_id));
    save_cart(&session, &cart).await?;
    Ok(redirect_back(form.return_to.as_deref(), "/cart"))
}

/// Remove a line whatever its quantity.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CartLineForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.remove_item(PizzaId::new(form.pizza_id));
    save_cart(&session, &cart).await?;
    Ok(redirect_back(form.return_to.as_deref(), "/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session, Form(form): Form<ReturnToForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    add_breadcrumb("cart", "Cleared cart", None);
    Ok(redirect_back(form.return_to.as_deref(), "/cart"))
}

fn redirect_back(requested: Option<&str>, default: &str) -> Response {
    Redirect::to(safe_return_to(requested, default)).into_response()
}
