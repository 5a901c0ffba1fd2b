//! Order status page, priority upgrade and order search.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use fast_pizza_core::{CurrencyCode, MenuItem, Order, OrderId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::restaurant::RestaurantApi;
use crate::routes::view::{PageContext, format_price, format_time};
use crate::services::OrderingService;
use crate::state::AppState;

/// One ordered pizza as displayed.
#[derive(Clone, Debug)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub total_price: String,
    /// Empty when the menu could not be loaded.
    pub ingredients: String,
}

/// Order display data for templates.
///
/// Customer name, phone and address are deliberately left out: anyone can
/// look up any order by id.
#[derive(Clone, Debug)]
pub struct OrderView {
    pub id: String,
    pub status: String,
    pub priority: bool,
    /// `"Only 12 minutes left"` or `"Order should have arrived"`.
    pub countdown: String,
    /// Formatted estimated delivery time, empty when unknown.
    pub estimated_delivery: String,
    pub lines: Vec<OrderLineView>,
    pub pizza_price: String,
    pub priority_price: String,
    pub amount_due: String,
}

impl OrderView {
    #[must_use]
    pub fn new(order: &Order, menu: &[MenuItem], currency: CurrencyCode, now: DateTime<Utc>) -> Self {
        let countdown = match order.minutes_left(now) {
            Some(minutes) if minutes >= 0 => format!("Only {minutes} minutes left"),
            Some(_) => "Order should have arrived".to_string(),
            None => String::new(),
        };

        Self {
            id: order.id.to_string(),
            status: order.status.to_string(),
            priority: order.priority,
            countdown,
            estimated_delivery: order.estimated_delivery.map(format_time).unwrap_or_default(),
            lines: order
                .cart
                .iter()
                .map(|line| OrderLineView {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    total_price: format_price(line.total_price, currency),
                    ingredients: menu
                        .iter()
                        .find(|item| item.id == line.pizza_id)
                        .map(MenuItem::ingredients_line)
                        .unwrap_or_default(),
                })
                .collect(),
            pizza_price: format_price(order.pizza_price(), currency),
            priority_price: format_price(order.priority_price(), currency),
            amount_due: format_price(order.amount_due(), currency),
        }
    }
}

/// Order status template.
#[derive(Template, WebTemplate)]
#[template(path = "order_show.html")]
pub struct OrderShowTemplate {
    pub page: PageContext,
    pub order: OrderView,
}

/// Order search query.
#[derive(Debug, Default, Deserialize)]
pub struct OrderSearch {
    #[serde(default)]
    pub q: Option<String>,
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    OrderId::parse(raw).ok_or_else(|| AppError::NotFound(format!("order #{}", raw.trim())))
}

/// Display an order.
///
/// Loader: fetches the order; the menu is fetched too so each line can list
/// its ingredients, but a menu failure only leaves them blank.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<String>,
) -> Result<OrderShowTemplate> {
    let id = parse_order_id(&order_id)?;
    let order = state.restaurant().order(&id).await?;
    let menu = state.restaurant().menu().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Menu unavailable for order page");
        Vec::new()
    });
    let currency = state.currency();

    Ok(OrderShowTemplate {
        page: PageContext::load(&session, currency).await?,
        order: OrderView::new(&order, &menu, currency, Utc::now()),
    })
}

/// Upgrade an order to priority, then reload it.
///
/// Action: nothing changes on screen until the restaurant confirms.
#[instrument(skip(state))]
pub async fn prioritize(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Response> {
    let id = parse_order_id(&order_id)?;
    OrderingService::new(state.restaurant())
        .prioritize(&id)
        .await?;
    add_breadcrumb(
        "order",
        "Prioritized order",
        Some(&[("order_id", id.as_str())]),
    );
    Ok(Redirect::to(&format!("/order/{id}")).into_response())
}

/// Jump to an order by id (`GET /order?q=ID`).
///
/// A blank query goes back home.
#[instrument]
pub async fn search(Query(search): Query<OrderSearch>) -> Result<Response> {
    let query = search.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }
    let id = OrderId::parse(query)
        .ok_or_else(|| AppError::BadRequest(format!("\"{query}\" is not an order number")))?;
    Ok(Redirect::to(&format!("/order/{id}")).into_response())
}
