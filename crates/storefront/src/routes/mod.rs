//! HTTP route handlers for storefront.
//!
//! Loaders are `GET` handlers that fetch before rendering; actions are `POST`
//! handlers that validate, mutate and redirect. Every handler returns
//! `Result<_, AppError>`, and errors render the shared error page.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (asks for the visitor's name)
//! POST /user                    - Store the visitor's name
//! GET  /health                  - Health check
//!
//! # Menu
//! GET  /menu                    - Menu (loader: restaurant menu)
//!
//! # Cart
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add a pizza from the menu
//! POST /cart/increment          - One more of a pizza
//! POST /cart/decrement          - One less of a pizza (removed at zero)
//! POST /cart/remove             - Remove a pizza
//! POST /cart/clear              - Empty the cart
//!
//! # Orders
//! GET  /order?q=ID              - Order search, redirects to /order/ID
//! GET  /order/new               - Order form
//! POST /order/new               - Place the order (action)
//! POST /order/new/position      - Resolve the address, re-render the order form
//! GET  /order/{order_id}        - Order status (loader: restaurant order)
//! POST /order/{order_id}        - Make the order priority (action)
//! ```

pub mod cart;
pub mod home;
pub mod menu;
pub mod order;
pub mod view;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::order_rate_limiter;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the order routes router.
///
/// Mutations call upstream services and are rate limited per client IP.
pub fn order_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/new", post(order::create::create))
        .route("/new/position", post(order::create::locate))
        .route("/{order_id}", post(order::detail::prioritize))
        .route_layer(order_rate_limiter());

    Router::new()
        .route("/", get(order::detail::search))
        .route("/new", get(order::create::form))
        .route("/{order_id}", get(order::detail::show))
        .merge(mutations)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/user", post(home::set_username))
        .route("/menu", get(menu::index))
        .nest("/cart", cart_routes())
        .nest("/order", order_routes())
}
