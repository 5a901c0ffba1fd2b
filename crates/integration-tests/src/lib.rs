//! Integration tests for Fast Pizza.
//!
//! Each test boots the storefront on an ephemeral port, pointed at an
//! in-process fake restaurant API that speaks the real REST wire format
//! (`{"status": "success", "data": ...}` envelopes). The fake also serves the
//! reverse geocoding endpoint.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fast-pizza-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use fast_pizza_core::{
    CurrencyCode, MenuItem, NewOrder, Order, OrderId, OrderStatus, PizzaId, order::priority_fee,
};
use fast_pizza_storefront::{
    build_app,
    config::{GeocodingConfig, RestaurantApiConfig, StorefrontConfig},
    state::AppState,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_sessions::MemoryStore;
use url::Url;

/// Minutes from creation to estimated delivery for fake orders.
pub const DELIVERY_MINUTES: i64 = 45;

/// The menu every fake restaurant starts with.
#[must_use]
pub fn sample_menu() -> Vec<MenuItem> {
    let pizza = |id: i32, name: &str, price: i64, ingredients: &[&str], sold_out: bool| MenuItem {
        id: PizzaId::new(id),
        name: name.to_string(),
        unit_price: Decimal::from(price),
        ingredients: ingredients.iter().map(ToString::to_string).collect(),
        image_url: Some(format!("https://cdn.example.com/pizzas/{id}.jpg")),
        sold_out,
    };

    vec![
        pizza(1, "Margherita", 12, &["tomato", "mozzarella", "basil"], false),
        pizza(2, "Capricciosa", 14, &["tomato", "mozzarella", "ham", "mushrooms", "artichoke"], false),
        pizza(3, "Diavola", 16, &["tomato", "mozzarella", "spicy salami", "chili flakes"], true),
    ]
}

#[derive(Default)]
struct FakeState {
    menu: Mutex<Vec<MenuItem>>,
    orders: Mutex<HashMap<String, Order>>,
    orders_created: AtomicUsize,
    menu_requests: AtomicUsize,
    last_order: Mutex<Option<NewOrder>>,
    fail_menu: AtomicBool,
    fail_create: AtomicBool,
    fail_priority: AtomicBool,
    fail_geocode: AtomicBool,
}

/// Fake restaurant REST API and geocoder.
#[derive(Clone)]
pub struct FakeRestaurant {
    state: Arc<FakeState>,
    addr: SocketAddr,
}

impl FakeRestaurant {
    /// Start the fake on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            menu: Mutex::new(sample_menu()),
            ..FakeState::default()
        });

        let app = Router::new()
            .route("/api/menu", get(menu))
            .route("/api/order", post(create_order))
            .route("/api/order/{id}", get(order))
            .route("/api/order/{id}/priority", patch(prioritize))
            .route("/geocode", get(reverse_geocode))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake restaurant");
        let addr = listener.local_addr().expect("Fake restaurant has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake restaurant failed");
        });

        Self { state, addr }
    }

    /// Base URL of the REST API.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).expect("valid fake API URL")
    }

    /// Reverse geocoding endpoint.
    #[must_use]
    pub fn geocode_url(&self) -> Url {
        Url::parse(&format!("http://{}/geocode", self.addr)).expect("valid fake geocode URL")
    }

    /// Number of orders the API accepted.
    #[must_use]
    pub fn orders_created(&self) -> usize {
        self.state.orders_created.load(Ordering::SeqCst)
    }

    /// Number of menu fetches that reached the API.
    #[must_use]
    pub fn menu_requests(&self) -> usize {
        self.state.menu_requests.load(Ordering::SeqCst)
    }

    /// Payload of the most recent create-order request.
    pub async fn last_order(&self) -> Option<NewOrder> {
        self.state.last_order.lock().await.clone()
    }

    /// Stored order by id.
    pub async fn stored_order(&self, id: &str) -> Option<Order> {
        self.state.orders.lock().await.get(id).cloned()
    }

    /// Replace the menu.
    pub async fn set_menu(&self, menu: Vec<MenuItem>) {
        *self.state.menu.lock().await = menu;
    }

    /// Store an order as if it had been placed earlier.
    pub async fn insert_order(&self, order: Order) {
        self.state
            .orders
            .lock()
            .await
            .insert(order.id.as_str().to_string(), order);
    }

    pub fn fail_menu(&self, fail: bool) {
        self.state.fail_menu.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_priority(&self, fail: bool) {
        self.state.fail_priority.store(fail, Ordering::SeqCst);
    }

    pub fn fail_geocode(&self, fail: bool) {
        self.state.fail_geocode.store(fail, Ordering::SeqCst);
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "fail", "message": message }))).into_response()
}

fn success(data: impl serde::Serialize) -> Response {
    Json(json!({ "status": "success", "data": data })).into_response()
}

async fn menu(State(state): State<Arc<FakeState>>) -> Response {
    state.menu_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_menu.load(Ordering::SeqCst) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed getting menu");
    }
    success(&*state.menu.lock().await)
}

async fn create_order(State(state): State<Arc<FakeState>>, Json(new): Json<NewOrder>) -> Response {
    if state.fail_create.load(Ordering::SeqCst) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed creating your order");
    }

    let number = state.orders_created.fetch_add(1, Ordering::SeqCst) + 1;
    let id = OrderId::parse(&format!("FP{number:04}")).expect("generated id is valid");
    let pizza_price = new.pizza_price();
    let order = Order {
        id: id.clone(),
        customer: new.customer.clone(),
        phone: new.phone.as_str().to_string(),
        address: new.address.clone(),
        position: new.position,
        cart: new.cart.clone(),
        priority: new.priority,
        created_at: Some(new.time_ordered),
        estimated_delivery: Some(new.time_ordered + chrono::Duration::minutes(DELIVERY_MINUTES)),
        status: OrderStatus::Preparing,
        order_price: Some(pizza_price),
        priority_price: Some(if new.priority {
            priority_fee(pizza_price)
        } else {
            Decimal::ZERO
        }),
    };

    *state.last_order.lock().await = Some(new);
    state
        .orders
        .lock()
        .await
        .insert(id.as_str().to_string(), order.clone());
    success(order)
}

async fn order(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    match state.orders.lock().await.get(&id) {
        Some(order) => success(order),
        None => failure(StatusCode::NOT_FOUND, &format!("Couldn't find order #{id}")),
    }
}

#[derive(Deserialize)]
struct PriorityUpdate {
    priority: bool,
}

async fn prioritize(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    Json(update): Json<PriorityUpdate>,
) -> Response {
    if state.fail_priority.load(Ordering::SeqCst) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed updating your order");
    }

    let mut orders = state.orders.lock().await;
    let Some(order) = orders.get_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, &format!("Couldn't find order #{id}"));
    };
    order.priority = update.priority;
    order.priority_price = Some(priority_fee(order.pizza_price()));
    (StatusCode::OK, Json(json!({ "status": "success" }))).into_response()
}

#[derive(Deserialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

async fn reverse_geocode(
    State(state): State<Arc<FakeState>>,
    Query(coordinates): Query<Coordinates>,
) -> Response {
    if state.fail_geocode.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({
        "latitude": coordinates.latitude,
        "longitude": coordinates.longitude,
        "locality": "Chiaia",
        "city": "Naples",
        "postcode": "80121",
        "countryName": "Italy",
    }))
    .into_response()
}

/// A running storefront wired to a fake restaurant, plus a browser-like
/// client that keeps cookies and does not follow redirects.
pub struct TestContext {
    pub restaurant: FakeRestaurant,
    pub client: reqwest::Client,
    pub storefront_url: String,
}

impl TestContext {
    /// Start with the menu cache disabled.
    pub async fn new() -> Self {
        Self::with_menu_cache(Duration::ZERO).await
    }

    /// Start with the given menu cache TTL.
    pub async fn with_menu_cache(menu_cache_ttl: Duration) -> Self {
        let restaurant = FakeRestaurant::start().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");

        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}"),
            currency: CurrencyCode::EUR,
            restaurant: RestaurantApiConfig {
                base_url: restaurant.api_url(),
                timeout: Duration::from_secs(5),
                menu_cache_ttl,
            },
            geocoding: GeocodingConfig {
                endpoint: restaurant.geocode_url(),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).expect("Failed to build storefront state");
        let app = build_app(state, MemoryStore::default());
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Storefront failed");
        });

        Self {
            restaurant,
            client: Self::browser(),
            storefront_url: format!("http://{addr}"),
        }
    }

    /// A fresh visitor with their own cookie jar.
    #[must_use]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let response = self.get(path).await;
        let status = StatusCode::from_u16(response.status().as_u16())
            .expect("valid status code");
        (status, response.text().await.expect("readable body"))
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Add a pizza from the menu page.
    pub async fn add_to_cart(&self, pizza_id: i32) -> reqwest::Response {
        let id = pizza_id.to_string();
        self.post_form("/cart/add", &[("pizza_id", id.as_str()), ("return_to", "/menu")])
            .await
    }

    /// The hidden cart snapshot the order form would submit.
    pub async fn cart_snapshot(&self) -> String {
        let (_, html) = self.get_text("/order/new").await;
        hidden_value(&html, "cart").unwrap_or_default()
    }
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// Value of a hidden input in rendered HTML, with entities decoded.
#[must_use]
pub fn hidden_value(html: &str, name: &str) -> Option<String> {
    let marker = format!("type=\"hidden\" name=\"{name}\" value=\"");
    let start = html.find(&marker)? + marker.len();
    let rest = html.get(start..)?;
    let end = rest.find('"')?;
    Some(decode_entities(rest.get(..end)?))
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
