//! Order creation: form loader, submission action and address lookup.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use fast_pizza_core::{
    AddressResolution, AddressStatus, Cart, CurrencyCode, Field, FieldErrors, GeolocationError,
    OrderSubmission, Position, UserProfile, order::order_total, order::priority_fee,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::{load_cart, load_user, save_cart, save_user};
use crate::routes::view::{CartLineView, PageContext, format_price};
use crate::services::{AddressService, CreateOrderOutcome, OrderingService};
use crate::state::AppState;

/// Values and errors for the order form.
#[derive(Clone, Debug, Default)]
pub struct OrderFormView {
    pub customer: String,
    pub phone: String,
    pub address: String,
    pub position: String,
    pub priority: bool,
    /// Serialized cart sent back with the form.
    pub cart_snapshot: String,
    pub customer_error: String,
    pub phone_error: String,
    pub address_error: String,
    pub pin_error: String,
    /// Address lookup state as rendered: `idle`, `ready` or `error`.
    pub address_status: String,
    pub address_lookup_error: String,
    pub lines: Vec<CartLineView>,
    pub pizza_price: String,
    pub priority_fee: String,
    /// Total including the priority fee when it is ticked.
    pub total: String,
    /// Totals without and with the fee, swapped in when the checkbox changes.
    pub regular_total: String,
    pub priority_total: String,
}

impl OrderFormView {
    /// Blank form pre-filled from the visitor's profile.
    #[must_use]
    pub fn prefilled(user: &UserProfile, cart: &Cart, currency: CurrencyCode) -> Self {
        let mut view = Self {
            customer: user.username().unwrap_or_default().to_string(),
            ..Self::default()
        };
        view.apply_address(user.address());
        view.apply_cart(cart, currency);
        view
    }

    /// Re-populate the form after an address lookup.
    ///
    /// Typed values are kept. A resolved lookup fills in the address and
    /// position; otherwise the submitted ones stay.
    #[must_use]
    pub fn located(
        submission: &OrderSubmission,
        user: &UserProfile,
        cart: &Cart,
        currency: CurrencyCode,
    ) -> Self {
        let mut view = Self {
            customer: submission.customer.clone(),
            phone: submission.phone.clone(),
            priority: submission.wants_priority(),
            ..Self::default()
        };
        view.apply_address(user.address());
        if user.address().status() != AddressStatus::Ready {
            view.address.clone_from(&submission.address);
            view.position.clone_from(&submission.position);
        }
        view.apply_cart(cart, currency);
        view
    }

    /// Re-populate the form with what was submitted and the field errors.
    ///
    /// The PIN is never echoed back.
    #[must_use]
    pub fn resubmitted(
        submission: &OrderSubmission,
        errors: &FieldErrors,
        user: &UserProfile,
        cart: &Cart,
        currency: CurrencyCode,
    ) -> Self {
        let message = |field| errors.get(field).unwrap_or_default().to_string();
        let mut view = Self {
            customer: submission.customer.clone(),
            phone: submission.phone.clone(),
            address: submission.address.clone(),
            priority: submission.wants_priority(),
            customer_error: message(Field::Customer),
            phone_error: message(Field::Phone),
            address_error: message(Field::Address),
            pin_error: message(Field::Pin),
            ..Self::default()
        };
        view.apply_address(user.address());
        view.address.clone_from(&submission.address);
        view.position.clone_from(&submission.position);
        view.apply_cart(cart, currency);
        view
    }

    fn apply_address(&mut self, lookup: &AddressResolution) {
        self.address = lookup.address().unwrap_or_default().to_string();
        self.position = lookup
            .position()
            .as_ref()
            .map(Position::to_string)
            .unwrap_or_default();
        self.address_status = lookup.status().to_string();
        self.address_lookup_error = lookup.error().unwrap_or_default().to_string();
    }

    fn apply_cart(&mut self, cart: &Cart, currency: CurrencyCode) {
        let pizza_price = cart.total_price();
        // An unserializable cart submits as empty and is turned away.
        self.cart_snapshot = cart.snapshot().unwrap_or_else(|_| "[]".to_string());
        self.lines = cart
            .items()
            .iter()
            .map(|item| CartLineView::new(item, currency))
            .collect();
        self.pizza_price = format_price(pizza_price, currency);
        self.priority_fee = format_price(priority_fee(pizza_price), currency);
        self.total = format_price(order_total(pizza_price, self.priority), currency);
        self.regular_total = format_price(order_total(pizza_price, false), currency);
        self.priority_total = format_price(order_total(pizza_price, true), currency);
    }
}

/// Order form template.
#[derive(Template, WebTemplate)]
#[template(path = "order_new.html")]
pub struct NewOrderTemplate {
    pub page: PageContext,
    pub form: OrderFormView,
    /// Nothing to order: show the way back to the menu instead of the form.
    pub empty_cart: bool,
}

/// Geolocation report posted by the browser.
///
/// Fields are posted blank when unused.
#[derive(Debug, Default, Deserialize)]
pub struct PositionReport {
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    /// `GeolocationPositionError.code`, when the browser failed.
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl PositionReport {
    /// The reported position, or why there is none.
    ///
    /// # Errors
    ///
    /// Returns the browser's failure, or `Unavailable` for missing or
    /// malformed coordinates.
    pub fn located(&self) -> std::result::Result<Position, GeolocationError> {
        let coordinate = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<f64>().ok())
        };

        match (coordinate(&self.latitude), coordinate(&self.longitude)) {
            (Some(latitude), Some(longitude)) => Position::new(latitude, longitude)
                .map_err(|e| GeolocationError::Unavailable(e.to_string())),
            _ if present(self.error_code.as_deref()) || present(self.error_message.as_deref()) => {
                Err(GeolocationError::from_browser(
                    self.error_code
                        .as_deref()
                        .and_then(|code| code.trim().parse().ok()),
                    self.error_message.as_deref().unwrap_or_default(),
                ))
            }
            _ => Err(GeolocationError::Unavailable(
                "no coordinates were reported".to_string(),
            )),
        }
    }
}

/// The order form submitted through its "Get position" button.
#[derive(Debug, Default, Deserialize)]
pub struct LocateForm {
    #[serde(flatten)]
    pub order: OrderSubmission,
    #[serde(flatten)]
    pub report: PositionReport,
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Display the order form.
///
/// Loader: reads the cart and profile from the session. An empty cart shows
/// the empty-cart page instead of the form.
#[instrument(skip(state, session))]
pub async fn form(State(state): State<AppState>, session: Session) -> Result<NewOrderTemplate> {
    let cart = load_cart(&session).await?;
    let user = load_user(&session).await?;
    let currency = state.currency();

    Ok(NewOrderTemplate {
        page: PageContext::new(&user, &cart, currency),
        form: OrderFormView::prefilled(&user, &cart, currency),
        empty_cart: cart.is_empty(),
    })
}

/// Submit the order form.
///
/// Action: invalid fields re-render the form with 422; a placed order clears
/// the cart and redirects to its status page.
#[instrument(skip(state, session, submission))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(submission): Form<OrderSubmission>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    let user = load_user(&session).await?;
    let currency = state.currency();

    let outcome = OrderingService::new(state.restaurant())
        .create_order(&mut cart, submission.clone(), Utc::now())
        .await?;

    match outcome {
        CreateOrderOutcome::EmptyCart => Ok(NewOrderTemplate {
            page: PageContext::new(&user, &cart, currency),
            form: OrderFormView::default(),
            empty_cart: true,
        }
        .into_response()),
        CreateOrderOutcome::Invalid(errors) => {
            let page = NewOrderTemplate {
                page: PageContext::new(&user, &cart, currency),
                form: OrderFormView::resubmitted(&submission, &errors, &user, &cart, currency),
                empty_cart: false,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        CreateOrderOutcome::Placed(order) => {
            save_cart(&session, &cart).await?;
            add_breadcrumb(
                "order",
                "Placed order",
                Some(&[("order_id", order.id.as_str())]),
            );
            Ok(Redirect::to(&format!("/order/{}", order.id)).into_response())
        }
    }
}

/// Resolve the visitor's address from a browser geolocation report.
///
/// The whole order form is posted here so everything typed so far is
/// rendered back. Lookup failures are shown next to the address field,
/// never as an error page. The loading state only exists in the browser,
/// which disables the button while the lookup runs.
#[instrument(skip(state, session, form))]
pub async fn locate(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LocateForm>,
) -> Result<NewOrderTemplate> {
    let cart = load_cart(&session).await?;
    let mut user = load_user(&session).await?;
    let currency = state.currency();

    AddressService::new(state.geocoder())
        .fetch_address(form.report.located(), user.address_mut())
        .await;
    save_user(&session, &user).await?;

    Ok(NewOrderTemplate {
        page: PageContext::new(&user, &cart, currency),
        form: OrderFormView::located(&form.order, &user, &cart, currency),
        empty_cart: cart.is_empty(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fast_pizza_core::{CartItem, PizzaId};
    use rust_decimal::Decimal;

    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(PizzaId::new(1), "Margherita", Decimal::from(12)));
        cart.add_item(CartItem::new(PizzaId::new(1), "Margherita", Decimal::from(12)));
        cart
    }

    #[test]
    fn test_prefilled_uses_profile() {
        let mut user = UserProfile::default();
        user.set_username("Jonas");
        user.address_mut()
            .resolve(Position::new(40.85, 14.27).unwrap(), "Naples, Italy");

        let form = OrderFormView::prefilled(&user, &cart(), CurrencyCode::EUR);
        assert_eq!(form.customer, "Jonas");
        assert_eq!(form.address, "Naples, Italy");
        assert_eq!(form.position, "40.85, 14.27");
        assert_eq!(form.address_status, "ready");
        assert_eq!(form.pizza_price, "€24.00");
        assert_eq!(form.priority_fee, "€4.80");
        assert_eq!(form.total, "€24.00");
        assert_eq!(form.regular_total, "€24.00");
        assert_eq!(form.priority_total, "€28.80");
    }

    fn typed_submission() -> OrderSubmission {
        OrderSubmission {
            customer: "Maria".to_string(),
            phone: "555-123-4567".to_string(),
            address: "Via Toledo 256".to_string(),
            priority: Some("on".to_string()),
            pin: "1234".to_string(),
            ..OrderSubmission::default()
        }
    }

    #[test]
    fn test_located_keeps_typed_values() {
        let mut user = UserProfile::default();
        user.set_username("Jonas");
        user.address_mut()
            .resolve(Position::new(40.85, 14.27).unwrap(), "Chiaia, Naples");

        let form = OrderFormView::located(&typed_submission(), &user, &cart(), CurrencyCode::EUR);
        assert_eq!(form.customer, "Maria");
        assert_eq!(form.phone, "555-123-4567");
        assert!(form.priority);
        assert_eq!(form.address, "Chiaia, Naples");
        assert_eq!(form.position, "40.85, 14.27");
        assert_eq!(form.total, "€28.80");
    }

    #[test]
    fn test_located_failure_keeps_typed_address() {
        let mut user = UserProfile::default();
        user.address_mut().begin();
        user.address_mut().fail("Could not get your position");

        let form = OrderFormView::located(&typed_submission(), &user, &cart(), CurrencyCode::EUR);
        assert_eq!(form.address, "Via Toledo 256");
        assert_eq!(form.phone, "555-123-4567");
        assert_eq!(form.address_status, "error");
        assert_eq!(form.address_lookup_error, "Could not get your position");
    }

    #[test]
    fn test_resubmitted_keeps_values_and_errors() {
        let submission = OrderSubmission {
            customer: "Jonas".to_string(),
            phone: "abc".to_string(),
            address: "Via Roma 1".to_string(),
            priority: Some("on".to_string()),
            pin: "123".to_string(),
            ..OrderSubmission::default()
        };
        let errors = submission.validate();

        let form = OrderFormView::resubmitted(
            &submission,
            &errors,
            &UserProfile::default(),
            &cart(),
            CurrencyCode::EUR,
        );
        assert_eq!(form.phone, "abc");
        assert_eq!(form.address, "Via Roma 1");
        assert!(form.priority);
        assert!(!form.phone_error.is_empty());
        assert!(!form.pin_error.is_empty());
        assert!(form.customer_error.is_empty());
        assert_eq!(form.total, "€28.80");
    }

    #[test]
    fn test_position_report_coordinates() {
        let report = PositionReport {
            latitude: Some("40.85".to_string()),
            longitude: Some(" 14.27 ".to_string()),
            ..PositionReport::default()
        };
        assert_eq!(report.located().unwrap(), Position::new(40.85, 14.27).unwrap());
    }

    #[test]
    fn test_position_report_browser_failure() {
        let report = PositionReport {
            error_code: Some("1".to_string()),
            error_message: Some("User denied Geolocation".to_string()),
            ..PositionReport::default()
        };
        assert_eq!(report.located(), Err(GeolocationError::PermissionDenied));
    }

    #[test]
    fn test_position_report_blank_fields() {
        let report = PositionReport {
            latitude: Some(String::new()),
            longitude: Some(String::new()),
            error_code: Some(String::new()),
            error_message: Some(String::new()),
        };
        assert!(matches!(
            report.located(),
            Err(GeolocationError::Unavailable(_))
        ));
    }

    #[test]
    fn test_position_report_out_of_range() {
        let report = PositionReport {
            latitude: Some("123".to_string()),
            longitude: Some("14".to_string()),
            ..PositionReport::default()
        };
        assert!(matches!(
            report.located(),
            Err(GeolocationError::Unavailable(_))
        ));
    }

    #[test]
    fn test_empty_cart_page() {
        let page = NewOrderTemplate {
            page: PageContext::default(),
            form: OrderFormView::default(),
            empty_cart: true,
        };
        let html = page.render().unwrap();
        assert!(html.contains("Your cart is still empty"));
        assert!(!html.contains("name=\"pin\""));
    }

    #[test]
    fn test_form_renders_inline_errors() {
        let submission = OrderSubmission {
            phone: "abc".to_string(),
            ..OrderSubmission::default()
        };
        let errors = submission.validate();
        let page = NewOrderTemplate {
            page: PageContext::default(),
            form: OrderFormView::resubmitted(
                &submission,
                &errors,
                &UserProfile::default(),
                &cart(),
                CurrencyCode::EUR,
            ),
            empty_cart: false,
        };
        let html = page.render().unwrap();
        assert!(html.contains("Please provide a valid phone number"));
        assert!(html.contains("name=\"cart\""));
    }

    #[test]
    fn test_form_carries_both_totals() {
        let page = NewOrderTemplate {
            page: PageContext::default(),
            form: OrderFormView::prefilled(&UserProfile::default(), &cart(), CurrencyCode::EUR),
            empty_cart: false,
        };
        let html = page.render().unwrap();
        assert!(html.contains("Order now for €24.00"));
        assert!(html.contains("data-regular-total=\"€24.00\""));
        assert!(html.contains("data-priority-total=\"€28.80\""));
    }

    #[test]
    fn test_form_does_not_echo_pin() {
        let submission = OrderSubmission {
            phone: "abc".to_string(),
            pin: "9876".to_string(),
            ..OrderSubmission::default()
        };
        let errors = submission.validate();
        let page = NewOrderTemplate {
            page: PageContext::default(),
            form: OrderFormView::resubmitted(
                &submission,
                &errors,
                &UserProfile::default(),
                &cart(),
                CurrencyCode::EUR,
            ),
            empty_cart: false,
        };
        let html = page.render().unwrap();
        assert!(html.contains("name=\"pin\""));
        assert!(!html.contains("9876"));
    }

    #[test]
    fn test_position_button_posts_whole_form() {
        let page = NewOrderTemplate {
            page: PageContext::default(),
            form: OrderFormView::prefilled(&UserProfile::default(), &cart(), CurrencyCode::EUR),
            empty_cart: false,
        };
        let html = page.render().unwrap();
        assert!(html.contains("formaction=\"/order/new/position\""));
        assert!(!html.contains("id=\"position-form\""));
    }
}
