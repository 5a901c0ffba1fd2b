//! Integration tests for resolving the delivery address from geolocation.

#![allow(clippy::unwrap_used)]

use fast_pizza_integration_tests::{TestContext, hidden_value};
use reqwest::StatusCode;

async fn order_form(ctx: &TestContext) -> String {
    ctx.add_to_cart(1).await;
    ctx.get_text("/order/new").await.1
}

/// Post the order form through its "Get position" button.
async fn locate(
    ctx: &TestContext,
    cart: &str,
    report: &[(&str, &str)],
) -> (StatusCode, String) {
    let mut form = vec![
        ("customer", "Maria"),
        ("phone", "555-123-4567"),
        ("address", "Via Toledo 256"),
        ("cart", cart),
        ("priority", "on"),
        ("pin", ""),
        ("position", ""),
    ];
    form.extend_from_slice(report);
    let response = ctx.post_form("/order/new/position", &form).await;
    let status = response.status();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn test_position_resolves_address() {
    let ctx = TestContext::new().await;
    let html = order_form(&ctx).await;
    assert!(html.contains("Get position"));
    let cart = hidden_value(&html, "cart").unwrap();

    let (status, html) = locate(
        &ctx,
        &cart,
        &[
            ("latitude", "40.85"),
            ("longitude", "14.27"),
            ("error_code", ""),
            ("error_message", ""),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("value=\"Chiaia, Naples 80121, Italy\""));
    assert_eq!(hidden_value(&html, "position").as_deref(), Some("40.85, 14.27"));
    assert!(!html.contains("Get position"));

    let (_, html) = ctx.get_text("/order/new").await;
    assert!(html.contains("value=\"Chiaia, Naples 80121, Italy\""));
}

#[tokio::test]
async fn test_typed_values_survive_lookup() {
    let ctx = TestContext::new().await;
    let html = order_form(&ctx).await;
    let cart = hidden_value(&html, "cart").unwrap();

    let (_, html) = locate(
        &ctx,
        &cart,
        &[("latitude", "40.85"), ("longitude", "14.27")],
    )
    .await;
    assert!(html.contains("value=\"Maria\""));
    assert!(html.contains("value=\"555-123-4567\""));
    assert!(html.contains("value=\"on\" checked"));
    assert!(html.contains("Order now for €14.40"));
}

#[tokio::test]
async fn test_resolved_position_is_sent_with_order() {
    let ctx = TestContext::new().await;
    let html = order_form(&ctx).await;
    let cart = hidden_value(&html, "cart").unwrap();
    let (_, html) = locate(
        &ctx,
        &cart,
        &[("latitude", "40.85"), ("longitude", "14.27")],
    )
    .await;

    let position = hidden_value(&html, "position").unwrap();
    let response = ctx
        .post_form(
            "/order/new",
            &[
                ("customer", "Jonas"),
                ("phone", "555-123-4567"),
                ("address", "Chiaia, Naples 80121, Italy"),
                ("cart", cart.as_str()),
                ("pin", "4321"),
                ("position", position.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let sent = ctx.restaurant.last_order().await.unwrap();
    let sent_position = sent.position.unwrap();
    assert!((sent_position.latitude - 40.85).abs() < f64::EPSILON);
    assert!((sent_position.longitude - 14.27).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_denied_geolocation_shows_hint() {
    let ctx = TestContext::new().await;
    let html = order_form(&ctx).await;
    let cart = hidden_value(&html, "cart").unwrap();

    let (status, html) = locate(
        &ctx,
        &cart,
        &[
            ("latitude", ""),
            ("longitude", ""),
            ("error_code", "1"),
            ("error_message", "User denied Geolocation"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Could not get your position"));
    assert!(html.contains("Make sure to fill in the address field!"));
    assert!(html.contains("value=\"Via Toledo 256\""));
    assert!(html.contains("value=\"555-123-4567\""));
    assert!(html.contains("Get position"));
}

#[tokio::test]
async fn test_geocoder_failure_shows_hint() {
    let ctx = TestContext::new().await;
    let html = order_form(&ctx).await;
    let cart = hidden_value(&html, "cart").unwrap();
    ctx.restaurant.fail_geocode(true);

    let (_, html) = locate(
        &ctx,
        &cart,
        &[("latitude", "40.85"), ("longitude", "14.27")],
    )
    .await;
    assert!(html.contains("There was a problem getting your address"));
    assert!(html.contains("Make sure to fill in the address field!"));
    assert!(html.contains("value=\"Via Toledo 256\""));
}
