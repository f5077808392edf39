use super::*;

fn request() -> CheckoutRequest {
    CheckoutRequest {
        booking_id: Uuid::nil(),
        amount_cents: 23_600,
        currency: "EUR".into(),
        description: "Grand Plaza, Deluxe King, 2 nights".into(),
        customer_email: "guest@example.com".into(),
        success_url: "http://localhost:3000/booking-confirmation".into(),
        cancel_url: "http://localhost:3000/checkout".into(),
    }
}

// =============================================================================
// amount_to_cents
// =============================================================================

#[test]
fn cents_rounds_to_nearest() {
    assert_eq!(amount_to_cents(236.0), Some(23_600));
    assert_eq!(amount_to_cents(212.399_999), Some(21_240));
    assert_eq!(amount_to_cents(0.01), Some(1));
}

#[test]
fn cents_rejects_zero_negative_and_nan() {
    assert_eq!(amount_to_cents(0.0), None);
    assert_eq!(amount_to_cents(-5.0), None);
    assert_eq!(amount_to_cents(f64::NAN), None);
    assert_eq!(amount_to_cents(f64::INFINITY), None);
}

// =============================================================================
// session_form
// =============================================================================

fn field<'a>(form: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    form.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
}

#[test]
fn form_carries_amount_and_currency() {
    let form = session_form(&request());
    assert_eq!(field(&form, "mode"), Some("payment"));
    assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), Some("23600"));
    assert_eq!(field(&form, "line_items[0][price_data][currency]"), Some("eur"));
    assert_eq!(field(&form, "line_items[0][quantity]"), Some("1"));
}

#[test]
fn form_references_booking() {
    let form = session_form(&request());
    let id = Uuid::nil().to_string();
    assert_eq!(field(&form, "client_reference_id"), Some(id.as_str()));
    assert_eq!(field(&form, "metadata[booking_id]"), Some(id.as_str()));
    assert_eq!(field(&form, "customer_email"), Some("guest@example.com"));
}

// =============================================================================
// parse_session
// =============================================================================

#[test]
fn parse_session_ok() {
    let session = parse_session(r#"{"id":"cs_test_123","url":"https://pay.example/cs_test_123","object":"checkout.session"}"#).unwrap();
    assert_eq!(session.provider_ref, "cs_test_123");
    assert_eq!(session.url, "https://pay.example/cs_test_123");
}

#[test]
fn parse_session_missing_url_is_error() {
    let err = parse_session(r#"{"id":"cs_test_123","url":null}"#).unwrap_err();
    assert!(matches!(err, CheckoutError::ApiParse(_)));
}

#[test]
fn parse_session_garbage_is_error() {
    assert!(matches!(parse_session("not json"), Err(CheckoutError::ApiParse(_))));
}

// =============================================================================
// gateways
// =============================================================================

#[tokio::test]
async fn local_gateway_redirects_to_confirmation() {
    let gateway = LocalCheckout::new("http://localhost:3000/");
    let session = gateway.create_session(&request()).await.unwrap();
    assert!(session.provider_ref.starts_with("local_"));
    assert_eq!(
        session.url,
        format!("http://localhost:3000/booking-confirmation?session={}", session.provider_ref)
    );
}

#[tokio::test]
async fn local_gateway_sessions_are_unique() {
    let gateway = LocalCheckout::new("http://localhost:3000");
    let a = gateway.create_session(&request()).await.unwrap();
    let b = gateway.create_session(&request()).await.unwrap();
    assert_ne!(a.provider_ref, b.provider_ref);
}

#[test]
fn hosted_endpoint_uses_base_url() {
    let gateway = HostedCheckout::new("sk_test".into(), Some("http://127.0.0.1:12111/")).unwrap();
    assert_eq!(gateway.endpoint, "http://127.0.0.1:12111/v1/checkout/sessions");
    assert_eq!(gateway.name(), "hosted");
}

#[test]
fn config_without_key_selects_local() {
    let config = AppConfig::for_tests();
    let gateway = gateway_from_config(&config).unwrap();
    assert_eq!(gateway.name(), "local");
}

#[test]
fn config_with_key_selects_hosted() {
    let config = AppConfig { checkout_api_key: Some("sk_test".into()), ..AppConfig::for_tests() };
    let gateway = gateway_from_config(&config).unwrap();
    assert_eq!(gateway.name(), "hosted");
}
