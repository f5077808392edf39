use super::*;
use time::macros::date;

fn card(number: &str, cvv: &str) -> CardForm {
    CardForm {
        card_number: number.into(),
        expiry_date: "12/29".into(),
        cvv: cvv.into(),
        card_type: "Visa".into(),
    }
}

#[test]
fn masked_card_keeps_last_four() {
    assert_eq!(masked_card(&card("4242 4242 4242 4242", "123"), true).unwrap(), "**** **** **** 4242");
}

#[test]
fn masked_card_requires_cvv_on_add() {
    let err = masked_card(&card("4242424242424242", ""), true).unwrap_err();
    assert!(err.fields.contains("cvv"));
}

#[test]
fn masked_card_cvv_optional_on_edit() {
    assert!(masked_card(&card("4242-4242-4242-1881", ""), false).is_ok());
}

#[test]
fn masked_card_rejects_short_number() {
    let err = masked_card(&card("4242", "123"), true).unwrap_err();
    assert!(err.fields.contains("card_number"));
}

#[test]
fn payment_method_serializes_masked_number_as_card_number() {
    let method = PaymentMethod {
        id: Uuid::nil(),
        card_type: "Visa".into(),
        card_number: "**** **** **** 4242".into(),
        expiry_date: "12/29".into(),
    };
    let json = serde_json::to_value(&method).unwrap();
    assert_eq!(json["card_number"], "**** **** **** 4242");
    assert!(json.get("cvv").is_none());
}

#[test]
fn describe_with_room_and_plural_nights() {
    assert_eq!(
        describe("Grand Plaza", Some("Deluxe King"), 2, date!(2025 - 07 - 04)),
        "Grand Plaza, Deluxe King, 2 nights from 04-07-2025"
    );
}

#[test]
fn describe_single_night_without_room() {
    let day = date!(2025 - 12 - 31);
    assert_eq!(describe("Grand Plaza", Some("  "), 1, day), "Grand Plaza, 1 night from 31-12-2025");
    assert_eq!(describe("Grand Plaza", None, 1, day), "Grand Plaza, 1 night from 31-12-2025");
}

#[test]
fn checkout_request_accepts_ui_payload() {
    let req: CheckoutSessionRequest = serde_json::from_value(serde_json::json!({
        "bookingId": Uuid::nil(),
        "amount": "236.00",
        "hotel_id": "HTL-001",
        "room_type": "Deluxe King",
        "email": "guest@example.com",
        "nights": 2
    }))
    .unwrap();
    assert_eq!(req.booking_id, Uuid::nil());
    assert_eq!(req.amount.and_then(|a| a.value()), Some(236.0));
    assert_eq!(req.room_type.as_deref(), Some("Deluxe King"));
}

fn checkout_request(billing: serde_json::Value) -> CheckoutSessionRequest {
    let mut body = serde_json::json!({ "bookingId": Uuid::nil(), "email": "guest@example.com" });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), billing.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(body).unwrap()
}

#[test]
fn billing_form_absent_without_address_fields() {
    assert!(checkout_request(serde_json::json!({})).billing_form().is_none());
}

#[test]
fn billing_form_fills_missing_fields_blank() {
    let form = checkout_request(serde_json::json!({ "postalCode": "12345" })).billing_form().unwrap();
    assert_eq!(form.email, "guest@example.com");
    assert_eq!(form.postal_code, "12345");
    assert!(form.city.is_empty());
}

#[tokio::test]
async fn start_checkout_rejects_invalid_billing_before_lookup() {
    let state = crate::state::test_helpers::test_app_state();
    let request = checkout_request(serde_json::json!({
        "address": "1 Canal St",
        "city": " ",
        "state": "NH",
        "postalCode": "1234"
    }));

    let err = start_checkout(&state.pool, &state.checkout, &state.config, Uuid::nil(), &request)
        .await
        .unwrap_err();
    let invalid = match err {
        PaymentError::Validation(invalid) => invalid,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(invalid.fields.iter().copied().collect::<Vec<_>>(), vec!["city", "postalCode"]);

    let api: crate::error::ApiError = PaymentError::Validation(invalid).into();
    assert_eq!(api.status_code(), axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(api.public_message(), "invalid fields: city, postalCode");
}
