use super::*;

// =============================================================================
// email
// =============================================================================

#[test]
fn strict_email_accepts_common_shapes() {
    assert!(is_valid_email("jane.doe@example.com"));
    assert!(is_valid_email("a+tag@mail.example.co.uk"));
    assert!(is_valid_email("x_y%z-1@sub-domain.io"));
}

#[test]
fn strict_email_rejects_bad_shapes() {
    assert!(!is_valid_email(""));
    assert!(!is_valid_email("no-at-sign.com"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("jane@example"));
    assert!(!is_valid_email("jane@example.c"));
    assert!(!is_valid_email("jane@exa mple.com"));
    assert!(!is_valid_email("jane@example.c0m"));
    assert!(!is_valid_email("ja ne@example.com"));
}

#[test]
fn loose_email_matches_checkout_rule() {
    assert!(is_loose_email("a@b.c"));
    assert!(!is_loose_email("a@b"));
    assert!(!is_loose_email("a b@c.d"));
    assert!(!is_loose_email("@b.c"));
}

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Jane@Example.COM "), Some("jane@example.com".to_owned()));
    assert_eq!(normalize_email("nope"), None);
}

// =============================================================================
// fields
// =============================================================================

#[test]
fn postal_codes() {
    assert!(is_valid_postal_code("12345"));
    assert!(is_valid_postal_code("12345-6789"));
    assert!(!is_valid_postal_code("1234"));
    assert!(!is_valid_postal_code("12345-678"));
    assert!(!is_valid_postal_code("1234a"));
    assert!(!is_valid_postal_code("12345_6789"));
}

#[test]
fn phones() {
    assert!(is_valid_phone("+32 470 12 34 56"));
    assert!(is_valid_phone("0470-123-456"));
    assert!(!is_valid_phone("12345"));
    assert!(!is_valid_phone("call me"));
    assert!(!is_valid_phone("+1234567890123456"));
}

// =============================================================================
// checkout form
// =============================================================================

fn good_checkout() -> CheckoutForm {
    CheckoutForm {
        email: "guest@example.com".into(),
        address: "1 Grand Place".into(),
        city: "Brussels".into(),
        state: "BRU".into(),
        postal_code: "10001".into(),
    }
}

#[test]
fn checkout_valid_form_passes() {
    assert!(validate_checkout(&good_checkout()).is_ok());
}

#[test]
fn checkout_reports_all_bad_fields() {
    let form = CheckoutForm { address: "   ".into(), postal_code: "1000".into(), ..good_checkout() };
    let err = validate_checkout(&form).unwrap_err();
    assert_eq!(err.fields.len(), 2);
    assert!(err.fields.contains("address"));
    assert!(err.fields.contains("postalCode"));
}

#[test]
fn checkout_empty_form_fails_everywhere() {
    let err = validate_checkout(&CheckoutForm::default()).unwrap_err();
    assert_eq!(err.fields.len(), 5);
}

#[test]
fn checkout_form_deserializes_camel_case() {
    let form: CheckoutForm = serde_json::from_str(r#"{"email":"a@b.co","postalCode":"12345"}"#).unwrap();
    assert_eq!(form.postal_code, "12345");
    assert!(form.city.is_empty());
}

// =============================================================================
// registration form
// =============================================================================

fn good_registration() -> RegistrationForm {
    RegistrationForm {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@example.com".into(),
        phone_number: "+32470123456".into(),
        password: "correct horse".into(),
        confirm_password: "correct horse".into(),
    }
}

#[test]
fn registration_valid_form_passes() {
    assert!(validate_registration(&good_registration()).is_ok());
}

#[test]
fn registration_password_mismatch() {
    let form = RegistrationForm { confirm_password: "other horse".into(), ..good_registration() };
    let err = validate_registration(&form).unwrap_err();
    assert_eq!(err.fields.iter().copied().collect::<Vec<_>>(), vec!["confirmPassword"]);
}

#[test]
fn registration_short_password() {
    let form = RegistrationForm { password: "short".into(), confirm_password: "short".into(), ..good_registration() };
    let err = validate_registration(&form).unwrap_err();
    assert!(err.fields.contains("password"));
    assert!(!err.fields.contains("confirmPassword"));
}

#[test]
fn validation_error_message_lists_fields() {
    let form = RegistrationForm { first_name: String::new(), email: "bad".into(), ..good_registration() };
    let err = validate_registration(&form).unwrap_err();
    assert_eq!(err.to_string(), "invalid fields: email, firstName");
}

// =============================================================================
// cards
// =============================================================================

#[test]
fn card_digits_strip_separators() {
    assert_eq!(card_digits("4242 4242-4242 4242"), Some("4242424242424242".to_owned()));
    assert_eq!(card_digits("4242"), None);
    assert_eq!(card_digits("4242 4242 4242 424x"), None);
}

#[test]
fn expiry_format() {
    assert!(is_valid_expiry("01/27"));
    assert!(is_valid_expiry("12/30"));
    assert!(!is_valid_expiry("13/27"));
    assert!(!is_valid_expiry("00/27"));
    assert!(!is_valid_expiry("1/27"));
    assert!(!is_valid_expiry("01/2027"));
}

#[test]
fn cvv_format() {
    assert!(is_valid_cvv("123"));
    assert!(is_valid_cvv("1234"));
    assert!(!is_valid_cvv("12"));
    assert!(!is_valid_cvv("12a"));
}

#[test]
fn card_form_cvv_optional_on_edit() {
    let form = CardForm {
        card_number: "4000 0566 5566 5556".into(),
        expiry_date: "09/28".into(),
        cvv: String::new(),
        card_type: "Visa".into(),
    };
    assert!(validate_card(&form, false).is_ok());
    assert!(validate_card(&form, true).unwrap_err().fields.contains("cvv"));
}

#[test]
fn mask_keeps_last_four() {
    assert_eq!(mask_card_number("4242424242424242"), "**** **** **** 4242");
    assert_eq!(mask_card_number("12"), "**** **** **** 12");
}
