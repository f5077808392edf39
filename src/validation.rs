//! Form field validation for login, registration, checkout, and cards.
//!
//! Rules are hand-rolled character checks; each public function mirrors one
//! form the UI submits and reports every failing field at once so the form
//! can highlight them together.

use std::collections::BTreeSet;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fields: {}", .fields.iter().copied().collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    pub fields: BTreeSet<&'static str>,
}

impl ValidationError {
    /// A single failing field.
    #[must_use]
    pub fn field(name: &'static str) -> Self {
        Self { fields: BTreeSet::from([name]) }
    }

    fn check(fields: BTreeSet<&'static str>) -> Result<(), Self> {
        if fields.is_empty() { Ok(()) } else { Err(Self { fields }) }
    }
}

// =============================================================================
// EMAIL
// =============================================================================

/// Strict email check used by login and registration:
/// `local@domain.tld` where local is `[A-Za-z0-9._%+-]+`, domain is
/// `[A-Za-z0-9.-]+`, and the final label is at least two letters.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || !local.chars().all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c)) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Loose email check used by the checkout form: something `@` something `.` something,
/// no whitespace in any part.
#[must_use]
pub fn is_loose_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    [local, host, tld]
        .iter()
        .all(|part| !part.is_empty() && !part.chars().any(char::is_whitespace))
}

/// Trimmed, lowercased email if it passes `is_valid_email`.
#[must_use]
pub fn normalize_email(value: &str) -> Option<String> {
    let normalized = value.trim().to_ascii_lowercase();
    is_valid_email(&normalized).then_some(normalized)
}

// =============================================================================
// FIELDS
// =============================================================================

/// `12345` or `12345-6789`.
#[must_use]
pub fn is_valid_postal_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    let five = |b: &[u8]| b.iter().all(u8::is_ascii_digit);
    match bytes.len() {
        5 => five(bytes),
        10 => five(&bytes[..5]) && bytes[5] == b'-' && five(&bytes[6..]),
        _ => false,
    }
}

/// 7 to 15 digits with an optional leading `+`; spaces and dashes are ignored.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Validate the checkout contact/address form.
///
/// # Errors
///
/// Returns every invalid field name.
pub fn validate_checkout(form: &CheckoutForm) -> Result<(), ValidationError> {
    let mut bad = BTreeSet::new();
    if !is_loose_email(&form.email) {
        bad.insert("email");
    }
    if is_blank(&form.address) {
        bad.insert("address");
    }
    if is_blank(&form.city) {
        bad.insert("city");
    }
    if is_blank(&form.state) {
        bad.insert("state");
    }
    if !is_valid_postal_code(&form.postal_code) {
        bad.insert("postalCode");
    }
    ValidationError::check(bad)
}

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Validate a sign-up form.
///
/// # Errors
///
/// Returns every invalid field name.
pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationError> {
    let mut bad = BTreeSet::new();
    if is_blank(&form.first_name) {
        bad.insert("firstName");
    }
    if is_blank(&form.last_name) {
        bad.insert("lastName");
    }
    if !is_valid_email(form.email.trim()) {
        bad.insert("email");
    }
    if !is_valid_phone(&form.phone_number) {
        bad.insert("phoneNumber");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        bad.insert("password");
    }
    if form.password != form.confirm_password {
        bad.insert("confirmPassword");
    }
    ValidationError::check(bad)
}

// =============================================================================
// PAYMENT CARDS
// =============================================================================

/// Digits of a card number with spaces/dashes removed, if it is 12–19 digits.
#[must_use]
pub fn card_digits(value: &str) -> Option<String> {
    let mut digits = String::with_capacity(19);
    for c in value.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' => {}
            _ => return None,
        }
    }
    (12..=19).contains(&digits.len()).then_some(digits)
}

/// `MM/YY` with month 01–12.
#[must_use]
pub fn is_valid_expiry(value: &str) -> bool {
    let Some((mm, yy)) = value.trim().split_once('/') else {
        return false;
    };
    let month_ok = mm.len() == 2
        && mm.chars().all(|c| c.is_ascii_digit())
        && mm.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m));
    let year_ok = yy.len() == 2 && yy.chars().all(|c| c.is_ascii_digit());
    month_ok && year_ok
}

/// Three or four digits.
#[must_use]
pub fn is_valid_cvv(value: &str) -> bool {
    let v = value.trim();
    (3..=4).contains(&v.len()) && v.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardForm {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub card_type: String,
}

/// Validate a payment card form. CVV is optional on edits (`require_cvv = false`).
///
/// # Errors
///
/// Returns every invalid field name.
pub fn validate_card(form: &CardForm, require_cvv: bool) -> Result<(), ValidationError> {
    let mut bad = BTreeSet::new();
    if card_digits(&form.card_number).is_none() {
        bad.insert("card_number");
    }
    if !is_valid_expiry(&form.expiry_date) {
        bad.insert("expiry_date");
    }
    if (require_cvv || !form.cvv.is_empty()) && !is_valid_cvv(&form.cvv) {
        bad.insert("cvv");
    }
    if is_blank(&form.card_type) {
        bad.insert("card_type");
    }
    ValidationError::check(bad)
}

/// Mask all but the last four digits: `**** **** **** 4242`.
#[must_use]
pub fn mask_card_number(digits: &str) -> String {
    let last4 = &digits[digits.len().saturating_sub(4)..];
    format!("**** **** **** {last4}")
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
