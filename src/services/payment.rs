//! Payment service — saved cards and checkout sessions.
//!
//! Only the card type, the masked number, and the expiry are stored. The CVV
//! is checked for shape when present and then dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::Date;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::pricing;
use crate::services::booking::{self, ClientAmount};
use crate::services::checkout::{self, CheckoutError, CheckoutGateway, CheckoutRequest};
use crate::validation::{self, CardForm, CheckoutForm, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("payment method not found")]
    NotFound,
    #[error("booking not found")]
    BookingNotFound,
    #[error("booking is cancelled")]
    BookingCancelled,
    #[error("booking total is not payable")]
    InvalidAmount,
    #[error(transparent)]
    Gateway(#[from] CheckoutError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// PAYMENT METHODS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub card_type: String,
    /// `**** **** **** 4242`
    pub card_number: String,
    pub expiry_date: String,
}

fn method_from_row(row: &PgRow) -> PaymentMethod {
    PaymentMethod {
        id: row.get("id"),
        card_type: row.get("card_type"),
        card_number: row.get("masked_number"),
        expiry_date: row.get("expiry_date"),
    }
}

/// Validate a card form and return its masked number.
///
/// # Errors
///
/// Returns every invalid field.
pub fn masked_card(form: &CardForm, require_cvv: bool) -> Result<String, ValidationError> {
    validation::validate_card(form, require_cvv)?;
    let digits = validation::card_digits(&form.card_number).ok_or_else(|| ValidationError::field("card_number"))?;
    Ok(validation::mask_card_number(&digits))
}

pub async fn list_methods(pool: &PgPool, user_id: Uuid) -> Result<Vec<PaymentMethod>, PaymentError> {
    let rows = sqlx::query(
        "SELECT id, card_type, masked_number, expiry_date FROM payment_methods WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(method_from_row).collect())
}

pub async fn add_method(pool: &PgPool, user_id: Uuid, form: &CardForm) -> Result<PaymentMethod, PaymentError> {
    let masked = masked_card(form, true)?;
    let row = sqlx::query(
        r"INSERT INTO payment_methods (user_id, card_type, masked_number, expiry_date)
          VALUES ($1, $2, $3, $4)
          RETURNING id, card_type, masked_number, expiry_date",
    )
    .bind(user_id)
    .bind(form.card_type.trim())
    .bind(masked)
    .bind(form.expiry_date.trim())
    .fetch_one(pool)
    .await?;
    let method = method_from_row(&row);
    tracing::info!(%user_id, payment_method_id = %method.id, "payment method added");
    Ok(method)
}

/// Replace a saved card's details. An edit may omit the CVV.
pub async fn update_method(pool: &PgPool, user_id: Uuid, id: Uuid, form: &CardForm) -> Result<PaymentMethod, PaymentError> {
    let masked = masked_card(form, false)?;
    let row = sqlx::query(
        r"UPDATE payment_methods SET card_type = $3, masked_number = $4, expiry_date = $5
          WHERE id = $1 AND user_id = $2
          RETURNING id, card_type, masked_number, expiry_date",
    )
    .bind(id)
    .bind(user_id)
    .bind(form.card_type.trim())
    .bind(masked)
    .bind(form.expiry_date.trim())
    .fetch_optional(pool)
    .await?
    .ok_or(PaymentError::NotFound)?;
    Ok(method_from_row(&row))
}

pub async fn delete_method(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), PaymentError> {
    let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(PaymentError::NotFound);
    }
    Ok(())
}

// =============================================================================
// CHECKOUT
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    #[serde(alias = "booking_id")]
    pub booking_id: Uuid,
    #[serde(default)]
    pub amount: Option<ClientAmount>,
    #[serde(default, alias = "room_type")]
    pub room_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl CheckoutSessionRequest {
    /// The billing form, if the client sent any address field.
    fn billing_form(&self) -> Option<CheckoutForm> {
        let fields = [&self.address, &self.city, &self.state, &self.postal_code];
        if fields.iter().all(|f| f.is_none()) {
            return None;
        }
        let owned = |f: Option<&str>| f.unwrap_or_default().to_owned();
        Some(CheckoutForm {
            email: owned(self.email.as_deref()),
            address: owned(self.address.as_deref()),
            city: owned(self.city.as_deref()),
            state: owned(self.state.as_deref()),
            postal_code: owned(self.postal_code.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionCreated {
    pub url: String,
    pub session_id: Uuid,
    pub amount: f64,
    pub currency: String,
}

/// Line-item label, e.g. `Marriott, Deluxe King, 2 nights from 04-07-2025`.
fn describe(hotel_name: &str, room: Option<&str>, nights: i32, check_in: Date) -> String {
    let nights = if nights == 1 { "1 night".to_owned() } else { format!("{nights} nights") };
    let from = pricing::format_stay_date(check_in);
    match room.map(str::trim).filter(|r| !r.is_empty()) {
        Some(room) => format!("{hotel_name}, {room}, {nights} from {from}"),
        None => format!("{hotel_name}, {nights} from {from}"),
    }
}

/// Open a checkout session for one of the user's bookings, charging the stored total.
///
/// A billing address, when present, is validated before anything is looked up.
pub async fn start_checkout(
    pool: &PgPool,
    gateway: &Arc<dyn CheckoutGateway>,
    config: &AppConfig,
    user_id: Uuid,
    request: &CheckoutSessionRequest,
) -> Result<CheckoutSessionCreated, PaymentError> {
    if let Some(form) = request.billing_form() {
        validation::validate_checkout(&form)?;
    }

    let row = sqlx::query(
        r"SELECT b.status, b.total_price, b.nights, b.check_in, b.customer_email, h.name AS hotel_name, r.description AS room_name
          FROM bookings b
          JOIN hotels h ON h.id = b.hotel_id
          JOIN rooms r ON r.id = b.room_id
          WHERE b.id = $1 AND b.user_id = $2",
    )
    .bind(request.booking_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(PaymentError::BookingNotFound)?;

    let status: String = row.get("status");
    if status == "cancelled" {
        return Err(PaymentError::BookingCancelled);
    }

    let total: f64 = row.get("total_price");
    let amount_cents = checkout::amount_to_cents(total).ok_or(PaymentError::InvalidAmount)?;
    if booking::total_mismatch(request.amount.as_ref(), total) {
        tracing::warn!(booking_id = %request.booking_id, client_amount = ?request.amount, total, "checkout amount disagrees with booking total");
    }

    let hotel_name: String = row.get("hotel_name");
    let room_name: String = row.get("room_name");
    let room = request.room_type.as_deref().or(Some(room_name.as_str()));
    let customer_email = request
        .email
        .as_deref()
        .filter(|e| validation::is_loose_email(e))
        .map_or_else(|| row.get::<String, _>("customer_email"), str::to_owned);

    let base = &config.public_base_url;
    let checkout_request = CheckoutRequest {
        booking_id: request.booking_id,
        amount_cents,
        currency: config.currency.clone(),
        description: describe(&hotel_name, room, row.get("nights"), row.get("check_in")),
        customer_email,
        success_url: format!("{base}/booking-confirmation?booking={}", request.booking_id),
        cancel_url: format!("{base}/user-profile/bookings"),
    };

    let session = gateway.create_session(&checkout_request).await?;

    let session_id: Uuid = sqlx::query_scalar(
        r"INSERT INTO checkout_sessions (booking_id, amount, currency, provider_ref, url)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id",
    )
    .bind(request.booking_id)
    .bind(total)
    .bind(&config.currency)
    .bind(&session.provider_ref)
    .bind(&session.url)
    .fetch_one(pool)
    .await?;

    tracing::info!(%session_id, booking_id = %request.booking_id, gateway = gateway.name(), "checkout session created");
    Ok(CheckoutSessionCreated { url: session.url, session_id, amount: total, currency: config.currency.clone() })
}

#[cfg(test)]
#[path = "payment_test.rs"]
mod tests;
