//! Booking service — quotes, reservations, cancellation.
//!
//! DESIGN
//! ======
//! The server never trusts a client-supplied total. Every booking is priced
//! from the stored room rate and the best promotion live on the booking day;
//! a client total that disagrees is logged and ignored.
//!
//! Overbooking is prevented inside the booking transaction: the room row is
//! locked `FOR UPDATE`, then rooms already held by overlapping `booked` or
//! `pending` reservations are summed against the room's inventory. Stays are
//! inclusive of both dates, so two stays overlap when each starts on or
//! before the other ends.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::pricing::{self, PriceQuote, PricingError, QuoteInput};
use crate::services::{hotel, promotion};
use crate::validation;

/// Tolerance when comparing a client total against the server price.
const TOTAL_TOLERANCE: f64 = 0.01;

/// Booking statuses that hold rooms: counted against inventory and occupancy.
pub(crate) const HOLDING_STATUSES: [&str; 2] = ["booked", "pending"];

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("hotel not found: {0}")]
    HotelNotFound(String),
    #[error("room not found")]
    RoomNotFound,
    #[error("room is not available for booking")]
    RoomUnavailable,
    #[error("only {available} room(s) left for these dates")]
    SoldOut { available: i64 },
    #[error("at most {max} room(s) per booking")]
    TooManyRooms { max: i32 },
    #[error("at most {max} guest(s) per booking")]
    TooManyGuests { max: i32 },
    #[error("room count and guest count must be at least 1")]
    EmptyBooking,
    #[error("check-in date cannot be in the past")]
    CheckInInPast,
    #[error("a valid customer email is required")]
    InvalidEmail,
    #[error("booking not found")]
    NotFound,
    #[error("booking is already cancelled")]
    AlreadyCancelled,
    #[error("bookings can only be cancelled before the check-in date")]
    CancellationClosed,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Cancelled,
    Pending,
    Expired,
}

impl BookingStatus {
    /// Parse a stored status. `expired` is never stored.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "booked" => Some(Self::Booked),
            "cancelled" => Some(Self::Cancelled),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Status as shown to the guest: an open booking whose check-out has
    /// passed is expired.
    #[must_use]
    pub fn derive(stored: Self, check_out: Date, today: Date) -> Self {
        match stored {
            Self::Booked | Self::Pending if check_out < today => Self::Expired,
            other => other,
        }
    }
}

// =============================================================================
// CLIENT AMOUNTS
// =============================================================================

/// A total as the UI sends it: a number, or a display string such as `"1,234.50"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClientAmount {
    Number(f64),
    Text(String),
}

impl ClientAmount {
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => pricing::parse_price(s),
        }
    }
}

/// Whether a client total disagrees with the server total.
#[must_use]
pub fn total_mismatch(client: Option<&ClientAmount>, server_total: f64) -> bool {
    client
        .and_then(ClientAmount::value)
        .is_some_and(|v| (v - pricing::round_cents(server_total)).abs() > TOTAL_TOLERANCE)
}

// =============================================================================
// QUOTES
// =============================================================================

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub room_id: Uuid,
    #[serde(default = "default_one")]
    pub rooms: u32,
    pub check_in: String,
    #[serde(default)]
    pub check_out: Option<String>,
}

/// Parsed stay dates plus the inclusive night count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    pub check_in: Date,
    pub check_out: Date,
    pub nights: u32,
}

impl Stay {
    /// # Errors
    ///
    /// Returns an error for unparsable dates or a check-out before check-in.
    pub fn parse(check_in: &str, check_out: Option<&str>) -> Result<Self, PricingError> {
        let check_in = pricing::parse_stay_date(check_in)?;
        let check_out = match check_out.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(pricing::parse_stay_date(raw)?),
            None => None,
        };
        let nights = pricing::stay_nights(check_in, check_out)?;
        Ok(Self { check_in, check_out: check_out.unwrap_or(check_in), nights })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StayQuote {
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    #[serde(with = "crate::services::iso_date")]
    pub check_in: Date,
    #[serde(with = "crate::services::iso_date")]
    pub check_out: Date,
    #[serde(flatten)]
    pub price: PriceQuote,
    pub payable_total: f64,
    pub formatted_total: String,
}

fn price_stay(rate: f64, rooms: u32, stay: Stay, discount: f64) -> Result<PriceQuote, BookingError> {
    let input = QuoteInput { nightly_rate: Some(rate), rooms, nights: stay.nights, discount_percentage: discount };
    pricing::quote(&input)?.ok_or(BookingError::EmptyBooking)
}

/// Price a stay without reserving anything.
pub async fn quote_stay(pool: &PgPool, hotel_key: &str, request: &QuoteRequest, today: Date) -> Result<StayQuote, BookingError> {
    if request.rooms == 0 {
        return Err(BookingError::EmptyBooking);
    }
    let stay = Stay::parse(&request.check_in, request.check_out.as_deref())?;
    let hotel_id = hotel::resolve_hotel_id(pool, hotel_key)
        .await?
        .ok_or_else(|| BookingError::HotelNotFound(hotel_key.to_owned()))?;

    let rate: f64 = sqlx::query_scalar("SELECT price FROM rooms WHERE id = $1 AND hotel_id = $2")
        .bind(request.room_id)
        .bind(hotel_id)
        .fetch_optional(pool)
        .await?
        .ok_or(BookingError::RoomNotFound)?;

    let discount = promotion::live_discounts(pool, hotel_id, today).await?.first().copied().unwrap_or(0.0);
    let price = price_stay(rate, request.rooms, stay, discount)?;

    Ok(StayQuote {
        hotel_id,
        room_id: request.room_id,
        check_in: stay.check_in,
        check_out: stay.check_out,
        payable_total: pricing::round_cents(price.payable_total()),
        formatted_total: pricing::format_price(price.payable_total()),
        price,
    })
}

// =============================================================================
// CREATE
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    /// Hotel uuid or code.
    pub hotel_id: String,
    pub room_id: Uuid,
    pub check_in: String,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default = "default_one")]
    pub rooms: u32,
    #[serde(default = "default_one")]
    pub guests: u32,
    #[serde(default)]
    pub total_price: Option<ClientAmount>,
    pub customer_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub rooms: i32,
    pub guests: i32,
    #[serde(with = "crate::services::iso_date")]
    pub check_in: Date,
    #[serde(with = "crate::services::iso_date")]
    pub check_out: Date,
    pub nights: i32,
    pub status: BookingStatus,
    pub subtotal: f64,
    pub taxes: f64,
    pub discount_percentage: f64,
    pub total_price: f64,
    pub customer_email: String,
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Reserve rooms for a user. Runs in one transaction with the room row locked.
pub async fn create_booking(pool: &PgPool, user_id: Uuid, request: &BookingRequest, today: Date) -> Result<Booking, BookingError> {
    if request.rooms == 0 || request.guests == 0 {
        return Err(BookingError::EmptyBooking);
    }
    if !validation::is_loose_email(&request.customer_email) {
        return Err(BookingError::InvalidEmail);
    }
    let stay = Stay::parse(&request.check_in, request.check_out.as_deref())?;
    if stay.check_in < today {
        return Err(BookingError::CheckInInPast);
    }

    let mut tx = pool.begin().await?;

    let hotel_id = hotel::resolve_hotel_id(tx.as_mut(), &request.hotel_id)
        .await?
        .ok_or_else(|| BookingError::HotelNotFound(request.hotel_id.clone()))?;

    let limits = sqlx::query("SELECT max_guests_allowed, max_rooms_per_booking FROM hotels WHERE id = $1")
        .bind(hotel_id)
        .fetch_one(tx.as_mut())
        .await?;
    let max_guests: i32 = limits.get("max_guests_allowed");
    let max_rooms: i32 = limits.get("max_rooms_per_booking");
    if to_i32(request.rooms) > max_rooms {
        return Err(BookingError::TooManyRooms { max: max_rooms });
    }
    if to_i32(request.guests) > max_guests {
        return Err(BookingError::TooManyGuests { max: max_guests });
    }

    let room = sqlx::query("SELECT price, inventory, is_available FROM rooms WHERE id = $1 AND hotel_id = $2 FOR UPDATE")
        .bind(request.room_id)
        .bind(hotel_id)
        .fetch_optional(tx.as_mut())
        .await?
        .ok_or(BookingError::RoomNotFound)?;
    if !room.get::<bool, _>("is_available") {
        return Err(BookingError::RoomUnavailable);
    }
    let rate: f64 = room.get("price");
    let inventory = i64::from(room.get::<i32, _>("inventory"));

    let taken: i64 = sqlx::query_scalar(
        r"SELECT COALESCE(SUM(rooms), 0)::bigint FROM bookings
          WHERE room_id = $1
            AND status = ANY($4)
            AND check_in <= $3
            AND check_out >= $2",
    )
    .bind(request.room_id)
    .bind(stay.check_in)
    .bind(stay.check_out)
    .bind(&HOLDING_STATUSES[..])
    .fetch_one(tx.as_mut())
    .await?;

    if taken + i64::from(request.rooms) > inventory {
        return Err(BookingError::SoldOut { available: (inventory - taken).max(0) });
    }

    let discount = promotion::live_discounts(tx.as_mut(), hotel_id, today)
        .await?
        .first()
        .copied()
        .unwrap_or(0.0);
    let price = price_stay(rate, request.rooms, stay, discount)?;
    let total = pricing::round_cents(price.payable_total());

    if total_mismatch(request.total_price.as_ref(), total) {
        tracing::warn!(
            client_total = ?request.total_price,
            server_total = total,
            %hotel_id,
            "client total disagrees with server price; using server price"
        );
    }

    let row = sqlx::query(
        r"INSERT INTO bookings
              (user_id, hotel_id, room_id, rooms, guests, check_in, check_out, nights, status,
               subtotal, taxes, discount_percentage, total_price, customer_email)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'booked', $9, $10, $11, $12, $13)
          RETURNING id",
    )
    .bind(user_id)
    .bind(hotel_id)
    .bind(request.room_id)
    .bind(to_i32(request.rooms))
    .bind(to_i32(request.guests))
    .bind(stay.check_in)
    .bind(stay.check_out)
    .bind(to_i32(stay.nights))
    .bind(pricing::round_cents(price.payable_subtotal()))
    .bind(pricing::round_cents(price.payable_taxes()))
    .bind(price.discount_percentage)
    .bind(total)
    .bind(request.customer_email.trim())
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;

    let id: Uuid = row.get("id");
    tracing::info!(booking_id = %id, %user_id, %hotel_id, nights = stay.nights, total, "booking created");

    Ok(Booking {
        id,
        hotel_id,
        room_id: request.room_id,
        rooms: to_i32(request.rooms),
        guests: to_i32(request.guests),
        check_in: stay.check_in,
        check_out: stay.check_out,
        nights: to_i32(stay.nights),
        status: BookingStatus::Booked,
        subtotal: pricing::round_cents(price.payable_subtotal()),
        taxes: pricing::round_cents(price.payable_taxes()),
        discount_percentage: price.discount_percentage,
        total_price: total,
        customer_email: request.customer_email.trim().to_owned(),
    })
}

// =============================================================================
// LIST
// =============================================================================

/// A booking as listed on the profile page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub booking_id: Uuid,
    pub hotel_id: Uuid,
    pub hotel_code: String,
    pub hotel_name: String,
    pub room_name: String,
    #[serde(with = "crate::services::iso_date")]
    pub booking_date: Date,
    #[serde(with = "crate::services::iso_date")]
    pub check_in_date: Date,
    #[serde(with = "crate::services::iso_date")]
    pub check_out_date: Date,
    pub nights: i32,
    pub rooms: i32,
    pub total_price: f64,
    /// Display string, e.g. `"€1,23,456.00"`.
    pub total_fare: String,
    pub status: BookingStatus,
    pub can_cancel: bool,
}

fn reservation_from_row(row: &PgRow, today: Date) -> Reservation {
    let stored: String = row.get("status");
    let stored = BookingStatus::from_stored(&stored).unwrap_or(BookingStatus::Pending);
    let check_in: Date = row.get("check_in");
    let check_out: Date = row.get("check_out");
    let created_at: OffsetDateTime = row.get("created_at");
    let total: f64 = row.get("total_price");
    let status = BookingStatus::derive(stored, check_out, today);

    Reservation {
        booking_id: row.get("id"),
        hotel_id: row.get("hotel_id"),
        hotel_code: row.get("hotel_code"),
        hotel_name: row.get("hotel_name"),
        room_name: row.get("room_name"),
        booking_date: created_at.date(),
        check_in_date: check_in,
        check_out_date: check_out,
        nights: row.get("nights"),
        rooms: row.get("rooms"),
        total_price: total,
        total_fare: format!("€{}", pricing::format_price(total)),
        status,
        can_cancel: can_cancel(status, check_in, today),
    }
}

/// Only open bookings whose check-in is still ahead can be cancelled.
#[must_use]
pub fn can_cancel(status: BookingStatus, check_in: Date, today: Date) -> bool {
    matches!(status, BookingStatus::Booked | BookingStatus::Pending) && check_in > today
}

pub async fn list_reservations(pool: &PgPool, user_id: Uuid, today: Date) -> Result<Vec<Reservation>, BookingError> {
    let rows = sqlx::query(
        r"SELECT b.id, b.hotel_id, h.code AS hotel_code, h.name AS hotel_name, r.description AS room_name,
                 b.created_at, b.check_in, b.check_out, b.nights, b.rooms, b.total_price, b.status
          FROM bookings b
          JOIN hotels h ON h.id = b.hotel_id
          JOIN rooms r ON r.id = b.room_id
          WHERE b.user_id = $1
          ORDER BY b.check_in DESC, b.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|r| reservation_from_row(r, today)).collect())
}

// =============================================================================
// CANCEL
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Cancellation {
    pub id: Uuid,
    pub status: BookingStatus,
    pub refund_amount: f64,
}

/// Cancel one of the user's bookings. Other users' bookings are reported as not found.
pub async fn cancel_booking(pool: &PgPool, user_id: Uuid, booking_id: Uuid, today: Date) -> Result<Cancellation, BookingError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query("SELECT status, check_in, total_price FROM bookings WHERE id = $1 AND user_id = $2 FOR UPDATE")
        .bind(booking_id)
        .bind(user_id)
        .fetch_optional(tx.as_mut())
        .await?
        .ok_or(BookingError::NotFound)?;

    let stored: String = row.get("status");
    if stored == "cancelled" {
        return Err(BookingError::AlreadyCancelled);
    }
    let check_in: Date = row.get("check_in");
    if check_in <= today {
        return Err(BookingError::CancellationClosed);
    }

    sqlx::query("UPDATE bookings SET status = 'cancelled', updated_at = now() WHERE id = $1")
        .bind(booking_id)
        .execute(tx.as_mut())
        .await?;
    tx.commit().await?;

    tracing::info!(%booking_id, %user_id, "booking cancelled");
    Ok(Cancellation { id: booking_id, status: BookingStatus::Cancelled, refund_amount: row.get("total_price") })
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
