//! Hotel service — search, details, and booking enquiry.
//!
//! Hotels are addressed by uuid or by their human code (`HTL-001`); every
//! path parameter goes through `resolve_hotel_id`.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool, Row};
use time::Date;
use uuid::Uuid;

use crate::envelope::Paging;
use crate::services::promotion;

pub const SEARCH_PAGE_SIZE: i64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum HotelError {
    #[error("hotel not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Look up a hotel id by uuid or code.
pub async fn resolve_hotel_id(executor: impl PgExecutor<'_>, key: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let key = key.trim();
    let row = if let Ok(id) = Uuid::parse_str(key) {
        sqlx::query("SELECT id FROM hotels WHERE id = $1").bind(id).fetch_optional(executor).await?
    } else {
        sqlx::query("SELECT id FROM hotels WHERE upper(code) = upper($1)")
            .bind(key)
            .fetch_optional(executor)
            .await?
    };
    Ok(row.map(|r| r.get("id")))
}

async fn require_hotel_id(pool: &PgPool, key: &str) -> Result<Uuid, HotelError> {
    resolve_hotel_id(pool, key).await?.ok_or_else(|| HotelError::NotFound(key.to_owned()))
}

/// Render live discounts as the badges the UI shows (`"20%"`).
#[must_use]
pub fn promotion_badges(discounts: &[f64]) -> Vec<String> {
    discounts
        .iter()
        .map(|d| if d.fract() == 0.0 { format!("{d:.0}%") } else { format!("{d}%") })
        .collect()
}

// =============================================================================
// SEARCH
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelSearch {
    pub city: Option<String>,
    /// Free-text match against name and description.
    pub q: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub city: String,
    pub address: String,
    pub image: Option<String>,
    pub rating_average: f64,
    pub rating_count: i64,
    /// Cheapest available room rate, if any room is bookable.
    pub starting_price: Option<f64>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

pub async fn search_hotels(pool: &PgPool, search: &HotelSearch) -> Result<(Vec<HotelSummary>, Paging), HotelError> {
    let city = non_blank(search.city.as_deref());
    let pattern = non_blank(search.q.as_deref()).map(|q| format!("%{q}%"));

    let total: i64 = sqlx::query_scalar(
        r"SELECT count(*) FROM hotels
          WHERE ($1::text IS NULL OR lower(city) = lower($1))
            AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)",
    )
    .bind(&city)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let paging = Paging::new(search.page.unwrap_or(1), SEARCH_PAGE_SIZE, total);

    let rows = sqlx::query(
        r"SELECT h.id, h.code, h.name, h.city, h.address, h.images[1] AS image,
                 h.rating_average, h.rating_count,
                 (SELECT min(r.price) FROM rooms r WHERE r.hotel_id = h.id AND r.is_available) AS starting_price
          FROM hotels h
          WHERE ($1::text IS NULL OR lower(h.city) = lower($1))
            AND ($2::text IS NULL OR h.name ILIKE $2 OR h.description ILIKE $2)
          ORDER BY h.rating_average DESC, h.name
          LIMIT $3 OFFSET $4",
    )
    .bind(&city)
    .bind(&pattern)
    .bind(paging.page_size)
    .bind(paging.offset())
    .fetch_all(pool)
    .await?;

    let hotels = rows
        .iter()
        .map(|r| HotelSummary {
            id: r.get("id"),
            code: r.get("code"),
            name: r.get("name"),
            city: r.get("city"),
            address: r.get("address"),
            image: r.get("image"),
            rating_average: r.get("rating_average"),
            rating_count: r.get("rating_count"),
            starting_price: r.get("starting_price"),
        })
        .collect();

    Ok((hotels, paging))
}

// =============================================================================
// DETAILS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HotelDetails {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: String,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub rating_average: f64,
    pub rating_count: i64,
    /// Live promotion badges, largest first.
    pub promotions: Vec<String>,
}

fn details_from_row(row: &PgRow, promotions: Vec<String>) -> HotelDetails {
    HotelDetails {
        id: row.get("id"),
        code: row.get("code"),
        name: row.get("name"),
        address: row.get("address"),
        city: row.get("city"),
        country: row.get("country"),
        phone: row.get("contact_phone"),
        email: row.get("contact_email"),
        description: row.get("description"),
        features: row.get("features"),
        images: row.get("images"),
        rating_average: row.get("rating_average"),
        rating_count: row.get("rating_count"),
        promotions,
    }
}

pub async fn get_hotel(pool: &PgPool, key: &str, today: Date) -> Result<HotelDetails, HotelError> {
    let id = require_hotel_id(pool, key).await?;
    let row = sqlx::query(
        r"SELECT id, code, name, address, city, country, contact_phone, contact_email, description,
                 features, images, rating_average, rating_count
          FROM hotels WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| HotelError::NotFound(key.to_owned()))?;

    let discounts = promotion::live_discounts(pool, id, today).await?;
    Ok(details_from_row(&row, promotion_badges(&discounts)))
}

// =============================================================================
// BOOKING ENQUIRY
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub description: String,
    pub room_type: String,
    pub capacity: i32,
    pub price: f64,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEnquiry {
    pub hotel_id: Uuid,
    pub rooms: Vec<Room>,
    pub cancellation_policy: String,
    pub check_in_time: String,
    pub check_out_time: String,
    pub max_guests_allowed: i32,
    pub max_rooms_allowed_per_guest: i32,
    /// Best live discount today, 0 when none.
    pub current_discount: f64,
}

pub async fn booking_enquiry(pool: &PgPool, key: &str, today: Date) -> Result<BookingEnquiry, HotelError> {
    let id = require_hotel_id(pool, key).await?;
    let hotel = sqlx::query(
        r"SELECT cancellation_policy, check_in_time, check_out_time, max_guests_allowed, max_rooms_per_booking
          FROM hotels WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| HotelError::NotFound(key.to_owned()))?;

    let rooms = sqlx::query(
        "SELECT id, description, room_type, capacity, price, is_available FROM rooms WHERE hotel_id = $1 ORDER BY price",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(|r| Room {
        id: r.get("id"),
        description: r.get("description"),
        room_type: r.get("room_type"),
        capacity: r.get("capacity"),
        price: r.get("price"),
        is_available: r.get("is_available"),
    })
    .collect();

    let discounts = promotion::live_discounts(pool, id, today).await?;

    Ok(BookingEnquiry {
        hotel_id: id,
        rooms,
        cancellation_policy: hotel.get("cancellation_policy"),
        check_in_time: hotel.get("check_in_time"),
        check_out_time: hotel.get("check_out_time"),
        max_guests_allowed: hotel.get("max_guests_allowed"),
        max_rooms_allowed_per_guest: hotel.get("max_rooms_per_booking"),
        current_discount: discounts.first().copied().unwrap_or(0.0),
    })
}

#[cfg(test)]
#[path = "hotel_test.rs"]
mod tests;
