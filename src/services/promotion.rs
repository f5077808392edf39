//! Promotion service — admin CRUD over hotel discounts.
//!
//! A promotion is live on a date when it is active and the date falls in
//! `start_date..=end_date`. When several are live for one hotel the largest
//! discount wins; discounts never stack.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool, Row};
use time::Date;
use uuid::Uuid;

use crate::services::hotel;

#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error("promotion not found")]
    NotFound,
    #[error("hotel not found: {0}")]
    HotelNotFound(String),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("discount must be greater than 0 and at most 100")]
    InvalidDiscount,
    #[error("end date cannot be before start date")]
    InvalidDateRange,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct Promotion {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub hotel_code: String,
    pub title: String,
    pub description: String,
    pub discount_percentage: f64,
    #[serde(with = "crate::services::iso_date")]
    pub start_date: Date,
    #[serde(with = "crate::services::iso_date")]
    pub end_date: Date,
    pub is_active: bool,
    /// Whether the promotion applies today.
    pub live: bool,
}

impl Promotion {
    #[must_use]
    pub fn is_live(&self, on: Date) -> bool {
        self.is_active && self.start_date <= on && on <= self.end_date
    }
}

/// Create/update payload. `hotel_id` accepts the hotel uuid or its code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionForm {
    #[serde(alias = "hotel_id")]
    pub hotel_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "discount_percentage")]
    pub discount_percentage: f64,
    #[serde(alias = "start_date", with = "crate::services::iso_date")]
    pub start_date: Date,
    #[serde(alias = "end_date", with = "crate::services::iso_date")]
    pub end_date: Date,
    #[serde(alias = "is_active", default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl PromotionForm {
    /// # Errors
    ///
    /// Returns the first rule the form breaks.
    pub fn validate(&self) -> Result<(), PromotionError> {
        if self.title.trim().is_empty() {
            return Err(PromotionError::EmptyTitle);
        }
        let d = self.discount_percentage;
        if !d.is_finite() || d <= 0.0 || d > 100.0 {
            return Err(PromotionError::InvalidDiscount);
        }
        if self.end_date < self.start_date {
            return Err(PromotionError::InvalidDateRange);
        }
        Ok(())
    }
}

const SELECT_PROMOTION: &str = r"
    SELECT p.id, p.hotel_id, h.code AS hotel_code, p.title, p.description, p.discount_percentage,
           p.start_date, p.end_date, p.is_active
    FROM promotions p
    JOIN hotels h ON h.id = p.hotel_id";

fn promotion_from_row(row: &PgRow, today: Date) -> Promotion {
    let mut promotion = Promotion {
        id: row.get("id"),
        hotel_id: row.get("hotel_id"),
        hotel_code: row.get("hotel_code"),
        title: row.get("title"),
        description: row.get("description"),
        discount_percentage: row.get("discount_percentage"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        is_active: row.get("is_active"),
        live: false,
    };
    promotion.live = promotion.is_live(today);
    promotion
}

pub async fn list_promotions(pool: &PgPool, today: Date) -> Result<Vec<Promotion>, PromotionError> {
    let rows = sqlx::query(&format!("{SELECT_PROMOTION} ORDER BY p.start_date DESC, p.created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(|r| promotion_from_row(r, today)).collect())
}

async fn get_promotion(pool: &PgPool, id: Uuid, today: Date) -> Result<Promotion, PromotionError> {
    let row = sqlx::query(&format!("{SELECT_PROMOTION} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(PromotionError::NotFound)?;
    Ok(promotion_from_row(&row, today))
}

/// Discount percentages of promotions live on `on` for a hotel, largest first.
pub async fn live_discounts(executor: impl PgExecutor<'_>, hotel_id: Uuid, on: Date) -> Result<Vec<f64>, sqlx::Error> {
    let rows = sqlx::query(
        r"SELECT discount_percentage FROM promotions
          WHERE hotel_id = $1 AND is_active AND start_date <= $2 AND end_date >= $2
          ORDER BY discount_percentage DESC",
    )
    .bind(hotel_id)
    .bind(on)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(|r| r.get("discount_percentage")).collect())
}

async fn resolve_hotel(pool: &PgPool, key: &str) -> Result<Uuid, PromotionError> {
    hotel::resolve_hotel_id(pool, key)
        .await?
        .ok_or_else(|| PromotionError::HotelNotFound(key.to_owned()))
}

pub async fn create_promotion(pool: &PgPool, form: &PromotionForm, today: Date) -> Result<Promotion, PromotionError> {
    form.validate()?;
    let hotel_id = resolve_hotel(pool, &form.hotel_id).await?;

    let row = sqlx::query(
        r"INSERT INTO promotions (hotel_id, title, description, discount_percentage, start_date, end_date, is_active)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          RETURNING id",
    )
    .bind(hotel_id)
    .bind(form.title.trim())
    .bind(form.description.trim())
    .bind(form.discount_percentage)
    .bind(form.start_date)
    .bind(form.end_date)
    .bind(form.is_active)
    .fetch_one(pool)
    .await?;

    let id: Uuid = row.get("id");
    tracing::info!(promotion_id = %id, %hotel_id, discount = form.discount_percentage, "promotion created");
    get_promotion(pool, id, today).await
}

pub async fn update_promotion(pool: &PgPool, id: Uuid, form: &PromotionForm, today: Date) -> Result<Promotion, PromotionError> {
    form.validate()?;
    let hotel_id = resolve_hotel(pool, &form.hotel_id).await?;

    let result = sqlx::query(
        r"UPDATE promotions
          SET hotel_id = $2, title = $3, description = $4, discount_percentage = $5,
              start_date = $6, end_date = $7, is_active = $8
          WHERE id = $1",
    )
    .bind(id)
    .bind(hotel_id)
    .bind(form.title.trim())
    .bind(form.description.trim())
    .bind(form.discount_percentage)
    .bind(form.start_date)
    .bind(form.end_date)
    .bind(form.is_active)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(PromotionError::NotFound);
    }
    get_promotion(pool, id, today).await
}

/// Flip `is_active` and return the updated promotion.
pub async fn toggle_promotion(pool: &PgPool, id: Uuid, today: Date) -> Result<Promotion, PromotionError> {
    let result = sqlx::query("UPDATE promotions SET is_active = NOT is_active WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(PromotionError::NotFound);
    }
    get_promotion(pool, id, today).await
}

pub async fn delete_promotion(pool: &PgPool, id: Uuid) -> Result<(), PromotionError> {
    let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(PromotionError::NotFound);
    }
    tracing::info!(promotion_id = %id, "promotion deleted");
    Ok(())
}

#[cfg(test)]
#[path = "promotion_test.rs"]
mod tests;
