//! Review service — listing, submission, and the rating aggregate.
//!
//! DESIGN
//! ======
//! The aggregate (`average_rating`, `total_reviews`, per-star counts) is
//! merged in place when a review arrives rather than recomputed:
//! `avg' = (avg × n + r) / (n + 1)`. The hotel row carries the running
//! average and count so search results can sort by rating without a scan.
//! Per-star counts are read with a grouped count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::envelope::Paging;
use crate::services::hotel;
use crate::services::session::SessionUser;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),
    #[error("hotel not found: {0}")]
    HotelNotFound(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// AGGREGATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
    /// Star value → number of reviews with that rating. All five keys are present.
    pub star_counts: BTreeMap<u8, i64>,
}

impl Default for ReviewSummary {
    fn default() -> Self {
        Self {
            average_rating: 0.0,
            total_reviews: 0,
            star_counts: (MIN_RATING..=MAX_RATING).map(|s| (s, 0)).collect(),
        }
    }
}

impl ReviewSummary {
    /// Merge one new rating into the aggregate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRating` for values outside 1..=5; the summary is left unchanged.
    pub fn record(&mut self, rating: i64) -> Result<(), ReviewError> {
        let star = validate_rating(rating)?;
        #[allow(clippy::cast_precision_loss)]
        let n = self.total_reviews as f64;
        self.average_rating = (self.average_rating * n + f64::from(star)) / (n + 1.0);
        self.total_reviews += 1;
        *self.star_counts.entry(star).or_insert(0) += 1;
        Ok(())
    }
}

/// # Errors
///
/// Returns `InvalidRating` outside 1..=5.
pub fn validate_rating(rating: i64) -> Result<u8, ReviewError> {
    u8::try_from(rating)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or(ReviewError::InvalidRating(rating))
}

async fn load_summary(conn: &mut PgConnection, hotel_id: Uuid) -> Result<ReviewSummary, sqlx::Error> {
    let hotel = sqlx::query("SELECT rating_average, rating_count FROM hotels WHERE id = $1")
        .bind(hotel_id)
        .fetch_one(&mut *conn)
        .await?;
    let rows = sqlx::query("SELECT rating, count(*) AS n FROM reviews WHERE hotel_id = $1 GROUP BY rating")
        .bind(hotel_id)
        .fetch_all(&mut *conn)
        .await?;

    let mut summary = ReviewSummary {
        average_rating: hotel.get("rating_average"),
        total_reviews: hotel.get("rating_count"),
        ..ReviewSummary::default()
    };
    for row in &rows {
        let rating: i16 = row.get("rating");
        if let Ok(star) = u8::try_from(rating) {
            summary.star_counts.insert(star, row.get("n"));
        }
    }
    Ok(summary)
}

// =============================================================================
// LIST
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Reviewer {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub user: Reviewer,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub elements: Vec<Review>,
}

/// Split a stored display name back into first/last for the UI.
fn reviewer_from_name(name: &str) -> Reviewer {
    let name = name.trim();
    match name.split_once(' ') {
        Some((first, last)) => Reviewer { first_name: first.to_owned(), last_name: last.trim().to_owned() },
        None => Reviewer { first_name: name.to_owned(), last_name: String::new() },
    }
}

pub async fn list_reviews(
    pool: &PgPool,
    hotel_key: &str,
    current_page: i64,
    page_size: i64,
) -> Result<(ReviewPage, ReviewSummary, Paging), ReviewError> {
    let hotel_id = hotel::resolve_hotel_id(pool, hotel_key)
        .await?
        .ok_or_else(|| ReviewError::HotelNotFound(hotel_key.to_owned()))?;

    let mut conn = pool.acquire().await?;
    let summary = load_summary(&mut conn, hotel_id).await?;
    drop(conn);
    let total: i64 = sqlx::query_scalar("SELECT count(*) FROM reviews WHERE hotel_id = $1")
        .bind(hotel_id)
        .fetch_one(pool)
        .await?;
    let paging = Paging::new(current_page, page_size, total);

    let rows = sqlx::query(
        r"SELECT id, hotel_id, rating, comment, reviewer_name, created_at
          FROM reviews WHERE hotel_id = $1
          ORDER BY created_at DESC
          LIMIT $2 OFFSET $3",
    )
    .bind(hotel_id)
    .bind(paging.page_size)
    .bind(paging.offset())
    .fetch_all(pool)
    .await?;

    let elements = rows
        .iter()
        .map(|r| {
            let rating: i16 = r.get("rating");
            let name: String = r.get("reviewer_name");
            Review {
                id: r.get("id"),
                hotel_id: r.get("hotel_id"),
                rating: u8::try_from(rating).unwrap_or(MIN_RATING),
                comment: r.get("comment"),
                user: reviewer_from_name(&name),
                created_at: r.get("created_at"),
            }
        })
        .collect();

    Ok((ReviewPage { elements }, summary, paging))
}

// =============================================================================
// SUBMIT
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub hotel_id: String,
    pub rating: i64,
    #[serde(default, alias = "comment")]
    pub review: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReview {
    #[serde(flatten)]
    pub review: Review,
    pub summary: ReviewSummary,
}

/// Insert a review and merge it into the hotel aggregate in one transaction.
pub async fn add_review(pool: &PgPool, user: &SessionUser, input: &NewReview) -> Result<SubmittedReview, ReviewError> {
    let star = validate_rating(input.rating)?;

    let mut tx = pool.begin().await?;
    let hotel_id = hotel::resolve_hotel_id(tx.as_mut(), &input.hotel_id)
        .await?
        .ok_or_else(|| ReviewError::HotelNotFound(input.hotel_id.clone()))?;

    // Lock the hotel row so concurrent submissions merge serially.
    sqlx::query("SELECT id FROM hotels WHERE id = $1 FOR UPDATE")
        .bind(hotel_id)
        .execute(tx.as_mut())
        .await?;
    let mut summary = load_summary(&mut tx, hotel_id).await?;

    let reviewer_name = user.display_name();
    let row = sqlx::query(
        r"INSERT INTO reviews (hotel_id, user_id, reviewer_name, rating, comment)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id, created_at",
    )
    .bind(hotel_id)
    .bind(user.id)
    .bind(&reviewer_name)
    .bind(i16::from(star))
    .bind(input.review.trim())
    .fetch_one(tx.as_mut())
    .await?;

    summary.record(i64::from(star))?;

    sqlx::query("UPDATE hotels SET rating_average = $2, rating_count = $3 WHERE id = $1")
        .bind(hotel_id)
        .bind(summary.average_rating)
        .bind(summary.total_reviews)
        .execute(tx.as_mut())
        .await?;
    tx.commit().await?;

    let review = Review {
        id: row.get("id"),
        hotel_id,
        rating: star,
        comment: input.review.trim().to_owned(),
        user: reviewer_from_name(&reviewer_name),
        created_at: row.get("created_at"),
    };
    tracing::info!(review_id = %review.id, %hotel_id, rating = star, "review added");
    Ok(SubmittedReview { review, summary })
}

#[cfg(test)]
#[path = "review_test.rs"]
mod tests;
