//! Hotel routes — search, details, enquiry, quotes, reviews, booking.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::auth::AuthUser;
use super::today;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::services::booking::{self, BookingRequest, QuoteRequest};
use crate::services::hotel::{self, HotelSearch};
use crate::services::review::{self, NewReview};
use crate::state::AppState;

/// `GET /api/hotels`: search by city and free text, paginated.
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<HotelSearch>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(search) = query?;
    let (hotels, paging) = hotel::search_hotels(&state.pool, &search).await?;
    Ok(Envelope::success(hotels).with_paging(paging))
}

/// `GET /api/hotel/{id}`: details with live promotion badges.
pub async fn details(State(state): State<AppState>, Path(key): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let details = hotel::get_hotel(&state.pool, &key, today()).await?;
    Ok(Envelope::success(details))
}

/// `GET /api/hotel/{id}/booking/enquiry`: rooms with booking limits.
pub async fn enquiry(State(state): State<AppState>, Path(key): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let enquiry = hotel::booking_enquiry(&state.pool, &key, today()).await?;
    Ok(Envelope::success(enquiry))
}

/// `POST /api/hotel/{id}/quote`: price a stay without booking it.
pub async fn quote(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let quote = booking::quote_stay(&state.pool, &key, &body, today()).await?;
    Ok(Envelope::success(quote))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    #[serde(default)]
    pub current_page: Option<i64>,
}

/// `GET /api/hotel/{id}/reviews?currentPage=`: one page plus the aggregate.
pub async fn reviews(
    State(state): State<AppState>,
    Path(key): Path<String>,
    query: Result<Query<ReviewsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let page = params.current_page.unwrap_or(1);
    let (elements, summary, paging) =
        review::list_reviews(&state.pool, &key, page, state.config.reviews_page_size).await?;
    Ok(Envelope::success(elements).with_metadata(summary).with_paging(paging))
}

/// `POST /api/hotel/add-review`: submit a review; returns it with the merged aggregate.
pub async fn add_review(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let submitted = review::add_review(&state.pool, &auth.user, &body).await?;
    let summary = submitted.summary.clone();
    Ok((StatusCode::CREATED, Envelope::success(submitted).with_metadata(summary)))
}

/// `POST /api/hotel/book`: create a booking at the server-computed price.
pub async fn book(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let created = booking::create_booking(&state.pool, auth.user.id, &body, today()).await?;
    Ok((StatusCode::CREATED, Envelope::success(created)))
}
