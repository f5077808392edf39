//! Promotion management. Administrators only.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use super::auth::AdminUser;
use super::today;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::services::promotion::{self, PromotionForm};
use crate::state::AppState;

/// `GET /api/promotions`
pub async fn list(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse, ApiError> {
    let promotions = promotion::list_promotions(&state.pool, today()).await?;
    Ok(Envelope::success(promotions))
}

/// `POST /api/promotions`
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<PromotionForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(form) = payload?;
    let created = promotion::create_promotion(&state.pool, &form, today()).await?;
    Ok((StatusCode::CREATED, Envelope::success(created)))
}

/// `PUT /api/promotions/{id}`
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PromotionForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(form) = payload?;
    let updated = promotion::update_promotion(&state.pool, id, &form, today()).await?;
    Ok(Envelope::success(updated))
}

/// `POST /api/promotions/{id}/toggle`: flip `is_active`.
pub async fn toggle(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let toggled = promotion::toggle_promotion(&state.pool, id, today()).await?;
    Ok(Envelope::success(toggled))
}

/// `DELETE /api/promotions/{id}`
pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    promotion::delete_promotion(&state.pool, id).await?;
    Ok(Envelope::success(serde_json::json!({ "id": id, "deleted": true })))
}
