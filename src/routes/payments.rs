//! Payment routes — saved cards and hosted checkout.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::services::payment::{self, CheckoutSessionCreated, CheckoutSessionRequest};
use crate::state::AppState;
use crate::validation::CardForm;

/// `GET /api/payment-details`
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    let methods = payment::list_methods(&state.pool, auth.user.id).await?;
    Ok(Envelope::success(methods))
}

/// `POST /api/payment-details`: only the masked number is stored.
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CardForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(form) = payload?;
    let method = payment::add_method(&state.pool, auth.user.id, &form).await?;
    Ok((StatusCode::CREATED, Envelope::success(method)))
}

/// `PUT /api/payment-details/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CardForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(form) = payload?;
    let method = payment::update_method(&state.pool, auth.user.id, id, &form).await?;
    Ok(Envelope::success(method))
}

/// `DELETE /api/payment-details/{id}`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    payment::delete_method(&state.pool, auth.user.id, id).await?;
    Ok(Envelope::success(serde_json::json!({ "id": id, "deleted": true })))
}

/// Checkout envelope with the redirect `url` repeated at the top level,
/// where the checkout page reads it.
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    #[serde(flatten)]
    pub envelope: Envelope<CheckoutSessionCreated>,
    pub url: String,
}

impl From<CheckoutSessionCreated> for CheckoutSessionResponse {
    fn from(created: CheckoutSessionCreated) -> Self {
        let url = created.url.clone();
        Self { envelope: Envelope::success(created), url }
    }
}

/// `POST /api/payments/create-checkout-session`: redirect URL for a booking's payment.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CheckoutSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let created = payment::start_checkout(&state.pool, &state.checkout, &state.config, auth.user.id, &body).await?;
    Ok(Json(CheckoutSessionResponse::from(created)))
}

#[cfg(test)]
#[path = "payments_test.rs"]
mod tests;
