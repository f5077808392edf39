//! Admin analytics dashboard.

use axum::extract::State;
use axum::response::IntoResponse;

use super::auth::AdminUser;
use super::today;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::services::analytics;
use crate::state::AppState;

/// `GET /api/admin/analytics`: six-month trends and per-hotel occupancy.
pub async fn dashboard(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse, ApiError> {
    let dashboard = analytics::dashboard(&state.pool, today()).await?;
    Ok(Envelope::success(dashboard))
}
