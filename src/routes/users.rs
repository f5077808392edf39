//! User profile routes — details, profile sections, reservations.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::AuthUser;
use super::today;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::profile::{ProfileTab, SectionsView, TabEvent, TabSet};
use crate::services::account::{self, ProfileUpdate, UserDetails};
use crate::services::booking::{self, Reservation};
use crate::services::payment::{self, PaymentMethod};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub details: UserDetails,
    pub reservations: Vec<Reservation>,
    pub payment_details: Vec<PaymentMethod>,
}

/// `GET /api/user`: profile with reservations and saved cards.
pub async fn get_user(State(state): State<AppState>, auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user.id;
    let details = account::get_user(&state.pool, user_id).await?;
    let reservations = booking::list_reservations(&state.pool, user_id, today()).await?;
    let payment_details = payment::list_methods(&state.pool, user_id).await?;
    Ok(Envelope::success(UserProfile { details, reservations, payment_details }))
}

/// `PUT /api/user`: update personal details.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(update) = payload?;
    let details = account::update_profile(&state.pool, auth.user.id, &update, today()).await?;
    Ok(Envelope::success(details))
}

#[derive(Debug, Default, Deserialize)]
pub struct SectionsQuery {
    /// Current `/user-profile/:section` segment, if any.
    pub section: Option<String>,
    /// Tab the user clicked, by key.
    pub select: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SectionsResponse {
    #[serde(flatten)]
    pub view: SectionsView,
    /// Where to navigate after a click on a controlled tab set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate: Option<String>,
}

/// Resolve the visible tabs and the active one for a user.
///
/// With a `section` the set is URL-controlled; a `select` then yields a
/// navigation target instead of switching in place.
pub(crate) fn resolve_sections(is_admin: bool, query: &SectionsQuery) -> SectionsResponse {
    let mut set = match query.section.as_deref() {
        Some(segment) => TabSet::controlled(is_admin, Some(segment)),
        None => TabSet::uncontrolled(is_admin),
    };

    let navigate = match query.select.as_deref().and_then(ProfileTab::from_segment) {
        Some(tab) => match set.select(tab) {
            TabEvent::Navigate(path) => Some(path),
            TabEvent::Switched(_) | TabEvent::Ignored => None,
        },
        None => None,
    };

    SectionsResponse { view: SectionsView::from(&set), navigate }
}

/// `GET /api/user/sections?section=&select=`: profile tab routing.
pub async fn sections(
    auth: AuthUser,
    query: Result<Query<SectionsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    Ok(Envelope::success(resolve_sections(auth.user.is_admin, &params)))
}

/// `GET /api/user/bookings`: reservations with derived status.
pub async fn bookings(State(state): State<AppState>, auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    let reservations = booking::list_reservations(&state.pool, auth.user.id, today()).await?;
    Ok(Envelope::success(reservations))
}

/// `DELETE /api/user/bookings/{id}`: cancel a booking before check-in.
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(booking_id) = path?;
    let cancellation = booking::cancel_booking(&state.pool, auth.user.id, booking_id, today()).await?;
    Ok(Envelope::success(cancellation))
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
