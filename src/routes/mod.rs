//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every endpoint is JSON under `/api`, wrapped in the response envelope.
//! The SPA is served separately; CORS is open so it can call from any
//! origin. Unmatched paths render the error envelope with a 404.

pub mod analytics;
pub mod auth;
pub mod hotels;
pub mod payments;
pub mod promotions;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use time::{Date, OffsetDateTime};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Calendar date used for pricing, promotions, and cancellation cutoffs.
pub(crate) fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/register", put(auth::register))
        .route("/api/logout", post(auth::logout))
        .route("/api/hotels", get(hotels::search))
        .route("/api/hotel/add-review", post(hotels::add_review))
        .route("/api/hotel/book", post(hotels::book))
        .route("/api/hotel/{id}", get(hotels::details))
        .route("/api/hotel/{id}/booking/enquiry", get(hotels::enquiry))
        .route("/api/hotel/{id}/quote", post(hotels::quote))
        .route("/api/hotel/{id}/reviews", get(hotels::reviews))
        .route("/api/user", get(users::get_user).put(users::update_user))
        .route("/api/user/sections", get(users::sections))
        .route("/api/user/bookings", get(users::bookings))
        .route("/api/user/bookings/{id}", delete(users::cancel_booking))
        .route("/api/payment-details", get(payments::list).post(payments::add))
        .route("/api/payment-details/{id}", put(payments::update).delete(payments::remove))
        .route("/api/payments/create-checkout-session", post(payments::create_checkout_session))
        .route("/api/promotions", get(promotions::list).post(promotions::create))
        .route("/api/promotions/{id}", put(promotions::update).delete(promotions::remove))
        .route("/api/promotions/{id}/toggle", post(promotions::toggle))
        .route("/api/admin/analytics", get(analytics::dashboard))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> ApiError {
    ApiError::NotFound("no such endpoint".to_owned())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
