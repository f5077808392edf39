//! HTTP-facing error type.
//!
//! DESIGN
//! ======
//! Services return their own `thiserror` enums. Each converts into
//! `ApiError`, which renders the `{"status":"error","message":...}`
//! envelope the UI shows in its dismissible banner. Internal failures are
//! logged here and reported to the client with a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::pricing::PricingError;
use crate::rate_limit::LoginThrottled;
use crate::services::account::AccountError;
use crate::services::booking::BookingError;
use crate::services::checkout::CheckoutError;
use crate::services::hotel::HotelError;
use crate::services::payment::PaymentError;
use crate::services::promotion::PromotionError;
use crate::services::review::ReviewError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Something went wrong. Please try again.".to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        let body = serde_json::json!({ "status": "error", "message": self.public_message() });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

// Extractor rejections render as the error envelope too.

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        Self::NotFound(err.body_text())
    }
}

// =============================================================================
// SERVICE ERROR MAPPING
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<LoginThrottled> for ApiError {
    fn from(err: LoginThrottled) -> Self {
        Self::TooManyRequests(err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        tracing::error!(error = %err, "checkout provider failed");
        Self::BadGateway("Payment provider is unavailable. Please try again.".to_owned())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(e) => e.into(),
            AccountError::Throttled(e) => e.into(),
            AccountError::EmailTaken => Self::Conflict(err.to_string()),
            AccountError::InvalidCredentials => Self::Unauthorized,
            AccountError::NotFound => Self::NotFound(err.to_string()),
            AccountError::InvalidDateOfBirth => Self::BadRequest(err.to_string()),
            AccountError::Db(e) => e.into(),
        }
    }
}

impl From<HotelError> for ApiError {
    fn from(err: HotelError) -> Self {
        match err {
            HotelError::NotFound(_) => Self::NotFound(err.to_string()),
            HotelError::Db(e) => e.into(),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Pricing(e) => e.into(),
            BookingError::Db(e) => e.into(),
            BookingError::HotelNotFound(_) | BookingError::RoomNotFound | BookingError::NotFound => {
                Self::NotFound(err.to_string())
            }
            BookingError::RoomUnavailable
            | BookingError::SoldOut { .. }
            | BookingError::AlreadyCancelled
            | BookingError::CancellationClosed => Self::Conflict(err.to_string()),
            BookingError::TooManyRooms { .. }
            | BookingError::TooManyGuests { .. }
            | BookingError::EmptyBooking
            | BookingError::CheckInInPast
            | BookingError::InvalidEmail => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::InvalidRating(_) => Self::BadRequest(err.to_string()),
            ReviewError::HotelNotFound(_) => Self::NotFound(err.to_string()),
            ReviewError::Db(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Validation(e) => e.into(),
            PaymentError::Gateway(e) => e.into(),
            PaymentError::Db(e) => e.into(),
            PaymentError::NotFound | PaymentError::BookingNotFound => Self::NotFound(err.to_string()),
            PaymentError::BookingCancelled => Self::Conflict(err.to_string()),
            PaymentError::InvalidAmount => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<PromotionError> for ApiError {
    fn from(err: PromotionError) -> Self {
        match err {
            PromotionError::NotFound | PromotionError::HotelNotFound(_) => Self::NotFound(err.to_string()),
            PromotionError::EmptyTitle | PromotionError::InvalidDiscount | PromotionError::InvalidDateRange => {
                Self::BadRequest(err.to_string())
            }
            PromotionError::Db(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
