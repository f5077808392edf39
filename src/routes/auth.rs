//! Auth routes — password login, registration, session management.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::services::account::{self, LoginRequest};
use crate::services::session;
use crate::state::AppState;
use crate::validation::RegistrationForm;

pub(crate) const COOKIE_NAME: &str = "session_token";

/// Token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn session_cookie(token: String, secure: bool, ttl_days: i64) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(ttl_days))
        .build()
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the bearer header or session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = bearer_token(&parts.headers)
            .or_else(|| jar.get(COOKIE_NAME).map(Cookie::value))
            .unwrap_or_default()
            .to_owned();
        if token.is_empty() {
            return Err(ApiError::Unauthorized);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self { user, token })
    }
}

/// Proof that the caller is an authenticated administrator. Non-admins get 403.
pub struct AdminUser;

impl AdminUser {
    fn require(user: &session::SessionUser) -> Result<Self, ApiError> {
        if user.is_admin {
            Ok(Self)
        } else {
            Err(ApiError::Forbidden("administrator access required".to_owned()))
        }
    }
}

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        Self::require(&auth.user)
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/login`: check credentials and open a session (token in body and cookie).
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let data = account::login(&state.pool, &state.login_throttle, &body, state.config.session_ttl_days).await?;

    let cookie = session_cookie(data.token.clone(), state.config.cookie_secure, state.config.session_ttl_days);
    Ok((jar.add(cookie), Envelope::success(data)))
}

/// `PUT /api/register`: create an account.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(form) = payload?;
    let id: Uuid = account::register(&state.pool, &form).await?;
    tracing::info!(user_id = %id, "user registered");
    Ok((StatusCode::CREATED, Envelope::success(serde_json::json!({ "id": id }))))
}

/// `POST /api/logout`: delete the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, user_id = %auth.user.id, "session delete failed");
    }
    let jar = CookieJar::new().add(cleared_cookie(state.config.cookie_secure));
    (jar, Envelope::success(serde_json::json!({ "loggedOut": true })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
