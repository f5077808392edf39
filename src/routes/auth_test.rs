use super::*;
use axum::http::HeaderValue;

fn headers_with_auth(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

// =============================================================================
// bearer_token
// =============================================================================

#[test]
fn bearer_token_extracts_token() {
    let headers = headers_with_auth("Bearer abc123");
    assert_eq!(bearer_token(&headers), Some("abc123"));
}

#[test]
fn bearer_token_scheme_case_insensitive() {
    let headers = headers_with_auth("bearer abc123");
    assert_eq!(bearer_token(&headers), Some("abc123"));
}

#[test]
fn bearer_token_rejects_other_schemes() {
    let headers = headers_with_auth("Basic dXNlcjpwYXNz");
    assert_eq!(bearer_token(&headers), None);
}

#[test]
fn bearer_token_rejects_empty_token() {
    let headers = headers_with_auth("Bearer   ");
    assert_eq!(bearer_token(&headers), None);
}

#[test]
fn bearer_token_missing_header() {
    assert_eq!(bearer_token(&HeaderMap::new()), None);
}

// =============================================================================
// cookies
// =============================================================================

#[test]
fn session_cookie_attributes() {
    let cookie = session_cookie("tok".into(), true, 30);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(Duration::days(30)));
}

#[test]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert_eq!(cookie.secure(), Some(false));
}

// =============================================================================
// AdminUser
// =============================================================================

fn session_user(is_admin: bool) -> session::SessionUser {
    session::SessionUser {
        id: Uuid::nil(),
        first_name: "Ada".into(),
        last_name: "Guest".into(),
        email: "ada@example.com".into(),
        is_admin,
    }
}

#[test]
fn admin_user_accepts_administrators() {
    assert!(AdminUser::require(&session_user(true)).is_ok());
}

#[test]
fn admin_user_forbids_guests() {
    let err = AdminUser::require(&session_user(false)).err().unwrap();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}
