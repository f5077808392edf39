use super::*;
use crate::state::test_helpers::test_app_state;
use serde_json::Value;

/// Serve the router on an ephemeral port; returns its base URL.
async fn spawn_app() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(test_app_state());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn json_body(resp: reqwest::Response) -> Value {
    resp.json::<Value>().await.unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let base = spawn_app().await;
    let resp = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_renders_error_envelope() {
    let base = spawn_app().await;
    let resp = reqwest::get(format!("{base}/api/nowhere")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn user_requires_authentication() {
    let base = spawn_app().await;
    let resp = reqwest::get(format!("{base}/api/user")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn admin_routes_require_authentication() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let resp = client.get(format!("{base}/api/admin/analytics")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let resp = client
        .post(format!("{base}/api/promotions/{}/toggle", uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_bearer_is_unauthorized() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .get(format!("{base}/api/user/bookings"))
        .header("authorization", "Bearer ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_malformed_json() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["status"], "error");
}

#[tokio::test]
async fn login_rejects_invalid_email_before_lookup() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/login"))
        .json(&serde_json::json!({ "email": "not-an-email", "password": "secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_invalid_form() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .put(format!("{base}/api/register"))
        .json(&serde_json::json!({
            "first_name": "",
            "last_name": "Doe",
            "email": "jane@example.com",
            "password": "pw",
            "confirm_password": "other",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["status"], "error");
}

#[tokio::test]
async fn register_requires_put() {
    let base = spawn_app().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/register"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn today_is_utc_calendar_date() {
    assert_eq!(today(), OffsetDateTime::now_utc().date());
}
