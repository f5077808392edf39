//! Checkout gateways — hand a booking total to a payment page.
//!
//! DESIGN
//! ======
//! `CheckoutGateway` is the seam between the payment flow and the provider.
//! `HostedCheckout` posts a form-encoded session request to a
//! Stripe-compatible `/v1/checkout/sessions` endpoint; `LocalCheckout`
//! needs no provider and redirects straight to the confirmation page, which
//! is what development and tests run against. Request building and response
//! parsing are pure functions for testability.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::AppConfig;

const DEFAULT_API_URL: &str = "https://api.stripe.com";
const SESSIONS_PATH: &str = "/v1/checkout/sessions";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
    #[error("checkout request failed: {0}")]
    ApiRequest(String),
    #[error("checkout provider returned {status}: {body}")]
    ApiResponse { status: u16, body: String },
    #[error("failed to parse checkout response: {0}")]
    ApiParse(String),
}

/// What the guest is asked to pay for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub booking_id: Uuid,
    /// Amount in minor units (cents).
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub provider_ref: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Open a payment session and return where to send the guest.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the provider is unreachable or rejects the request.
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError>;

    fn name(&self) -> &'static str;
}

/// Convert a payable total to cents. `None` for non-finite or non-positive amounts.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn amount_to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

/// Pick the gateway for this deployment.
///
/// # Errors
///
/// Returns an error if the hosted client cannot be built.
pub fn gateway_from_config(config: &AppConfig) -> Result<Arc<dyn CheckoutGateway>, CheckoutError> {
    match &config.checkout_api_key {
        Some(key) => Ok(Arc::new(HostedCheckout::new(key.clone(), config.checkout_api_url.as_deref())?)),
        None => Ok(Arc::new(LocalCheckout::new(&config.public_base_url))),
    }
}

// =============================================================================
// HOSTED
// =============================================================================

pub struct HostedCheckout {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl HostedCheckout {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_key: String, base_url: Option<&str>) -> Result<Self, CheckoutError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CheckoutError::HttpClientBuild(e.to_string()))?;
        let base = base_url.unwrap_or(DEFAULT_API_URL).trim_end_matches('/');
        Ok(Self { http, api_key, endpoint: format!("{base}{SESSIONS_PATH}") })
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for HostedCheckout {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .form(&session_form(request))
            .send()
            .await
            .map_err(|e| CheckoutError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CheckoutError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(CheckoutError::ApiResponse { status, body: text });
        }

        parse_session(&text)
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}

/// Form fields for a one-line-item payment session.
fn session_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_owned()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("customer_email", request.customer_email.clone()),
        ("client_reference_id", request.booking_id.to_string()),
        ("metadata[booking_id]", request.booking_id.to_string()),
        ("line_items[0][quantity]", "1".to_owned()),
        ("line_items[0][price_data][currency]", request.currency.to_ascii_lowercase()),
        ("line_items[0][price_data][unit_amount]", request.amount_cents.to_string()),
        ("line_items[0][price_data][product_data][name]", request.description.clone()),
    ]
}

#[derive(serde::Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

fn parse_session(json: &str) -> Result<CheckoutSession, CheckoutError> {
    let api: SessionResponse = serde_json::from_str(json).map_err(|e| CheckoutError::ApiParse(e.to_string()))?;
    let url = api
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CheckoutError::ApiParse("session has no url".into()))?;
    Ok(CheckoutSession { provider_ref: api.id, url })
}

// =============================================================================
// LOCAL
// =============================================================================

/// Gateway without a payment provider: the session is accepted immediately.
pub struct LocalCheckout {
    base_url: String,
}

impl LocalCheckout {
    #[must_use]
    pub fn new(public_base_url: &str) -> Self {
        Self { base_url: public_base_url.trim_end_matches('/').to_owned() }
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for LocalCheckout {
    async fn create_session(&self, _request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        let provider_ref = format!("local_{}", Uuid::new_v4().simple());
        let url = format!("{}/booking-confirmation?session={provider_ref}", self.base_url);
        Ok(CheckoutSession { provider_ref, url })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
#[path = "checkout_test.rs"]
mod tests;
