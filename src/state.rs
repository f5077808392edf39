//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the parsed configuration, the login
//! throttle, and the checkout gateway. All fields are cheap to clone.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::rate_limit::LoginThrottle;
use crate::services::checkout::CheckoutGateway;

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub login_throttle: LoginThrottle,
    pub checkout: Arc<dyn CheckoutGateway>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig, checkout: Arc<dyn CheckoutGateway>) -> Self {
        let login_throttle = LoginThrottle::new(config.login_max_attempts, config.login_window);
        Self { pool, config: Arc::new(config), login_throttle, checkout }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
