mod config;
mod db;
mod envelope;
mod error;
mod pricing;
mod profile;
mod rate_limit;
mod routes;
mod services;
mod state;
mod validation;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match db::init_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "database init failed");
            return ExitCode::FAILURE;
        }
    };

    let checkout = match services::checkout::gateway_from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "checkout gateway init failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(gateway = checkout.name(), "checkout gateway ready");

    let port = config.port;
    let state = state::AppState::new(pool, config, checkout);
    let app = routes::app(state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%port, "staybook listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
