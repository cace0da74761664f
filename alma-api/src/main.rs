//! ALMA API Server Entry Point
//!
//! Bootstraps configuration and telemetry, connects the PostgreSQL pool and
//! starts the Axum HTTP server.

use std::sync::Arc;

use alma_api::telemetry::{init_tracer, TelemetryConfig};
use alma_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;

    if api_config.apply_schema {
        db.apply_schema().await?;
    }

    let addr = api_config
        .bind_addr()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address: {}", e)))?;

    let state = AppState::new(Arc::new(db), api_config);
    let app = create_api_router(state);

    tracing::info!(%addr, db_host = %db_config.host, db_name = %db_config.dbname, "Starting ALMA API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
