//! ALMA API - Calendar REST Layer
//!
//! Axum REST surface for the ALMA calendar: instances, role assignments,
//! participant rosters, series generation, bulk operations and the rich read
//! model. Storage is any `CalendarBackend`; `DbClient` provides PostgreSQL.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::{AppState, SharedStore};
pub use types::*;
