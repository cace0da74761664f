//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use alma_storage::CalendarBackend;

use crate::config::ApiConfig;

/// Storage handle shared by every handler. PostgreSQL in production,
/// `MockStorage` in tests.
pub type SharedStore = Arc<dyn CalendarBackend>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<ApiConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedStore, config: ApiConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(SharedStore, store);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(Instant, start_time);
