pub mod analytics;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod reactions;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use analytics::storage::AnalyticsStorage;
use clock::Clock;
use config::ServerConfig;
use storage::Storage;

/// Shared application state passed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    /// Aggregate query layer sharing the storage connection pool.
    pub analytics: Arc<AnalyticsStorage>,
    /// Wall-clock source. Production uses [`clock::SystemClock`]; tests pin
    /// "today" with [`clock::FixedClock`].
    pub clock: Arc<dyn Clock>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: Arc<ServerConfig>, storage: Arc<Storage>, clock: Arc<dyn Clock>) -> Self {
        let analytics = Arc::new(AnalyticsStorage::new(storage.pool()));
        Self {
            config,
            storage,
            analytics,
            clock,
            started_at: std::time::Instant::now(),
        }
    }
}
