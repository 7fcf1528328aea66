use std::sync::Arc;

use crate::config::Settings;
use crate::core::orchestrator::{ChartCache, ChartService};
use crate::fetcher::fred::FredFetcher;
use crate::fetcher::DataSource;

/// Shared by every request handler via `Arc<AppState>`.
/// The cache inside `service` is the only mutable state crossing requests.
pub struct AppState {
    pub service: Arc<ChartService>,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>, cache: Arc<ChartCache>, settings: &Settings) -> Self {
        Self {
            service: Arc::new(ChartService::new(source, cache, settings.cache_ttl)),
        }
    }

    /// Production wiring: FRED as the data source, key read from the environment per fetch.
    pub fn from_settings(settings: &Settings, cache: Arc<ChartCache>) -> Self {
        let fetcher = FredFetcher::new(settings.fred_base_url.clone(), settings.fred_timeout);
        Self::new(Arc::new(fetcher), cache, settings)
    }
}
