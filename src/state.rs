use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::{SessionStore, UserStore, open_pool};
use crate::providers::YahooFinanceProvider;
use crate::service::DataService;

/// Shared application state, passed to all route handlers via
/// `axum::extract::State`.
pub struct AppState {
    pub config: AppConfig,
    pub data: DataService,
    pub users: UserStore,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Arc<Self>> {
        let provider = YahooFinanceProvider::new(
            &config.provider.base_url,
            Duration::from_secs(config.provider.timeout_secs),
        )?;
        let data = DataService::new(
            Arc::new(provider),
            Duration::from_secs(config.cache.ttl_secs),
            config.provider.daily_budget,
        );

        let pool = open_pool(&config.database_path()?, 4)?;
        let users = UserStore::new(pool.clone());
        let sessions = SessionStore::new(pool, chrono::Duration::hours(config.session.ttl_hours));

        Ok(Arc::new(Self {
            config,
            data,
            users,
            sessions,
        }))
    }
}
