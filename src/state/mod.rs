//! Application state module
//!
//! Shared state handed to every request handler

use std::sync::Arc;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::KeyedRateLimiter;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// State cloned into each handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub services: ServiceFactory,
    pub auth_limiter: KeyedRateLimiter,
}

impl AppState {
    pub fn new(settings: Settings, db: DatabaseService) -> Result<Self> {
        let services = ServiceFactory::new(&settings, db)?;
        let auth_limiter = KeyedRateLimiter::new(&settings.rate_limit);

        Ok(Self {
            settings: Arc::new(settings),
            services,
            auth_limiter,
        })
    }
}
