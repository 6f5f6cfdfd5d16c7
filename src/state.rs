use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::{CardService, CollectionService, DemoService, UserService};

/// Shared handler state; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone())
    }

    pub fn cards(&self) -> CardService {
        CardService::new(self.pool.clone())
    }

    pub fn collections(&self) -> CollectionService {
        CollectionService::new(self.pool.clone())
    }

    pub fn demo(&self) -> DemoService {
        DemoService::new(self.pool.clone(), self.config.demo.clone())
    }
}
