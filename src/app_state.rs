use std::sync::{Arc, Mutex};
use sqlx::SqlitePool;
use crate::config;
use crate::modules::assistant::{AssistantClient, AssistantRateLimits};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub env: config::Config,
    pub assistant: AssistantClient,
    pub rate_limits: Arc<Mutex<AssistantRateLimits>>,
}

impl AppState {
    pub fn new(db: SqlitePool, env: config::Config, assistant: AssistantClient) -> Self {
        Self {
            db,
            env,
            assistant,
            rate_limits: Arc::new(Mutex::new(AssistantRateLimits::new())),
        }
    }
}
