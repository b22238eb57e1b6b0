use std::sync::Arc;

use crate::application::{ChatService, NamespaceService};
use crate::infrastructure::{AppConfig, RedisPool};

#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub namespace_service: Arc<NamespaceService>,
    pub redis_pool: RedisPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        chat_service: Arc<ChatService>,
        namespace_service: Arc<NamespaceService>,
        redis_pool: RedisPool,
        config: AppConfig,
    ) -> Self {
        Self {
            chat_service,
            namespace_service,
            redis_pool,
            config: Arc::new(config),
        }
    }
}
