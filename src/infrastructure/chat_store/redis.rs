use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};

use crate::domain::{ports::ChatStore, ConversationTurn, DomainError};

pub type RedisPool = Pool;

pub fn create_pool(redis_url: &str) -> Result<RedisPool, DomainError> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| DomainError::internal(format!("Redis pool: {e}")))
}

/// Redis-backed chat log. Turns are appended as JSON to a per-session list;
/// listing re-sorts by creation timestamp, which is stable for equal stamps.
pub struct RedisChatStore {
    pool: RedisPool,
}

impl RedisChatStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(document_id: &str, owner_id: &str) -> String {
        format!("chat:{owner_id}:{document_id}")
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::internal(format!("Redis pool: {e}")))
    }
}

#[async_trait]
impl ChatStore for RedisChatStore {
    async fn append(
        &self,
        document_id: &str,
        owner_id: &str,
        turn: ConversationTurn,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;
        let json = serde_json::to_string(&turn)
            .map_err(|e| DomainError::internal(format!("serializing turn: {e}")))?;

        conn.rpush::<_, _, ()>(Self::key(document_id, owner_id), json)
            .await
            .map_err(|e| DomainError::internal(format!("Redis: {e}")))?;

        Ok(())
    }

    async fn list(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<ConversationTurn>, DomainError> {
        let mut conn = self.conn().await?;
        let raw: Vec<String> = conn
            .lrange(Self::key(document_id, owner_id), 0, -1)
            .await
            .map_err(|e| DomainError::internal(format!("Redis: {e}")))?;

        let mut turns = raw
            .iter()
            .map(|json| {
                serde_json::from_str(json)
                    .map_err(|e| DomainError::internal(format!("parsing turn: {e}")))
            })
            .collect::<Result<Vec<ConversationTurn>, DomainError>>()?;

        turns.sort_by_key(|t| t.created_at);
        Ok(turns)
    }
}
