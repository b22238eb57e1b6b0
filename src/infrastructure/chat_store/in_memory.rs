use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{ports::ChatStore, ConversationTurn, DomainError};

/// In-memory chat log for tests and local runs.
pub struct InMemoryChatStore {
    sessions: RwLock<HashMap<(String, String), Vec<ConversationTurn>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn append(
        &self,
        document_id: &str,
        owner_id: &str,
        turn: ConversationTurn,
    ) -> Result<(), DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        sessions
            .entry((document_id.to_string(), owner_id.to_string()))
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn list(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<ConversationTurn>, DomainError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut turns = sessions
            .get(&(document_id.to_string(), owner_id.to_string()))
            .cloned()
            .unwrap_or_default();

        turns.sort_by_key(|t| t.created_at);
        Ok(turns)
    }
}
