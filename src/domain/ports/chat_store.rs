use async_trait::async_trait;

use crate::domain::{errors::DomainError, ConversationTurn};

/// Append-only chat log per (document, owner) session. `list` returns turns
/// oldest first, ordered by creation timestamp.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn append(
        &self,
        document_id: &str,
        owner_id: &str,
        turn: ConversationTurn,
    ) -> Result<(), DomainError>;

    async fn list(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<ConversationTurn>, DomainError>;
}
