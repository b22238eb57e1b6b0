use async_trait::async_trait;

use crate::domain::{errors::DomainError, DocumentChunk, Embedding, RetrievedContext};

/// Namespace-scoped vector index. One namespace per document id; the backend
/// decides how namespaces map onto its own storage (collections, partitions).
/// All backend failures surface as `IndexUnavailable`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn namespace_exists(&self, namespace: &str) -> Result<bool, DomainError>;

    async fn upsert(
        &self,
        namespace: &str,
        entries: &[(DocumentChunk, Embedding)],
    ) -> Result<(), DomainError>;

    /// Nearest neighbours by descending score; equal scores keep insertion
    /// order. Querying a namespace that does not exist fails with `NotFound`.
    async fn query(
        &self,
        namespace: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedContext>, DomainError>;
}
