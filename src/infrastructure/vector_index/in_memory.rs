use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{
    ports::VectorIndex, DocumentChunk, DomainError, Embedding, RetrievedContext,
};

/// Namespaced in-memory index with cosine scoring. Used by tests and local
/// runs without a Qdrant instance.
pub struct InMemoryVectorIndex {
    namespaces: RwLock<HashMap<String, Vec<(DocumentChunk, Embedding)>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn namespace_exists(&self, namespace: &str) -> Result<bool, DomainError> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(namespaces.contains_key(namespace))
    }

    async fn upsert(
        &self,
        namespace: &str,
        entries: &[(DocumentChunk, Embedding)],
    ) -> Result<(), DomainError> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let store = namespaces.entry(namespace.to_string()).or_default();
        for (chunk, embedding) in entries {
            store.retain(|(c, _)| c.id != chunk.id);
            store.push((chunk.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedContext>, DomainError> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let store = namespaces
            .get(namespace)
            .ok_or_else(|| DomainError::not_found(format!("namespace {namespace}")))?;

        let mut results: Vec<RetrievedContext> = store
            .iter()
            .map(|(chunk, embedding)| RetrievedContext {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(results.into_iter().take(top_k).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChunkMetadata;

    fn chunk(document_id: &str, text: &str, index: usize) -> DocumentChunk {
        DocumentChunk::new(document_id, text, index, ChunkMetadata::default())
    }

    #[tokio::test]
    async fn namespace_appears_after_upsert() {
        let index = InMemoryVectorIndex::new();
        assert!(!index.namespace_exists("doc-1").await.unwrap());

        index
            .upsert(
                "doc-1",
                &[(chunk("doc-1", "content", 0), Embedding::new(vec![1.0, 0.0]))],
            )
            .await
            .unwrap();

        assert!(index.namespace_exists("doc-1").await.unwrap());
        assert!(!index.namespace_exists("doc-2").await.unwrap());
    }

    #[tokio::test]
    async fn query_orders_by_descending_score() {
        let index = InMemoryVectorIndex::new();
        index
            .upsert(
                "doc-1",
                &[
                    (chunk("doc-1", "orthogonal", 0), Embedding::new(vec![0.0, 1.0])),
                    (chunk("doc-1", "aligned", 1), Embedding::new(vec![1.0, 0.0])),
                    (chunk("doc-1", "diagonal", 2), Embedding::new(vec![1.0, 1.0])),
                ],
            )
            .await
            .unwrap();

        let results = index
            .query("doc-1", &Embedding::new(vec![1.0, 0.0]), 10)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.text, "aligned");
        assert_eq!(results[1].chunk.text, "diagonal");
        assert_eq!(results[2].chunk.text, "orthogonal");
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn equal_scores_keep_insertion_order() {
        let index = InMemoryVectorIndex::new();
        index
            .upsert(
                "doc-1",
                &[
                    (chunk("doc-1", "first", 0), Embedding::new(vec![1.0, 0.0])),
                    (chunk("doc-1", "second", 1), Embedding::new(vec![1.0, 0.0])),
                    (chunk("doc-1", "third", 2), Embedding::new(vec![1.0, 0.0])),
                ],
            )
            .await
            .unwrap();

        let results = index
            .query("doc-1", &Embedding::new(vec![1.0, 0.0]), 10)
            .await
            .unwrap();

        let texts: Vec<_> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let index = InMemoryVectorIndex::new();
        index
            .upsert(
                "doc-1",
                &[(chunk("doc-1", "one", 0), Embedding::new(vec![1.0, 0.0]))],
            )
            .await
            .unwrap();
        index
            .upsert(
                "doc-2",
                &[(chunk("doc-2", "two", 0), Embedding::new(vec![1.0, 0.0]))],
            )
            .await
            .unwrap();

        let results = index
            .query("doc-1", &Embedding::new(vec![1.0, 0.0]), 10)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "one");
    }

    #[tokio::test]
    async fn query_missing_namespace_is_not_found() {
        let index = InMemoryVectorIndex::new();
        let err = index
            .query("doc-1", &Embedding::new(vec![1.0]), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
