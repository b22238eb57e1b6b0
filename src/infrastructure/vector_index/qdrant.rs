use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, SearchPointsBuilder, UpsertPointsBuilder, PointStruct,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{
    ports::VectorIndex, ChunkMetadata, DocumentChunk, DomainError, Embedding, RetrievedContext,
};

/// Qdrant-backed vector index. Each namespace maps to its own collection, so
/// the existence check and the populate-once contract ride on collection
/// lifecycle rather than payload filtering.
pub struct QdrantVectorIndex {
    client: Qdrant,
    dimension: usize,
}

impl QdrantVectorIndex {
    pub fn new(url: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::index_unavailable(e.to_string()))?;

        Ok(Self { client, dimension })
    }

    /// Document ids are opaque strings; collection names are restricted, so
    /// anything outside [A-Za-z0-9_-] is mapped to '_'.
    fn collection_name(namespace: &str) -> String {
        let sanitized: String = namespace
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("doc_{sanitized}")
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), DomainError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| DomainError::index_unavailable(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::index_unavailable(e.to_string()))?;
        }

        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn namespace_exists(&self, namespace: &str) -> Result<bool, DomainError> {
        self.client
            .collection_exists(Self::collection_name(namespace))
            .await
            .map_err(|e| DomainError::index_unavailable(e.to_string()))
    }

    async fn upsert(
        &self,
        namespace: &str,
        entries: &[(DocumentChunk, Embedding)],
    ) -> Result<(), DomainError> {
        let collection = Self::collection_name(namespace);
        self.ensure_collection(&collection).await?;

        let points: Vec<PointStruct> = entries
            .iter()
            .map(|(chunk, embedding)| {
                let payload: Payload = serde_json::json!({
                    "chunk_id": chunk.id.to_string(),
                    "document_id": chunk.document_id,
                    "text": chunk.text,
                    "chunk_index": chunk.chunk_index,
                    "page": chunk.metadata.page,
                    "start_offset": chunk.metadata.start_offset,
                })
                .try_into()
                .map_err(|_| DomainError::internal("Failed to create payload"))?;

                Ok(PointStruct::new(
                    chunk.id.to_string(),
                    embedding.as_slice().to_vec(),
                    payload,
                ))
            })
            .collect::<Result<_, DomainError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&collection, points))
            .await
            .map_err(|e| DomainError::index_unavailable(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedContext>, DomainError> {
        let collection = Self::collection_name(namespace);

        let exists = self
            .client
            .collection_exists(&collection)
            .await
            .map_err(|e| DomainError::index_unavailable(e.to_string()))?;
        if !exists {
            return Err(DomainError::not_found(format!("namespace {namespace}")));
        }

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::index_unavailable(e.to_string()))?;

        let retrieved: Vec<RetrievedContext> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let chunk_id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
                let document_id = payload.get("document_id")?.as_str()?.to_string();
                let text = payload.get("text")?.as_str()?.to_string();
                let chunk_index = payload.get("chunk_index")?.as_integer()? as usize;
                let page = payload.get("page")?.as_integer()? as usize;
                let start_offset = payload.get("start_offset")?.as_integer()? as usize;

                let chunk = DocumentChunk {
                    id: chunk_id,
                    document_id,
                    text,
                    chunk_index,
                    metadata: ChunkMetadata { page, start_offset },
                };

                Some(RetrievedContext {
                    chunk,
                    score: point.score,
                })
            })
            .collect();

        Ok(retrieved)
    }
}
