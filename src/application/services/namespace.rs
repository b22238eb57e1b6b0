use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::timeout::bounded;
use crate::domain::{
    chunk_pages,
    ports::{DocumentLoader, DocumentStorage, EmbeddingService, VectorIndex},
    ChunkConfig, DomainError, NamespaceHandle,
};

/// Lifecycle of per-document embedding namespaces: existence checks and
/// populate-once ingestion (fetch, chunk, embed, upsert).
pub struct NamespaceService {
    storage: Arc<dyn DocumentStorage>,
    loader: Arc<dyn DocumentLoader>,
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    chunking: ChunkConfig,
    call_timeout: Duration,
    // Guards the check-then-populate sequence per document id so concurrent
    // first questions for the same document embed at most once.
    population_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NamespaceService {
    pub fn new(
        storage: Arc<dyn DocumentStorage>,
        loader: Arc<dyn DocumentLoader>,
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        chunking: ChunkConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            loader,
            embedding,
            index,
            chunking,
            call_timeout,
            population_locks: Mutex::new(HashMap::new()),
        }
    }

    #[instrument(skip(self))]
    pub async fn namespace_exists(&self, document_id: &str) -> Result<bool, DomainError> {
        bounded(
            self.call_timeout,
            "namespace existence check",
            self.index.namespace_exists(document_id),
        )
        .await
    }

    /// Returns a handle to the document's namespace, populating it first if
    /// it does not exist yet. Population is paid at most once per document;
    /// later calls reuse the stored embeddings.
    #[instrument(skip(self))]
    pub async fn ensure_namespace(
        &self,
        document_id: &str,
    ) -> Result<NamespaceHandle, DomainError> {
        let lock = {
            let mut locks = self.population_locks.lock().await;
            locks
                .entry(document_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = lock.lock().await;

        if self.namespace_exists(document_id).await? {
            debug!(document_id, "namespace exists, reusing embeddings");
            self.prune_lock(document_id).await;
            return Ok(NamespaceHandle::new(document_id));
        }

        self.populate(document_id).await?;
        self.prune_lock(document_id).await;
        Ok(NamespaceHandle::new(document_id))
    }

    /// Drops the map entry once the namespace is known to exist. Tasks still
    /// queued on the Arc'd mutex keep serializing; later calls take the fast
    /// existence path, so the map does not grow with document count.
    async fn prune_lock(&self, document_id: &str) {
        self.population_locks.lock().await.remove(document_id);
    }

    async fn populate(&self, document_id: &str) -> Result<(), DomainError> {
        let url = bounded(
            self.call_timeout,
            "download URL lookup",
            self.storage.download_url(document_id),
        )
        .await?;

        let pages = bounded(self.call_timeout, "document load", self.loader.load(&url)).await?;

        let chunks = chunk_pages(document_id, &pages, &self.chunking);
        info!(
            document_id,
            pages = pages.len(),
            chunks = chunks.len(),
            "populating namespace"
        );

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = bounded(
            self.call_timeout,
            "chunk embedding",
            self.embedding.embed_batch(&texts),
        )
        .await?;

        if embeddings.len() != chunks.len() {
            return Err(DomainError::internal(format!(
                "embedding count mismatch for {document_id}: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries: Vec<_> = chunks.into_iter().zip(embeddings).collect();
        bounded(
            self.call_timeout,
            "namespace upsert",
            self.index.upsert(document_id, &entries),
        )
        .await?;

        info!(document_id, vectors = entries.len(), "namespace populated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Embedding, PageText};
    use crate::infrastructure::InMemoryVectorIndex;

    struct StaticStorage;

    #[async_trait]
    impl DocumentStorage for StaticStorage {
        async fn download_url(&self, document_id: &str) -> Result<String, DomainError> {
            Ok(format!("https://files.test/{document_id}.pdf"))
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl DocumentLoader for CountingLoader {
        async fn load(&self, _url: &str) -> Result<Vec<PageText>, DomainError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![PageText::new(1, "Invoice #42, due 2024-01-01")])
        }
    }

    struct CountingEmbedding {
        batches: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingService for CountingEmbedding {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![1.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| Embedding::new(vec![1.0, 0.0])).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn service(
        loader: Arc<CountingLoader>,
        embedding: Arc<CountingEmbedding>,
    ) -> NamespaceService {
        NamespaceService::new(
            Arc::new(StaticStorage),
            loader,
            embedding,
            Arc::new(InMemoryVectorIndex::new()),
            ChunkConfig::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn second_ensure_reuses_embeddings() {
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
        });
        let embedding = Arc::new(CountingEmbedding {
            batches: AtomicUsize::new(0),
        });
        let svc = service(loader.clone(), embedding.clone());

        let handle = svc.ensure_namespace("doc-1").await.unwrap();
        assert_eq!(handle.document_id(), "doc-1");
        assert!(svc.namespace_exists("doc-1").await.unwrap());

        svc.ensure_namespace("doc-1").await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(embedding.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_ensure_populates_once() {
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
        });
        let embedding = Arc::new(CountingEmbedding {
            batches: AtomicUsize::new(0),
        });
        let svc = Arc::new(service(loader.clone(), embedding.clone()));

        let (a, b) = tokio::join!(svc.ensure_namespace("doc-1"), svc.ensure_namespace("doc-1"));
        a.unwrap();
        b.unwrap();

        assert_eq!(embedding.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lock_map_is_pruned_after_population() {
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
        });
        let embedding = Arc::new(CountingEmbedding {
            batches: AtomicUsize::new(0),
        });
        let svc = service(loader, embedding);

        svc.ensure_namespace("doc-1").await.unwrap();
        assert!(svc.population_locks.lock().await.is_empty());

        svc.ensure_namespace("doc-1").await.unwrap();
        assert!(svc.population_locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn distinct_documents_populate_separately() {
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
        });
        let embedding = Arc::new(CountingEmbedding {
            batches: AtomicUsize::new(0),
        });
        let svc = service(loader.clone(), embedding.clone());

        svc.ensure_namespace("doc-1").await.unwrap();
        svc.ensure_namespace("doc-2").await.unwrap();

        assert_eq!(embedding.batches.load(Ordering::SeqCst), 2);
    }
}
