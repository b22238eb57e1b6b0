use serde::{Deserialize, Serialize};

use crate::domain::entities::DocumentChunk;

/// One page of extracted text, as produced by the document loader. The
/// document record itself (source file, owner, upload state) lives with the
/// external storage layer; the core only handles the opaque document id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

impl PageText {
    pub fn new(page: usize, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// Proof that the embedding namespace for a document exists and is populated.
/// Handed out by `NamespaceService::ensure_namespace`; retrieval takes it
/// rather than a raw document id so an unpopulated namespace cannot be queried.
#[derive(Debug, Clone)]
pub struct NamespaceHandle {
    document_id: String,
}

impl NamespaceHandle {
    pub(crate) fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}

/// A chunk returned from similarity search, with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub chunk: DocumentChunk,
    pub score: f32,
}
