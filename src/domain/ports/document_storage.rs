use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Resolves a document id to a signed download URL. The storage service
/// itself (uploads, CDN) is an external collaborator.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn download_url(&self, document_id: &str) -> Result<String, DomainError>;
}
