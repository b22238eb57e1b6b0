use async_trait::async_trait;

use crate::domain::{errors::DomainError, PageText};

/// Fetches raw document bytes from a URL and extracts page-level text.
/// `Fetch` when the URL is unreachable or returns non-success; `Parse` when
/// the bytes are not a valid document. No retry; failures propagate.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Vec<PageText>, DomainError>;
}
