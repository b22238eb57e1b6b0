use async_trait::async_trait;
use tracing::debug;

use crate::domain::{ports::DocumentLoader, DomainError, PageText};

/// Downloads a PDF over HTTP and extracts per-page text. Fetch problems
/// (unreachable host, non-success status) and parse problems (not a valid
/// PDF) surface as distinct errors; neither is retried here.
pub struct HttpPdfLoader {
    client: reqwest::Client,
}

impl HttpPdfLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpPdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for HttpPdfLoader {
    async fn load(&self, url: &str) -> Result<Vec<PageText>, DomainError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::fetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::fetch(format!("GET {url} returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::fetch(format!("reading body of {url}: {e}")))?;

        debug!(url, bytes = bytes.len(), "document downloaded");

        // PDF parsing is CPU-bound; keep it off the async workers.
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| DomainError::internal(format!("extraction task failed: {e}")))?
        .map_err(|e| DomainError::parse(format!("invalid PDF: {e}")))?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i + 1, text))
            .collect())
    }
}
