use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::{ports::DocumentStorage, DomainError};

/// Resolves download URLs through the external document-storage service.
pub struct HttpDocumentStorage {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct DocumentRecord {
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
}

impl HttpDocumentStorage {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DocumentStorage for HttpDocumentStorage {
    async fn download_url(&self, document_id: &str) -> Result<String, DomainError> {
        let url = format!("{}/documents/{document_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::fetch(format!("GET {url}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::not_found(format!(
                "document {document_id} not found in storage"
            )));
        }
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::fetch(format!("GET {url} returned {status}")));
        }

        let record: DocumentRecord = response
            .json()
            .await
            .map_err(|e| DomainError::parse(format!("storage record for {document_id}: {e}")))?;

        record
            .download_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                DomainError::not_found(format!("download URL not found for {document_id}"))
            })
    }
}
