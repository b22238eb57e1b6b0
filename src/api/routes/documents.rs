use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::middleware::OwnerId;
use crate::api::routes::status_for;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub completed: bool,
}

/// Explicit ingestion trigger: the UI calls this after an upload so the
/// first question does not pay the embedding latency. Idempotent — an
/// already-populated namespace is reused.
pub async fn generate_embeddings(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    OwnerId(_owner_id): OwnerId,
) -> Result<Json<EmbeddingsResponse>, StatusCode> {
    match state.namespace_service.ensure_namespace(&document_id).await {
        Ok(_handle) => Ok(Json(EmbeddingsResponse { completed: true })),
        Err(e) => {
            tracing::error!(error = %e, document_id, "embedding generation failed");
            Err(status_for(&e))
        }
    }
}
