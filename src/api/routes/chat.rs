use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::OwnerId;
use crate::api::routes::status_for;
use crate::api::state::AppState;
use crate::domain::{ConversationTurn, TurnRole};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub role: &'static str,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ConversationTurn> for TurnResponse {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            role: match turn.role {
                TurnRole::Human => "human",
                TurnRole::Assistant => "assistant",
            },
            text: turn.text,
            created_at: turn.created_at,
        }
    }
}

pub async fn ask_question(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    OwnerId(owner_id): OwnerId,
    Json(request): Json<AskRequest>,
) -> (StatusCode, Json<AskResponse>) {
    match state
        .chat_service
        .ask_question(&document_id, &owner_id, &request.question)
        .await
    {
        Ok(answer) => (
            StatusCode::OK,
            Json(AskResponse {
                success: true,
                answer: Some(answer),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, document_id, "ask_question failed");
            (
                status_for(&e),
                Json(AskResponse {
                    success: false,
                    answer: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Vec<TurnResponse>>, StatusCode> {
    match state.chat_service.history(&document_id, &owner_id).await {
        Ok(turns) => Ok(Json(turns.into_iter().map(TurnResponse::from).collect())),
        Err(e) => {
            tracing::error!(error = %e, document_id, "history lookup failed");
            Err(status_for(&e))
        }
    }
}
