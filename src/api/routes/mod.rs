pub mod chat;
pub mod documents;
pub mod health;

use axum::http::{header, Method, StatusCode};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::state::AppState;
use crate::domain::DomainError;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.server.allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/documents/{id}/ask", post(chat::ask_question))
        .route("/documents/{id}/chat", get(chat::get_history))
        .route("/documents/{id}/embeddings", post(documents::generate_embeddings))
}

pub(crate) fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Fetch(_) | DomainError::Generation(_) => StatusCode::BAD_GATEWAY,
        DomainError::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
