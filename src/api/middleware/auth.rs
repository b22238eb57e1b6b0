use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};

/// Owner identity established by the external auth layer and forwarded as a
/// header. The core trusts the gateway; requests without it are rejected.
pub struct OwnerId(pub String);

pub const OWNER_HEADER: &str = "X-User-Id";

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| OwnerId(v.to_string()))
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
