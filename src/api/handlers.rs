//! HTTP API handlers.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Acknowledgment returned by the root health check.
pub const HEALTH_MESSAGE: &str = "FastAPI RAG 서버가 실행 중입니다.";

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Fixed acknowledgment string.
    #[schema(example = "FastAPI RAG 서버가 실행 중입니다.")]
    pub message: String,
}

impl HealthResponse {
    /// The one value this endpoint ever returns.
    pub fn ack() -> Self {
        Self {
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

/// Health check handler - always returns 200 with the same body.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn read_root() -> Json<HealthResponse> {
    Json(HealthResponse::ack())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes_to_single_message_key() {
        let value = serde_json::to_value(HealthResponse::ack()).unwrap();
        assert_eq!(value, serde_json::json!({ "message": HEALTH_MESSAGE }));
    }

    #[tokio::test]
    async fn read_root_is_constant() {
        let Json(first) = read_root().await;
        let Json(second) = read_root().await;
        assert_eq!(first, second);
        assert_eq!(first.message, HEALTH_MESSAGE);
    }
}
