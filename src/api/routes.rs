//! HTTP API route definitions.

use axum::{routing::get, Router};
use utoipa_swagger_ui::SwaggerUi;

use super::docs::{openapi_for, DOCS_PATH, OPENAPI_PATH};
use super::handlers::read_root;
use crate::app::AppInfo;

/// Create the API router: root health check plus the API documentation.
pub fn create_router(info: &AppInfo) -> Router {
    Router::new()
        .route("/", get(read_root))
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, openapi_for(info)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::HEALTH_MESSAGE;
    use crate::app::APP_INFO;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_endpoint_returns_ok() {
        let app = create_router(&APP_INFO);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], HEALTH_MESSAGE);
    }

    #[tokio::test]
    async fn post_to_root_is_not_allowed() {
        let app = create_router(&APP_INFO);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = create_router(&APP_INFO);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(OPENAPI_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["info"]["title"], APP_INFO.title);
        assert_eq!(json["info"]["version"], APP_INFO.version);
    }
}
