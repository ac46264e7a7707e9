//! Top-level router assembly.

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::account::account_routes;
use super::auth::{CORRELATION_ID_HEADER, USER_ID_HEADER};
use super::progress::progress_routes;
use super::state::AppState;

/// Create the complete API router.
///
/// # Routes
/// - `GET /health` - Liveness probe
/// - `/api/...` - Progress and account endpoints
pub fn api_router(state: AppState) -> Router {
    let api = Router::new().merge(progress_routes()).merge(account_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// Wraps a router with tracing, request timeout and CORS.
pub fn with_middleware(router: Router, server: &ServerConfig) -> Router {
    router
        .layer(cors_layer(server))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(CORRELATION_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(CORRELATION_ID_HEADER)])
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::memory::InMemoryStore;
    use crate::application::ProgressSettings;

    fn router() -> Router {
        let state = AppState::in_memory(Arc::new(InMemoryStore::new()), ProgressSettings::default(), false);
        api_router(state)
    }

    #[tokio::test]
    async fn preflight_allows_identity_headers() {
        let server = ServerConfig {
            cors_origins: Some("http://localhost:5173".into()),
            ..ServerConfig::default()
        };
        let app = with_middleware(router(), &server);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/progress")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, USER_ID_HEADER)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains(USER_ID_HEADER), "{}", allowed);
        assert!(allowed.contains(CORRELATION_ID_HEADER), "{}", allowed);
    }

    #[tokio::test]
    async fn health_needs_no_identity() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn api_routes_require_identity() {
        for (method, uri) in [
            (Method::GET, "/api/progress"),
            (Method::GET, "/api/stats"),
            (Method::POST, "/api/delete-account"),
        ] {
            let response = router()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn middleware_keeps_routes_reachable() {
        let app = with_middleware(router(), &ServerConfig::default());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
