pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::patterns::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/patterns",
            get(handlers::handle_list_patterns).post(handlers::handle_create_pattern),
        )
        .route("/api/v1/availability", get(handlers::handle_availability))
        .route("/api/v1/status", get(handlers::handle_get_status))
        .route(
            "/api/v1/status/dismiss",
            post(handlers::handle_dismiss_status),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, StoreBackend};
    use crate::patterns::encryption::SimulatedFheEncryptor;
    use crate::patterns::index::INDEX_KEY;
    use crate::patterns::repository::PatternRepository;
    use crate::status::TransactionStatusMachine;
    use crate::store::{MemoryStore, StoreError};

    const OWNER: &str = "0x2546bcd3c84621e976d8185a91a922ae77ecec30";

    fn test_state(store: Arc<MemoryStore>) -> AppState {
        AppState {
            repository: Arc::new(PatternRepository::new(
                store,
                Arc::new(SimulatedFheEncryptor),
            )),
            status: TransactionStatusMachine::default(),
            config: Config {
                store_backend: StoreBackend::Memory,
                redis_url: None,
                s3: None,
                store_timeout: Duration::from_secs(1),
                success_dismiss: Duration::from_secs(2),
                error_dismiss: Duration::from_secs(3),
                port: 0,
                rust_log: "info".to_string(),
            },
        }
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(test_state(Arc::new(MemoryStore::new())));
        let (status, body) = send(router, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store_backend"], "memory");
    }

    #[tokio::test]
    async fn test_create_then_list_with_search_and_stats() {
        let router = build_router(test_state(Arc::new(MemoryStore::new())));

        let (status, created) = send(
            router.clone(),
            post_json(
                "/api/v1/patterns",
                json!({
                    "owner": OWNER,
                    "interaction_type": "Wave Pattern",
                    "description": "tidal shimmer",
                    "intensity_level": 42
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, status_body) = send(router.clone(), get_req("/api/v1/status")).await;
        assert_eq!(status_body["state"], "success");

        let (status, listing) = send(router.clone(), get_req("/api/v1/patterns")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["store_available"], true);
        assert_eq!(listing["patterns"][0]["id"], id.as_str());
        assert_eq!(listing["patterns"][0]["interaction_type"], "Wave Pattern");
        assert_eq!(listing["patterns"][0]["intensity"], 42);
        assert_eq!(listing["stats"]["medium"], 1);

        let (_, filtered) = send(router, get_req("/api/v1/patterns?search=sparkle")).await;
        assert_eq!(filtered["patterns"].as_array().unwrap().len(), 0);
        assert_eq!(filtered["stats"]["total"], 1);
    }

    #[tokio::test]
    async fn test_create_validation_error() {
        let store = Arc::new(MemoryStore::new());
        let router = build_router(test_state(store.clone()));
        let (status, body) = send(
            router,
            post_json(
                "/api/v1/patterns",
                json!({ "owner": OWNER, "interaction_type": "", "intensity_level": 42 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let store = Arc::new(MemoryStore::new());
        let router = build_router(test_state(store.clone()));

        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/v1/patterns",
                json!({ "owner": OWNER, "interaction_type": "Wave Pattern", "intensity_level": -5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to deserialize the JSON body"));

        let not_json = Request::post("/api/v1/patterns")
            .header("content-type", "application/json")
            .body(Body::from("{\"owner\": "))
            .unwrap();
        let (status, body) = send(router.clone(), not_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, status_body) = send(router, get_req("/api/v1/status")).await;
        assert_eq!(status_body["state"], "idle");
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_user_declined_maps_to_conflict() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_to(INDEX_KEY, StoreError::Rejected("denied".into()));
        let router = build_router(test_state(store));
        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/v1/patterns",
                json!({ "owner": OWNER, "interaction_type": "Random Sparkle" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "USER_DECLINED");

        let (_, dismissed) = send(router, post_json("/api/v1/status/dismiss", json!({}))).await;
        assert_eq!(dismissed["dismissed"], true);
        assert_eq!(dismissed["status"]["state"], "idle");
    }

    #[tokio::test]
    async fn test_unavailable_store_lists_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let router = build_router(test_state(store));

        let (_, listing) = send(router.clone(), get_req("/api/v1/patterns")).await;
        assert_eq!(listing["store_available"], false);
        assert_eq!(listing["patterns"].as_array().unwrap().len(), 0);

        let (_, availability) = send(router, get_req("/api/v1/availability")).await;
        assert_eq!(availability["available"], false);
    }
}
