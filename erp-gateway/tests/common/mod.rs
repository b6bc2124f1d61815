#![allow(dead_code)]

use axum::{body::Body, http::Response};
use erp_gateway::AppState;
use erp_gateway::config::{
    AccessSettings, BackendSettings, IdentitySettings, ObservabilitySettings, ServerSettings,
    Settings,
};
use erp_gateway::services::TokenBroker;
use erp_gateway::startup::build_router;
use http_body_util::BodyExt;
use secrecy::Secret;
use service_core::store::{KeyValueStore, MemoryStore, StoreSettings};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth/token";
pub const TEST_USER_ID: &str = "user-123";

pub fn settings(upstream: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        observability: ObservabilitySettings::default(),
        store: StoreSettings::Memory,
        identity: identity_settings(upstream),
        backend: BackendSettings {
            url: upstream.to_string(),
            categories_path: "/api/categories".to_string(),
            access_path: "/api/users/{user_id}/access".to_string(),
        },
        access: AccessSettings::default(),
    }
}

pub fn identity_settings(upstream: &str) -> IdentitySettings {
    IdentitySettings {
        provider: "test".to_string(),
        token_url: format!("{}{}", upstream, TOKEN_PATH),
        client_id: "erp-gateway".to_string(),
        client_secret: Secret::new("s3cret".to_string()),
        scope: None,
    }
}

pub fn broker(upstream: &str, store: Arc<dyn KeyValueStore>) -> TokenBroker {
    TokenBroker::new(identity_settings(upstream), store)
}

pub struct TestApp {
    pub router: axum::Router,
    pub store: Arc<MemoryStore>,
}

pub fn spawn_app(upstream: &str) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), &settings(upstream));
    TestApp {
        router: build_router(state),
        store,
    }
}

pub fn token_body(access_token: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "access_token": access_token,
        "refresh_token": "refresh-1",
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Token endpoint that must be hit exactly `times` times.
pub async fn mount_token_endpoint(server: &MockServer, access_token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access_token, 3600)))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn access_body(user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "profile": {
            "id": user_id,
            "full_name": "Nguyễn Thị Hoa",
            "email": "hoa@example.vn",
            "branch_id": 2
        },
        "role": { "id": "role-sales", "name": "sales", "level": 3 },
        "modules": ["sales", "customers"],
        "features": ["sales.create_order", "customers.view"]
    })
}
