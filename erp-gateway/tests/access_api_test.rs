mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use common::{TEST_USER_ID, access_body, body_json, mount_token_endpoint, spawn_app};
use erp_gateway::models::access::CacheEnvelope;
use erp_gateway::services::permission_cache::{CACHE_KEY, CACHE_VERSION};
use service_core::store::KeyValueStore;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn access_path(user_id: &str) -> String {
    format!("/api/users/{}/access", user_id)
}

fn user_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", TEST_USER_ID)
        .body(Body::empty())
        .unwrap()
}

async fn mount_access(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(access_path(TEST_USER_ID)))
        .and(header("authorization", "Bearer tok-acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(access_body(TEST_USER_ID)))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn access_is_resolved_once_then_cached() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok-acc", 1).await;
    mount_access(&server, 1).await;

    let app = spawn_app(&server.uri());

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(user_request("GET", "/api/me/access"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, access_body(TEST_USER_ID));
    }

    let key = format!("{}:{}", CACHE_KEY, TEST_USER_ID);
    let raw = app.store.get(&key).await.unwrap().unwrap();
    let envelope: CacheEnvelope = serde_json::from_str(&raw).unwrap();
    assert_eq!(envelope.version, CACHE_VERSION);
}

#[tokio::test]
async fn expired_cache_entry_is_re_resolved() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok-acc", 1).await;
    mount_access(&server, 1).await;

    let app = spawn_app(&server.uri());
    let key = format!("{}:{}", CACHE_KEY, TEST_USER_ID);
    let stale = serde_json::json!({
        "data": access_body(TEST_USER_ID),
        "ts": Utc::now().timestamp_millis() - 25 * 3600 * 1000,
        "version": CACHE_VERSION
    });
    app.store.set(&key, &stale.to_string(), None).await.unwrap();

    let response = app
        .router
        .oneshot(user_request("GET", "/api/me/access"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw = app.store.get(&key).await.unwrap().unwrap();
    let envelope: CacheEnvelope = serde_json::from_str(&raw).unwrap();
    assert!(Utc::now().timestamp_millis() - envelope.ts < 60_000);
}

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = spawn_app("http://127.0.0.1:9");
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/me/access")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn path_traversal_user_id_is_rejected() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok-acc", 0).await;
    Mock::given(method("GET"))
        .and(path(access_path("victim")))
        .respond_with(ResponseTemplate::new(200).set_body_json(access_body("victim")))
        .expect(0)
        .mount(&server)
        .await;

    let app = spawn_app(&server.uri());
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/me/access")
                .header("x-user-id", "attacker/../victim")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn clear_removes_cached_entry() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok-acc", 1).await;
    mount_access(&server, 2).await;

    let app = spawn_app(&server.uri());

    let response = app
        .router
        .clone()
        .oneshot(user_request("GET", "/api/me/access"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(user_request("DELETE", "/api/me/access"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    // Only the brokered token remains
    assert_eq!(app.store.len(), 1);
    let key = format!("{}:{}", CACHE_KEY, TEST_USER_ID);
    assert!(app.store.get(&key).await.unwrap().is_none());

    let response = app
        .router
        .oneshot(user_request("GET", "/api/me/access"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn check_reports_explicit_grants_only() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok-acc", 1).await;
    mount_access(&server, 1).await;

    let app = spawn_app(&server.uri());

    let cases = [
        ("/api/me/access/check?module=sales", true),
        ("/api/me/access/check?module=sales&feature=sales.create_order", true),
        ("/api/me/access/check?feature=sales.delete_order", false),
        ("/api/me/access/check?module=hr", false),
    ];

    for (uri, expected) in cases {
        let response = app
            .router
            .clone()
            .oneshot(user_request("GET", uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "allowed": expected }),
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn check_without_target_is_bad_request() {
    let app = spawn_app("http://127.0.0.1:9");
    let response = app
        .router
        .oneshot(user_request("GET", "/api/me/access/check"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_rejection_invalidates_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "tok-acc", 2).await;
    Mock::given(method("GET"))
        .and(path(access_path(TEST_USER_ID)))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let app = spawn_app(&server.uri());
    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(user_request("GET", "/api/me/access"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
