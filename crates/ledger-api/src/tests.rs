use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use ledger_objectstore::{FailingObjectStore, InMemoryObjectStore};
use ledger_queue::{FailingQueue, InMemoryQueue};
use ledger_store::{FailingStore, InMemoryStore};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use crate::app::build_app;
use crate::state::AppState;

fn test_state() -> AppState {
    AppState {
        store: Arc::new(InMemoryStore::new()),
        objects: Arc::new(InMemoryObjectStore::new()),
        queue: Arc::new(InMemoryQueue::new()),
        region: Arc::new("us-east-1".to_string()),
    }
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the `transaction` object out of a `POST /transactions` response
/// body shaped `{transaction, message}`.
async fn created_transaction(resp: axum::response::Response) -> Value {
    body_json(resp).await["transaction"].clone()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn valid_ingest_body() -> Value {
    json!({ "from_account": "acct-1", "to_account": "acct-2", "amount": "10.50" })
}

#[tokio::test]
async fn live_always_returns_200() {
    let app = build_app(test_state());
    let resp = app.oneshot(get("/live")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn create_transaction_persists_audits_and_enqueues() {
    let objects = Arc::new(InMemoryObjectStore::new());
    let queue = Arc::new(InMemoryQueue::new());
    let state = AppState {
        store: Arc::new(InMemoryStore::new()),
        objects: objects.clone(),
        queue: queue.clone(),
        region: Arc::new("us-east-1".to_string()),
    };
    let app = build_app(state);

    let resp = app.oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = created_transaction(resp).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["status"], "pending");

    let key = format!("transactions/us-east-1/{id}.json");
    assert!(objects.get(&key).await.is_some());
    assert_eq!(queue.len().await, 1);
}

#[tokio::test]
async fn create_transaction_rejects_empty_account() {
    let app = build_app(test_state());
    let body = json!({ "from_account": "", "to_account": "acct-2", "amount": "10.00" });
    let resp = app.oneshot(post("/transactions", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_transaction_rejects_non_positive_amount() {
    let app = build_app(test_state());
    let body = json!({ "from_account": "acct-1", "to_account": "acct-2", "amount": "0.00" });
    let resp = app.oneshot(post("/transactions", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_transaction_rejects_malformed_amount() {
    let app = build_app(test_state());
    let body = json!({ "from_account": "acct-1", "to_account": "acct-2", "amount": "not-a-number" });
    let resp = app.oneshot(post("/transactions", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_transaction_round_trips() {
    let app = build_app(test_state());
    let resp = app.clone().oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    let created = created_transaction(resp).await;
    let id = created["id"].as_str().unwrap();

    let resp = app.oneshot(get(&format!("/transactions/{id}"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn get_transaction_missing_returns_404() {
    let app = build_app(test_state());
    let resp = app.oneshot(get("/transactions/00000000-0000-0000-0000-000000000000")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_transactions_reverts_out_of_range_limit_to_default() {
    for limit in ["10000", "200", "101", "-1", "abc"] {
        let app = build_app(test_state());
        let resp = app
            .oneshot(get(&format!("/transactions?limit={limit}&offset=0")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["limit"], 50, "limit={limit} should revert to the default");
    }
}

#[tokio::test]
async fn list_transactions_honors_in_range_limit() {
    let app = build_app(test_state());
    let resp = app.oneshot(get("/transactions?limit=100")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn list_transactions_clamps_negative_offset_to_zero() {
    let app = build_app(test_state());
    let resp = app.oneshot(get("/transactions?offset=-5")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["offset"], 0);
}

#[tokio::test]
async fn status_transition_pending_to_completed_succeeds() {
    let app = build_app(test_state());
    let resp = app.clone().oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    let created = created_transaction(resp).await;
    let id = created["id"].as_str().unwrap();

    let resp = app
        .oneshot(patch(&format!("/transactions/{id}/status"), json!({ "status": "completed" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["status"], "completed");
}

#[tokio::test]
async fn status_transition_from_terminal_state_is_rejected() {
    let app = build_app(test_state());
    let resp = app.clone().oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    let created = created_transaction(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(patch(&format!("/transactions/{id}/status"), json!({ "status": "completed" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(patch(&format!("/transactions/{id}/status"), json!({ "status": "failed" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn stats_reflects_created_transactions() {
    let app = build_app(test_state());
    let app = app;
    let resp = app.clone().oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_transactions"], 1);
}

#[tokio::test]
async fn health_ok_when_all_dependencies_healthy() {
    let app = build_app(test_state());
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["region"], "us-east-1");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["s3"], "ok");
    assert_eq!(body["sqs"], "ok");
}

#[tokio::test]
async fn health_unavailable_when_store_down() {
    let state = AppState {
        store: Arc::new(FailingStore),
        objects: Arc::new(InMemoryObjectStore::new()),
        queue: Arc::new(InMemoryQueue::new()),
        region: Arc::new("us-east-1".to_string()),
    };
    let app = build_app(state);
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn create_transaction_fails_when_store_down() {
    let state = AppState {
        store: Arc::new(FailingStore),
        objects: Arc::new(InMemoryObjectStore::new()),
        queue: Arc::new(InMemoryQueue::new()),
        region: Arc::new("us-east-1".to_string()),
    };
    let app = build_app(state);
    let resp = app.oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn create_transaction_succeeds_despite_audit_store_outage() {
    let state = AppState {
        store: Arc::new(InMemoryStore::new()),
        objects: Arc::new(FailingObjectStore),
        queue: Arc::new(InMemoryQueue::new()),
        region: Arc::new("us-east-1".to_string()),
    };
    let app = build_app(state);
    let resp = app.oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn create_transaction_succeeds_despite_queue_outage() {
    let state = AppState {
        store: Arc::new(InMemoryStore::new()),
        objects: Arc::new(InMemoryObjectStore::new()),
        queue: Arc::new(FailingQueue),
        region: Arc::new("us-east-1".to_string()),
    };
    let app = build_app(state);
    let resp = app.oneshot(post("/transactions", valid_ingest_body())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_app(test_state());
    let resp = app.oneshot(get("/no-such-route")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
