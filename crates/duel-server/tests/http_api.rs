//! Integration tests for the HTTP API.
//!
//! The router is driven in-process, so no ports or child processes are needed.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use duel_core::{commit, Allocation, DuelRegistry, DuelStore, MemoryStore, Secret};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store: Arc<dyn DuelStore> = Arc::new(MemoryStore::new());
    duel_server::create_router(Arc::new(DuelRegistry::new(store)))
}

async fn call(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn commitment(powers: [u32; 3], secret: &str) -> String {
    commit(&Allocation::new(powers).unwrap(), &Secret::new(secret)).to_string()
}

async fn create_and_join(app: &Router) -> String {
    let (status, duel) = call(
        app,
        Method::POST,
        "/api/duels",
        Some(json!({ "creator": "A", "stake": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = duel["id"].as_str().unwrap().to_string();

    let (status, duel) = call(
        app,
        Method::POST,
        &format!("/api/duels/{}/join", id),
        Some(json!({ "opponent": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(duel["status"], "committing");
    id
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_duel_over_http() {
    let app = app();
    let id = create_and_join(&app).await;

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/commit", id),
        Some(json!({ "party": "A", "commitment": commitment([6, 2, 2], "sA") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, duel) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/commit", id),
        Some(json!({ "party": "B", "commitment": commitment([4, 3, 3], "sB") })),
    )
    .await;
    assert_eq!(duel["status"], "revealing");

    call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/reveal", id),
        Some(json!({ "party": "A", "allocation": [6, 2, 2], "secret": "sA" })),
    )
    .await;
    let (status, duel) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/reveal", id),
        Some(json!({ "party": "B", "allocation": [4, 3, 3], "secret": "sB" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(duel["status"], "showdown");

    let mut last = Value::Null;
    for _ in 0..3 {
        let (status, duel) = call(
            &app,
            Method::POST,
            &format!("/api/duels/{}/advance", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = duel;
    }
    assert_eq!(last["status"], "completed");
    assert_eq!(last["winner"], "B");
    assert_eq!(last["revealed_rounds"].as_array().unwrap().len(), 3);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/advance", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "wrong_phase");
}

#[tokio::test]
async fn test_error_kinds_are_distinguishable() {
    let app = app();
    let id = create_and_join(&app).await;
    for (party, powers, secret) in [("A", [6, 2, 2], "sA"), ("B", [4, 3, 3], "sB")] {
        call(
            &app,
            Method::POST,
            &format!("/api/duels/{}/commit", id),
            Some(json!({ "party": party, "commitment": commitment(powers, secret) })),
        )
        .await;
    }

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/reveal", id),
        Some(json!({ "party": "A", "allocation": [6, 2, 2], "secret": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "commitment_verification_failed");
    assert_eq!(body["retryable"], false);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/reveal", id),
        Some(json!({ "party": "A", "allocation": [5, 5, 5], "secret": "sA" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_allocation.budget_mismatch");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/commit", id),
        Some(json!({ "party": "Mallory", "commitment": commitment([6, 2, 2], "x") })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_a_participant");
}

#[tokio::test]
async fn test_join_conflicts() {
    let app = app();
    let id = create_and_join(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/join", id),
        Some(json!({ "opponent": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_joined");

    let (_, duel) = call(&app, Method::POST, "/api/duels", Some(json!({ "creator": "A", "stake": 5 }))).await;
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/duels/{}/join", duel["id"].as_str().unwrap()),
        Some(json!({ "opponent": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "self_join");
}

#[tokio::test]
async fn test_listing_and_delete() {
    let app = app();
    let joined = create_and_join(&app).await;
    let (_, open) = call(&app, Method::POST, "/api/duels", Some(json!({ "creator": "C", "stake": 5 }))).await;
    let open_id = open["id"].as_str().unwrap().to_string();

    let (status, list) = call(&app, Method::GET, "/api/duels/open", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = list["duels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![open_id.as_str()]);

    let (_, mine) = call(&app, Method::GET, "/api/parties/B/duels", None).await;
    assert_eq!(mine["duels"][0]["id"], joined.as_str());

    let (status, _) = call(&app, Method::DELETE, &format!("/api/duels/{}", joined), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&app, Method::GET, &format!("/api/duels/{}", joined), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_zero_stake_rejected() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/duels",
        Some(json!({ "creator": "A", "stake": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_stake");
}

#[tokio::test]
async fn test_undecodable_requests_use_error_body() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/duels")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["retryable"], false);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/duels",
        Some(json!({ "creator": "A", "stake": "lots" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = call(&app, Method::GET, "/api/duels/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}
