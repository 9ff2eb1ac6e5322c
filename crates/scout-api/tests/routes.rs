use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use scout_api::{AppStateInner, router};
use scout_core::{Engine, EngineConfig};
use scout_db::Database;
use scout_types::api::Claims;

const SECRET: &str = "integration-test-secret";
const AWARD: i64 = 25;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    let engine = Engine::new(
        db,
        EngineConfig {
            winner_reputation_award: AWARD,
        },
    );
    router(Arc::new(AppStateInner {
        engine,
        jwt_secret: SECRET.into(),
    }))
}

struct User {
    id: Uuid,
    token: String,
}

fn user(name: &str) -> User {
    let id = Uuid::new_v4();
    let claims = Claims {
        sub: id,
        email: Some(format!("{}@example.com", name)),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    User { id, token }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, who: &User, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(&who.token), Some(body)).await
}

async fn get(app: &Router, uri: &str, who: &User) -> (StatusCode, Value) {
    call(app, Method::GET, uri, Some(&who.token), None).await
}

async fn open_request(app: &Router, author: &User) -> String {
    let (status, body) = post(
        app,
        "/requests",
        author,
        json!({ "title": "Noise-cancelling headphones", "category": "audio" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["request"]["id"].as_str().unwrap().to_string()
}

async fn submit(app: &Router, request_id: &str, who: &User) -> String {
    let (status, body) = post(
        app,
        &format!("/requests/{}/submissions", request_id),
        who,
        json!({ "link": "https://shop.example/headphones", "priceCents": 12999 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["submissionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/favorites", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::GET, "/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn first_visit_creates_profile() {
    let app = app();
    let sam = user("sam");

    let (status, body) = get(&app, "/me", &sam).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["profile"]["id"], sam.id.to_string());
    assert_eq!(body["profile"]["username"], "sam");
    assert_eq!(body["profile"]["reputation"], 0);
}

#[tokio::test]
async fn winner_scenario_over_http() {
    let app = app();
    let a = user("ann");
    let b = user("ben");
    let c = user("cat");

    let r = open_request(&app, &a).await;
    let s1 = submit(&app, &r, &b).await;
    let s2 = submit(&app, &r, &c).await;

    let (status, body) = post(
        &app,
        "/votes",
        &b,
        json!({ "submissionId": s1, "requestId": r, "value": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "newState": "up", "score": 1 }));

    let (status, body) = post(
        &app,
        "/requests/select-winner",
        &b,
        json!({ "requestId": r, "submissionId": s1 }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, body) = post(
        &app,
        "/requests/select-winner",
        &a,
        json!({ "requestId": r, "submissionId": s1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, detail) = get(&app, &format!("/requests/{}", r), &c).await;
    assert_eq!(detail["request"]["status"], "solved");
    assert_eq!(detail["request"]["winningSubmissionId"], s1);
    assert_eq!(detail["submissions"][0]["id"], s1);
    assert_eq!(detail["submissions"][0]["isWinner"], true);
    assert_eq!(detail["submissions"][1]["id"], s2);

    let (_, inbox) = get(&app, "/notifications?unread=true", &b).await;
    assert_eq!(inbox["unreadCount"], 1);
    assert_eq!(inbox["notifications"][0]["payload"]["kind"], "winner_selected");

    let (_, me) = get(&app, "/me", &b).await;
    assert_eq!(me["profile"]["reputation"], AWARD);

    // Votes are still accepted once solved
    let (status, body) = post(&app, "/votes", &c, json!({ "submissionId": s1, "value": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 2);

    let (status, body) = post(&app, "/requests/close", &a, json!({ "requestId": r })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("solved"));
}

#[tokio::test]
async fn vote_input_is_validated() {
    let app = app();
    let a = user("ann");
    let b = user("ben");
    let r = open_request(&app, &a).await;
    let s = submit(&app, &r, &b).await;

    let (status, body) = post(&app, "/votes", &b, json!({ "submissionId": s, "value": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = post(&app, "/votes", &b, json!({ "value": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = post(
        &app,
        "/votes",
        &b,
        json!({ "submissionId": Uuid::new_v4(), "value": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn favorite_toggles() {
    let app = app();
    let a = user("ann");
    let b = user("ben");
    let r = open_request(&app, &a).await;

    let (_, body) = post(&app, "/favorites", &b, json!({ "requestId": r })).await;
    assert_eq!(body, json!({ "success": true, "isFavorite": true }));

    let (_, body) = get(&app, "/favorites", &b).await;
    assert_eq!(body["requests"][0]["id"], r);

    let (_, body) = post(&app, "/favorites", &b, json!({ "requestId": r })).await;
    assert_eq!(body, json!({ "success": true, "isFavorite": false }));
}

#[tokio::test]
async fn notification_ownership_is_enforced() {
    let app = app();
    let a = user("ann");
    let b = user("ben");
    let r = open_request(&app, &a).await;
    submit(&app, &r, &b).await;

    let (_, inbox) = get(&app, "/notifications", &a).await;
    assert_eq!(inbox["unreadCount"], 1);
    let id = inbox["notifications"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = post(&app, "/notifications/read", &b, json!({ "notificationId": id })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post(&app, "/notifications/read", &a, json!({ "notificationId": id })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = post(&app, "/notifications/read-all", &a, json!({})).await;
    assert_eq!(body, json!({ "success": true, "updated": 0 }));
}

#[tokio::test]
async fn reports_require_reason() {
    let app = app();
    let a = user("ann");
    let d = user("dan");
    let r = open_request(&app, &a).await;

    let (status, body) = post(
        &app,
        "/reports",
        &d,
        json!({ "targetType": "request", "targetId": r, "reason": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = post(
        &app,
        "/reports",
        &d,
        json!({ "targetType": "request", "targetId": r, "reason": "Scam link" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["reportId"].is_string());
}

#[tokio::test]
async fn list_rejects_unknown_status() {
    let app = app();
    let a = user("ann");
    open_request(&app, &a).await;

    let (status, _) = get(&app, "/requests?status=archived", &a).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/requests?status=open&category=audio", &a).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
}
