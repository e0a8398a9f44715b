// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Router-level tests for the sports academy API.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sports_academy_server::{
    api::router, auth::TokenService, state::AppState, storage::DocumentStore,
};
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

struct TestApp {
    app: Router,
    tokens: TokenService,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_state(|state| state)
    }

    fn with_state(configure: impl FnOnce(AppState) -> AppState) -> Self {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(&dir.path().join("api.redb")).unwrap();
        let state = configure(AppState::new(store, TokenService::new(SECRET)));
        Self {
            app: router(state),
            tokens: TokenService::new(SECRET),
            _dir: dir,
        }
    }

    fn token(&self, email: &str) -> String {
        self.tokens.issue(email).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, json)
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/users",
                None,
                Some(json!({ "name": "Test", "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["insertedId"].as_str().unwrap().to_string()
    }

    async fn create_listing(&self, name: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/sports",
                None,
                Some(json!({
                    "class_name": name,
                    "instructor_name": "Coach",
                    "email": "coach@example.com",
                    "available_seats": 10,
                    "price": 40.0
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["insertedId"].as_str().unwrap().to_string()
    }

    async fn select(&self, email: &str, class_id: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/classes",
                None,
                Some(json!({ "email": email, "classId": class_id, "price": 40.0 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["insertedId"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn root_and_health() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "sports server is running");

    let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["store"], "ok");
}

#[tokio::test]
async fn registering_twice_keeps_one_user() {
    let app = TestApp::new();
    app.register("sam@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({ "email": "sam@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "existing user" }));

    let admin_id = app.register("admin@example.com").await;
    app.send(
        Method::PATCH,
        &format!("/users/admin/{admin_id}"),
        None,
        None,
    )
    .await;
    let token = app.token("admin@example.com");
    let (status, body) = app.send(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_route_requires_token_and_role() {
    let app = TestApp::new();
    app.register("sam@example.com").await;

    let (status, body) = app.send(Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "missing_auth_header");

    let (status, _) = app
        .send(Method::GET, "/users", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.token("sam@example.com");
    let (status, _) = app.send(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_endpoint_issues_usable_tokens() {
    let app = TestApp::new();
    let id = app.register("sam@example.com").await;
    app.send(Method::PATCH, &format!("/users/instructor/{id}"), None, None)
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/jwt",
            None,
            Some(json!({ "email": "sam@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::GET,
            "/users/instructor/sam@example.com",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "instructor": true }));

    let (_, body) = app
        .send(
            Method::GET,
            "/users/admin/sam@example.com",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body, json!({ "admin": false }));
}

#[tokio::test]
async fn classes_listing_is_scoped_to_token_email() {
    let app = TestApp::new();
    let listing = app.create_listing("Cricket").await;
    app.select("kid@example.com", &listing).await;

    let token = app.token("intruder@example.com");
    let (status, _) = app
        .send(
            Method::GET,
            "/classes?email=kid@example.com",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::GET, "/classes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let token = app.token("kid@example.com");
    let (_, body) = app
        .send(
            Method::GET,
            "/classes?email=kid@example.com",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn payment_completion_moves_all_three_documents() {
    let app = TestApp::new();
    let listing = app.create_listing("Cricket").await;
    let selection = app.select("kid@example.com", &listing).await;
    let token = app.token("kid@example.com");

    let (status, body) = app
        .send(
            Method::POST,
            "/payments",
            Some(&token),
            Some(json!({
                "email": "kid@example.com",
                "price": 40.0,
                "transactionId": "pi_abc",
                "course": selection,
                "classId": listing,
                "className": "Cricket"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleteResult"]["deletedCount"], 1);
    assert_eq!(body["updateResult"]["modifiedCount"], 1);

    let (_, payments) = app
        .send(
            Method::GET,
            "/payments?email=kid@example.com",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(payments.as_array().unwrap().len(), 1);

    let (_, selections) = app
        .send(Method::GET, &format!("/classes/{selection}"), None, None)
        .await;
    assert_eq!(selections, json!([]));

    let (_, listings) = app
        .send(Method::GET, &format!("/sports/{listing}"), None, None)
        .await;
    assert_eq!(listings[0]["num_students"], 1);
    assert_eq!(listings[0]["available_seats"], 9);

    let (status, _) = app
        .send(
            Method::POST,
            "/payments",
            Some(&token),
            Some(json!({
                "email": "kid@example.com",
                "amount": 40.0,
                "transactionId": "pi_abc",
                "course": selection,
                "classId": listing
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn payments_require_a_token() {
    let app = TestApp::new();
    let (status, _) = app
        .send(Method::GET, "/payments?email=kid@example.com", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/create-payment-intent",
            None,
            Some(json!({ "price": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sports_are_sorted_by_enrollment() {
    let app = TestApp::new();
    let quiet = app.create_listing("Archery").await;
    let busy = app.create_listing("Football").await;
    let token = app.token("kid@example.com");

    for _ in 0..2 {
        let selection = app.select("kid@example.com", &busy).await;
        app.send(
            Method::POST,
            "/payments",
            Some(&token),
            Some(json!({
                "email": "kid@example.com",
                "amount": 40.0,
                "course": selection,
                "classId": busy
            })),
        )
        .await;
    }

    let (_, listings) = app.send(Method::GET, "/sports", None, None).await;
    let ids: Vec<&str> = listings
        .as_array()
        .unwrap()
        .iter()
        .map(|listing| listing["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![busy.as_str(), quiet.as_str()]);
}

#[tokio::test]
async fn approve_and_deny_through_router() {
    let app = TestApp::new();
    let listing = app.create_listing("Cricket").await;

    let uri = format!("/sports/approved/{listing}");
    let (_, first) = app.send(Method::PATCH, &uri, None, None).await;
    assert_eq!(first["modifiedCount"], 1);
    let (_, second) = app.send(Method::PATCH, &uri, None, None).await;
    assert_eq!(second["modifiedCount"], 0);

    app.send(Method::PATCH, &format!("/sports/denied/{listing}"), None, None)
        .await;
    let (_, listings) = app
        .send(Method::GET, &format!("/sports/{listing}"), None, None)
        .await;
    assert_eq!(listings[0]["status"], "denied");
}

#[tokio::test]
async fn guarded_mutations_need_admin_when_enabled() {
    let app = TestApp::with_state(|state| state.with_require_admin_for_mutations(true));
    let listing = app.create_listing("Cricket").await;
    let uri = format!("/sports/approved/{listing}");

    let (status, _) = app.send(Method::PATCH, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.register("coach@example.com").await;
    let token = app.token("coach@example.com");
    let (status, _) = app.send(Method::PATCH, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_bodies_and_ids_are_bad_requests() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/sports", None, Some(json!({ "class_name": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.send(Method::GET, "/sports/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/classes",
            None,
            Some(json!({ "email": "kid@example.com", "classId": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
