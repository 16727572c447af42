#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes::{self, auth::ServerState};
use service::auth::{repository::mock::MockAuthRepository, service::AuthConfig, AuthService};
use service::works::{repository::mock::MemoryStore, WorksService};

pub const SECRET: &str = "test-secret";

/// Router wired to in-memory stores.
pub fn app() -> Router {
    let store = Arc::new(MemoryStore::default());
    let works = WorksService::new(store.clone(), store, 10);
    let auth = AuthService::new(
        Arc::new(MockAuthRepository::default()),
        AuthConfig { jwt_secret: SECRET.into(), token_ttl_hours: 12 },
    );
    let state = ServerState { works: Arc::new(works), auth: Arc::new(auth) };
    routes::build_router(tower_http::cors::CorsLayer::very_permissive(), state)
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn location(&self) -> &str {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or("")
    }

    /// `auth_token=...` from the `Set-Cookie` header, ready for a `Cookie` header.
    pub fn session_cookie(&self) -> String {
        let raw = self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or("");
        raw.split(';').next().unwrap_or("").to_string()
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    let req = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().call(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply { status, headers, body }
}

/// Log `username` in and return the session cookie.
pub async fn login(app: &Router, username: &str) -> String {
    let reply = send(app, "POST", "/auth/login", None, Some(json!({"username": username}))).await;
    assert_eq!(reply.status, StatusCode::FOUND);
    reply.session_cookie()
}

pub fn work(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "creator": "Sandi Metz",
        "description": "Design",
        "publication_year": 2012,
        "category": category,
    })
}
