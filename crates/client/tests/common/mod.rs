#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::json;

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// Identity endpoint with a fixed user table.
#[derive(Default)]
pub struct FakeIdentity {
    pub requests: AtomicUsize,
}

impl FakeIdentity {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn token(State(state): State<Arc<FakeIdentity>>, Form(creds): Form<Credentials>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let ok = |body: serde_json::Value| (StatusCode::OK, Json(body)).into_response();

    match (creds.username.as_str(), creds.password.as_str()) {
        ("alice", "pw1") => ok(json!({
            "access_token": "t1",
            "token_type": "bearer",
            "role": "transcriber",
            "username": "someone-else"
        })),
        ("root", "pw") => ok(json!({
            "access_token": "t-admin",
            "token_type": "bearer",
            "role": "admin"
        })),
        ("carol", "pw") => ok(json!({
            "access_token": "t3",
            "token_type": "bearer",
            "role": "datacollector"
        })),
        ("norole", "pw") => ok(json!({"access_token": "t4", "token_type": "bearer"})),
        ("mallory", "pw") => ok(json!({
            "access_token": "t5",
            "token_type": "bearer",
            "role": "superuser"
        })),
        ("garbled", "pw") => (StatusCode::OK, "welcome!").into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response(),
    }
}

pub fn identity_app(state: Arc<FakeIdentity>) -> Router {
    Router::new().route("/token", post(token)).with_state(state)
}

pub async fn spawn_identity() -> (TestServer, Arc<FakeIdentity>) {
    let state = Arc::new(FakeIdentity::default());
    let server = TestServer::spawn(identity_app(state.clone())).await;
    (server, state)
}
