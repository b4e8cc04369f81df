#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use interview_backend::{config::Config, routes, AppState};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tower::ServiceExt;

#[derive(Clone)]
struct UpstreamState {
    replies: Arc<Mutex<VecDeque<(StatusCode, JsonValue)>>>,
    requests: Arc<Mutex<Vec<JsonValue>>>,
    hits: Arc<AtomicUsize>,
}

/// Chat-completions stand-in bound to an ephemeral local port.
pub struct FakeUpstream {
    pub base_url: String,
    state: UpstreamState,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<JsonValue> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn chat_completions(
    State(state): State<UpstreamState>,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(body);
    let mut replies = state.replies.lock().unwrap();
    // The last scripted reply repeats once the script runs out.
    let reply = if replies.len() > 1 {
        replies.pop_front()
    } else {
        replies.front().cloned()
    };
    let (status, body) = reply.unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({})));
    (status, Json(body))
}

pub async fn spawn_upstream(replies: Vec<(StatusCode, JsonValue)>) -> FakeUpstream {
    let state = UpstreamState {
        replies: Arc::new(Mutex::new(replies.into())),
        requests: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve upstream");
    });

    FakeUpstream {
        base_url: format!("http://{}/v1", addr),
        state,
    }
}

pub fn chat(content: impl Into<String>) -> (StatusCode, JsonValue) {
    (
        StatusCode::OK,
        json!({ "choices": [{ "message": { "role": "assistant", "content": content.into() } }] }),
    )
}

pub fn questions(items: Vec<JsonValue>) -> (StatusCode, JsonValue) {
    chat(json!({ "questions": items }).to_string())
}

pub fn config(base_url: &str, key: Option<&str>) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        openai_api_key: key.map(str::to_string),
        openai_base_url: base_url.to_string(),
        upstream_timeout_secs: 5,
        generation_timeout_secs: 30,
        ..Config::default()
    }
}

pub fn app(config: &Config) -> Router {
    routes::router(AppState::new(config).expect("app state"))
}

pub async fn post_json(app: &Router, path: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, value)
}
