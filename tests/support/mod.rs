#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use narrator::outputs::text::TextBlock;
use narrator::{NarratorConfig, Reactor};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// What the mock completion endpoint answers with.
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Raw(StatusCode, String),
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    received: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockEndpoint {
    pub url: String,
    received: Arc<Mutex<Vec<Recorded>>>,
}

impl MockEndpoint {
    pub fn received(&self) -> Vec<Recorded> {
        self.received.lock().unwrap().clone()
    }
}

async fn completions(State(state): State<MockState>, headers: HeaderMap, body: String) -> (StatusCode, String) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_str(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push(Recorded { content_type, body });

    match state.reply {
        Reply::Json(value) => (StatusCode::OK, value.to_string()),
        Reply::Raw(status, text) => (status, text),
    }
}

/// Local completion endpoint on an ephemeral port.
pub async fn spawn_endpoint(reply: Reply) -> MockEndpoint {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/completions", post(completions))
        .with_state(MockState { reply, received: received.clone() });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock endpoint");
    let addr = listener.local_addr().expect("mock endpoint address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock endpoint crashed");
    });

    MockEndpoint {
        url: format!("http://{addr}/v1/completions"),
        received,
    }
}

/// URL on which nothing is listening (connection refused).
pub async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{addr}/v1/completions")
}

pub fn reactor_for(url: &str, sink: &TextBlock) -> Reactor {
    let config = NarratorConfig {
        endpoint: url.to_string(),
        ..NarratorConfig::default()
    };
    Reactor::new(&config, Box::new(sink.clone())).expect("client should build")
}

pub fn choices(text: &str) -> Value {
    serde_json::json!({ "choices": [{ "text": text, "index": 0 }] })
}
