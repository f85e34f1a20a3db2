use crate::config::{Config, FieldMapping, RetryPolicy, ThingSpeakSettings};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub fn test_settings(base_url: Url) -> ThingSpeakSettings {
    ThingSpeakSettings {
        base_url,
        channel_id: "424242".to_string(),
        read_api_key: "TESTKEY".to_string(),
        results: 10,
        retry: RetryPolicy::none(),
    }
}

pub fn test_config(base_url: Url) -> Config {
    Config {
        thingspeak: test_settings(base_url),
        fields: FieldMapping::default(),
        refresh_interval: Duration::from_secs(10),
    }
}

pub fn test_state(base_url: Url) -> AppState {
    AppState::new(&test_config(base_url), reqwest::Client::new()).expect("test state")
}

/// Nothing listens on port 1, so connecting fails immediately.
pub fn unreachable_base_url() -> Url {
    Url::parse("http://127.0.0.1:1").expect("static url")
}

#[derive(Clone)]
pub enum UpstreamReply {
    Json(JsonValue),
    Status(u16),
}

impl UpstreamReply {
    pub fn json(body: JsonValue) -> Self {
        Self::Json(body)
    }

    pub fn status(code: u16) -> Self {
        Self::Status(code)
    }
}

#[derive(Default)]
struct StubState {
    replies: Vec<UpstreamReply>,
    requests: Vec<String>,
}

/// In-process stand-in for the ThingSpeak API. Replies are served in order;
/// the last one repeats once the list runs out.
pub struct StubUpstream {
    base_url: Url,
    state: Arc<Mutex<StubState>>,
}

impl StubUpstream {
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().expect("stub lock").requests.clone()
    }
}

async fn stub_handler(State(state): State<Arc<Mutex<StubState>>>, req: Request) -> Response {
    let reply = {
        let mut guard = state.lock().expect("stub lock");
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default();
        guard.requests.push(path);
        if guard.replies.len() > 1 {
            guard.replies.remove(0)
        } else {
            guard
                .replies
                .first()
                .cloned()
                .unwrap_or(UpstreamReply::Status(404))
        }
    };

    match reply {
        UpstreamReply::Json(body) => Json(body).into_response(),
        UpstreamReply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}

pub async fn spawn_upstream(replies: Vec<UpstreamReply>) -> StubUpstream {
    let state = Arc::new(Mutex::new(StubState {
        replies,
        requests: Vec::new(),
    }));
    let app = Router::new()
        .fallback(stub_handler)
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub upstream");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    StubUpstream {
        base_url: Url::parse(&format!("http://{addr}")).expect("stub url"),
        state,
    }
}
