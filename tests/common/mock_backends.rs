/*!
 * Local HTTP stand-ins for the generation backends
 *
 * Each `MockBackend` is an axum server bound to an ephemeral port that
 * replays scripted responses in order (the last one repeats) and records
 * every request it receives, so provider clients can be exercised against
 * real HTTP without external API calls.
 */

use std::collections::VecDeque;
use std::sync::Arc;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A request seen by the mock backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    /// Body parsed as JSON (`Value::Null` when it is not JSON)
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }
}

#[derive(Default)]
struct BackendState {
    script: VecDeque<(StatusCode, String)>,
    last: Option<(StatusCode, String)>,
    requests: Vec<RecordedRequest>,
}

/// Scripted HTTP backend
pub struct MockBackend {
    pub base_url: String,
    state: Arc<Mutex<BackendState>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    /// Start a backend replaying `responses` in order
    pub async fn start(responses: Vec<(StatusCode, String)>) -> Self {
        let state = Arc::new(Mutex::new(BackendState {
            script: responses.into(),
            ..Default::default()
        }));

        let app = Router::new()
            .fallback(handle)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
        });

        Self { base_url, state, shutdown: Some(tx) }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    pub fn hit_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Arc<Mutex<BackendState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let mut state = state.lock();
    state.requests.push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });

    if let Some(next) = state.script.pop_front() {
        state.last = Some(next.clone());
        next
    } else {
        state.last.clone().unwrap_or((StatusCode::NOT_FOUND, String::new()))
    }
}

/// Ollama `/api/generate` body answering with `text`
pub fn ollama_body(text: &str) -> String {
    json!({
        "model": "llama3.1",
        "created_at": "2024-01-01T00:00:00Z",
        "response": text,
        "done": true
    }).to_string()
}

/// OpenAI chat completion body answering with `text`
pub fn openai_body(text: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    }).to_string()
}

/// Anthropic messages body answering with `text`
pub fn anthropic_body(text: &str) -> String {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }).to_string()
}

pub fn ok(body: String) -> (StatusCode, String) {
    (StatusCode::OK, body)
}
