#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use pulse_chat_lib::config::GatewayConfig;
use pulse_chat_lib::db::Database;
use pulse_chat_lib::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned answer for one endpoint.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn send(&self) -> (StatusCode, Json<Value>) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.status, Json(self.body.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: Option<String>,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct ReceivedChat {
    pub upload_id: String,
    pub body: Value,
}

pub struct FakeGateway {
    pub upload: Mutex<Reply>,
    pub chat: Mutex<Reply>,
    pub cleanup: Mutex<Reply>,
    pub upload_hits: AtomicUsize,
    pub chat_hits: AtomicUsize,
    pub cleanup_hits: AtomicUsize,
    pub parts: Mutex<Vec<ReceivedPart>>,
    pub chats: Mutex<Vec<ReceivedChat>>,
}

impl FakeGateway {
    pub fn upload_hits(&self) -> usize {
        self.upload_hits.load(Ordering::SeqCst)
    }

    pub fn chat_hits(&self) -> usize {
        self.chat_hits.load(Ordering::SeqCst)
    }

    pub fn cleanup_hits(&self) -> usize {
        self.cleanup_hits.load(Ordering::SeqCst)
    }

    pub fn set_upload(&self, reply: Reply) {
        *self.upload.lock().unwrap() = reply;
    }

    pub fn set_chat(&self, reply: Reply) {
        *self.chat.lock().unwrap() = reply;
    }

    pub fn set_cleanup(&self, reply: Reply) {
        *self.cleanup.lock().unwrap() = reply;
    }
}

async fn upload(
    State(fake): State<Arc<FakeGateway>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    fake.upload_hits.fetch_add(1, Ordering::SeqCst);
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        fake.parts.lock().unwrap().push(ReceivedPart {
            field: name,
            file_name,
            len,
        });
    }
    let reply = fake.upload.lock().unwrap().clone();
    reply.send().await
}

async fn chat(
    State(fake): State<Arc<FakeGateway>>,
    Path(upload_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.chat_hits.fetch_add(1, Ordering::SeqCst);
    fake.chats
        .lock()
        .unwrap()
        .push(ReceivedChat { upload_id, body });
    let reply = fake.chat.lock().unwrap().clone();
    reply.send().await
}

async fn cleanup(State(fake): State<Arc<FakeGateway>>) -> (StatusCode, Json<Value>) {
    fake.cleanup_hits.fetch_add(1, Ordering::SeqCst);
    let reply = fake.cleanup.lock().unwrap().clone();
    reply.send().await
}

/// Starts a fake gateway on an ephemeral port. Returns it with its base URL.
pub async fn spawn_gateway() -> (Arc<FakeGateway>, String) {
    let fake = Arc::new(FakeGateway {
        upload: Mutex::new(Reply::ok(json!({ "upload_id": "u1" }))),
        chat: Mutex::new(Reply::ok(json!({ "response": "ok" }))),
        cleanup: Mutex::new(Reply::ok(json!({ "status": "cleared" }))),
        upload_hits: AtomicUsize::new(0),
        chat_hits: AtomicUsize::new(0),
        cleanup_hits: AtomicUsize::new(0),
        parts: Mutex::new(Vec::new()),
        chats: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/webhook/upload", post(upload))
        .route("/webhook/chat/:upload_id", post(chat))
        .route("/api/cleanup", delete(cleanup))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://{}", addr))
}

pub fn app_state(base_url: &str) -> AppState {
    app_state_with(GatewayConfig::with_base_url(base_url))
}

pub fn app_state_with(config: GatewayConfig) -> AppState {
    AppState::new(Database::in_memory().unwrap(), config)
}

/// Writes `len` bytes to `dir/name` and returns the path.
pub fn spreadsheet(dir: &tempfile::TempDir, name: &str, len: usize) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, vec![0x50u8; len]).unwrap();
    path
}
