#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct FakeState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    status: Arc<AtomicU16>,
    device_list_hits: Arc<AtomicUsize>,
    devices: Arc<Mutex<Value>>,
    block_list: Arc<Mutex<Value>>,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

/// In-process stand-in for the device-management server.
pub struct FakeServer {
    pub base_url: String,
    state: FakeState,
}

impl FakeServer {
    pub async fn spawn() -> Self {
        let state = FakeState::default();
        state.status.store(200, Ordering::SeqCst);
        *state.devices.lock().unwrap() = json!([
            {"IP": "192.168.1.42", "Name": "tablet", "ActiveUntil": "0001-01-01T00:00:00Z"},
            {"IP": "10.0.0.5", "Name": "console", "ActiveUntil": "0001-01-01T00:00:00Z"}
        ]);
        *state.block_list.lock().unwrap() = json!({
            "blocked": ["10.0.0.5"],
            "goodUntil": "0001-01-01T00:00:00Z"
        });

        let app = Router::new()
            .route("/modifyActiveUntil", post(record))
            .route("/block", post(record))
            .route("/unblock", post(record))
            .route("/addDevice", post(record))
            .route("/deviceList", get(device_list))
            .route("/blockList", get(block_list))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn respond_with(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    pub fn set_devices(&self, devices: Value) {
        *self.state.devices.lock().unwrap() = devices;
    }

    /// `null` makes `/blockList` answer 500, like a failed lookup on the server.
    pub fn set_block_list(&self, block_list: Value) {
        *self.state.block_list.lock().unwrap() = block_list;
    }

    /// Holds the next update response until the returned sender fires.
    pub fn hold_next_response(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.state.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn device_list_hits(&self) -> usize {
        self.state.device_list_hits.load(Ordering::SeqCst)
    }

    pub async fn wait_for_requests(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while self.requests().len() < count {
            if Instant::now() > deadline {
                panic!("fake server never saw {count} request(s)");
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn record(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    state.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });

    let gate = state.gate.lock().unwrap().take();
    if let Some(gate) = gate {
        let _ = gate.await;
    }

    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap()
}

async fn device_list(State(state): State<FakeState>) -> Json<Value> {
    state.device_list_hits.fetch_add(1, Ordering::SeqCst);
    let devices = state.devices.lock().unwrap().clone();
    Json(devices)
}

async fn block_list(State(state): State<FakeState>) -> Result<Json<Value>, StatusCode> {
    let block_list = state.block_list.lock().unwrap().clone();
    if block_list.is_null() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(block_list))
}

/// A base url nothing listens on.
pub fn dead_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
