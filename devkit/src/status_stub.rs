/*!
Scripted status endpoint for development without the rental backend

Serves `GET /api/get_computers_status` on an ephemeral local port from a
queue of canned responses. Once the queue is empty, the last response keeps
being served (a steady hall).
*/

use crate::snapshot_helpers::SnapshotBuilder;
use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const STATUS_PATH: &str = "/api/get_computers_status";

#[derive(Debug, Clone)]
pub enum StubResponse {
    /// 200 with a JSON body
    Snapshot(Value),
    /// Bare HTTP error status
    Error(u16),
    /// 200 with an arbitrary body (malformed payloads)
    Raw(String),
    /// Answer after a delay, to overlap polls
    Delayed(Duration, Box<StubResponse>),
}

#[derive(Default)]
struct Script {
    queue: VecDeque<StubResponse>,
    last: Option<StubResponse>,
    requests: usize,
}

impl Script {
    fn next(&mut self) -> Option<StubResponse> {
        self.requests += 1;
        if let Some(response) = self.queue.pop_front() {
            self.last = Some(response);
        }
        self.last.clone()
    }
}

/// Stub server; stopped when dropped
pub struct StatusStub {
    addr: SocketAddr,
    script: Arc<Mutex<Script>>,
    server: JoinHandle<()>,
}

impl StatusStub {
    pub async fn start() -> Result<Self> {
        let script = Arc::new(Mutex::new(Script::default()));
        let app = Router::new()
            .route(STATUS_PATH, get(serve_status))
            .with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("status stub stopped: {}", e);
            }
        });

        log::info!("🧪 [STUB] status endpoint on http://{}{}", addr, STATUS_PATH);
        Ok(Self { addr, script, server })
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, STATUS_PATH)
    }

    pub fn push(&self, response: StubResponse) -> &Self {
        self.script.lock().queue.push_back(response);
        self
    }

    pub fn push_snapshot(&self, snapshot: &SnapshotBuilder) -> &Self {
        self.push(StubResponse::Snapshot(snapshot.to_json()))
    }

    pub fn push_error(&self, status: u16) -> &Self {
        self.push(StubResponse::Error(status))
    }

    pub fn push_raw(&self, body: &str) -> &Self {
        self.push(StubResponse::Raw(body.to_string()))
    }

    pub fn push_delayed(&self, delay: Duration, response: StubResponse) -> &Self {
        self.push(StubResponse::Delayed(delay, Box::new(response)))
    }

    /// Requests served so far
    pub fn request_count(&self) -> usize {
        self.script.lock().requests
    }

    /// Scripted responses not served yet
    pub fn pending(&self) -> usize {
        self.script.lock().queue.len()
    }
}

impl Drop for StatusStub {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve_status(State(script): State<Arc<Mutex<Script>>>) -> Response {
    let next = script.lock().next();
    let Some(mut response) = next else {
        return (StatusCode::SERVICE_UNAVAILABLE, "no scripted response").into_response();
    };

    loop {
        match response {
            StubResponse::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                response = *inner;
            }
            StubResponse::Snapshot(body) => return Json(body).into_response(),
            StubResponse::Error(code) => {
                return StatusCode::from_u16(code)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                    .into_response()
            }
            StubResponse::Raw(body) => {
                return ([(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
        }
    }
}
