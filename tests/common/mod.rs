//! In-process stand-in for the log collector.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration, Instant};

#[derive(Debug, Clone)]
pub struct Received {
    pub content_type: Option<String>,
    pub body: Value,
}

struct Behaviour {
    status: StatusCode,
    delay: Duration,
    received: Mutex<Vec<Received>>,
}

/// Collector listening on an ephemeral local port. Every POST to `/` is
/// recorded on arrival, then answered with `status` after `delay`.
pub struct MockCollector {
    pub url: String,
    state: Arc<Behaviour>,
}

impl MockCollector {
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, Duration::ZERO).await
    }

    pub async fn start_with(status: StatusCode, delay: Duration) -> Self {
        let state = Arc::new(Behaviour {
            status,
            delay,
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/", post(collect))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock collector");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock collector");
        });

        MockCollector {
            url: format!("http://{}/", addr),
            state,
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.state.received.lock().unwrap().clone()
    }

    /// Poll until at least `n` requests arrived or `timeout` elapsed.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> Vec<Received> {
        let deadline = Instant::now() + timeout;
        loop {
            let received = self.received();
            if received.len() >= n || Instant::now() >= deadline {
                return received;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn collect(State(state): State<Arc<Behaviour>>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push(Received { content_type, body });

    if !state.delay.is_zero() {
        sleep(state.delay).await;
    }
    state.status
}
