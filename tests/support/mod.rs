//! Scripted in-process backend for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use agms_client::error::{ApiError, Result};
use agms_client::infrastructure::{ApiRequest, ApiResponse, Backend, Method};
use agms_client::models::session::encode_unsigned;
use agms_client::AppError;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    ConnectionRefused,
    Timeout,
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

/// Routes are keyed by `METHOD path` (query excluded). Unknown routes answer 404.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<ApiRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(self, method: Method, path: &str, reply: Reply, delay: Option<Duration>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), Route { reply, delay });
        self
    }

    pub fn json(self, method: Method, path: &str, status: u16, body: JsonValue) -> Self {
        self.route(method, path, Reply::Respond(ApiResponse::json(status, &body)), None)
    }

    pub fn status(self, method: Method, path: &str, status: u16) -> Self {
        self.route(method, path, Reply::Respond(ApiResponse::new(status, "")), None)
    }

    pub fn bytes(self, method: Method, path: &str, body: &[u8]) -> Self {
        self.route(method, path, Reply::Respond(ApiResponse::new(200, body.to_vec())), None)
    }

    pub fn slow_json(self, method: Method, path: &str, delay: Duration, body: JsonValue) -> Self {
        self.route(method, path, Reply::Respond(ApiResponse::json(200, &body)), Some(delay))
    }

    pub fn unreachable(self, method: Method, path: &str) -> Self {
        self.route(method, path, Reply::ConnectionRefused, None)
    }

    pub fn timing_out(self, method: Method, path: &str) -> Self {
        self.route(method, path, Reply::Timeout, None)
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn count_prefix(&self, method: Method, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let endpoint = request.endpoint();
        let route = self.routes.lock().unwrap().get(&endpoint).cloned();
        self.calls.lock().unwrap().push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = route.as_ref().and_then(|r| r.delay) {
            tokio::time::sleep(delay).await;
        }
        // yield so concurrent callers overlap even without a delay
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match route.map(|r| r.reply) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::ConnectionRefused) => Err(AppError::request_failed(
                endpoint,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            Some(Reply::Timeout) => Err(ApiError::Timeout { endpoint }.into()),
            None => Ok(ApiResponse::new(404, "")),
        }
    }
}

/// Unsigned token for `role`, expiring far in the future
pub fn token_for(role: &str, user_id: i64) -> String {
    encode_unsigned(&json!({
        "sub": format!("user{user_id}@std.iyte.edu.tr"),
        "role": role,
        "exp": 4_102_444_800i64,
        "userId": user_id,
    }))
}

pub fn submission_json(id: i64, student_number: &str, status: &str) -> JsonValue {
    json!({
        "id": id,
        "studentNumber": student_number,
        "studentName": format!("Student {id}"),
        "submissionDate": "2025-05-02T10:15:00",
        "content": "Graduation application",
        "status": status,
    })
}
