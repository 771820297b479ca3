//! Backend seam
//!
//! Everything above this layer talks to the AGMS REST service through the
//! `Backend` trait. `HttpExecutor` is the real implementation; tests plug in a fake.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{ApiError, AuthError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// Multipart file part
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub json: Option<JsonValue>,
    pub file: Option<FilePart>,
    pub bearer: Option<String>,
    /// Overrides the executor's default deadline
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            json: None,
            file: None,
            bearer: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: JsonValue) -> Self {
        self.json = Some(body);
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.file = Some(part);
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `METHOD path` for logs and error messages
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &JsonValue) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Classify by status code only: 401, 404, other non-2xx
    pub fn error_for_status(self, endpoint: &str) -> Result<Self> {
        match self.status {
            s if (200..300).contains(&s) => Ok(self),
            401 => Err(AuthError::Unauthorized {
                endpoint: endpoint.to_string(),
            }
            .into()),
            404 => Err(ApiError::NotFound {
                endpoint: endpoint.to_string(),
            }
            .into()),
            status => Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                status,
                message: self.message(),
            }
            .into()),
        }
    }

    /// `message` (or `error`) field of a JSON body, if any
    pub fn message(&self) -> Option<String> {
        let value: JsonValue = serde_json::from_slice(&self.body).ok()?;
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    }

    /// Best-effort message of a success body: JSON `message`/`error`, a JSON
    /// string, or the raw text. Never fails.
    pub fn text_message(&self) -> Option<String> {
        let text = match serde_json::from_slice::<JsonValue>(&self.body) {
            Ok(JsonValue::String(text)) => text,
            Ok(_) => return self.message(),
            Err(_) => String::from_utf8_lossy(&self.body).into_owned(),
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Empty body decodes as JSON `null`
    pub fn decode<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| crate::AppError::json_parse_failed(endpoint, e))
    }
}

/// Sends one request to the AGMS backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Transport failures are errors; every HTTP status is a response
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}
