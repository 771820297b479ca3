//! HTTP executor - infrastructure layer
//!
//! Owns the connection pool and the backend origin, and only exposes "send a request".

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::infrastructure::backend::{ApiRequest, ApiResponse, Backend, Method};

/// reqwest-backed `Backend`
///
/// Knows nothing about submissions or roles; callers build the request.
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| crate::AppError::request_failed("client builder", e))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Backend for HttpExecutor {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let endpoint = request.endpoint();
        let url = self.url(&request.path);
        debug!("-> {} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }
        if let Some(file) = request.file {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|e| crate::AppError::request_failed(&endpoint, e))?;
            builder = builder.multipart(Form::new().part(file.field, part));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    endpoint: endpoint.clone(),
                }
                .into()
            } else {
                crate::AppError::request_failed(&endpoint, e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| crate::AppError::request_failed(&endpoint, e))?;
        debug!("<- {} {} ({} bytes)", status, endpoint, body.len());

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
