//! AGMS API client
//!
//! One method per backend endpoint. Classification of failures happens here
//! (status codes only); deciding what a failure *means* is left to the services.

use std::sync::RwLock;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use crate::clients::endpoints;
use crate::error::Result;
use crate::infrastructure::{ApiRequest, ApiResponse, Backend, FilePart};
use crate::models::{FinalizedFlag, SubmissionFile, SubordinateStatus};

/// `POST /api/auth/login` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct AgmsClient<B> {
    backend: B,
    token: RwLock<Option<String>>,
}

impl<B: Backend> AgmsClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            token: RwLock::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Bearer token attached to every later request
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.token.read().ok().and_then(|t| t.clone());
        let request = request.bearer(token.as_deref());
        let endpoint = request.endpoint();
        let response = self.backend.send(request).await?;
        debug!("{} -> {}", endpoint, response.status);
        response.error_for_status(&endpoint)
    }

    async fn call_json<T: serde::de::DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let endpoint = request.endpoint();
        self.call(request).await?.decode(&endpoint)
    }

    // ========== auth ==========

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = ApiRequest::post(endpoints::LOGIN).json(json!({
            "email": email,
            "password": password,
        }));
        // no stale bearer on login
        let endpoint = request.endpoint();
        self.backend
            .send(request)
            .await?
            .error_for_status(&endpoint)?
            .decode(&endpoint)
    }

    pub async fn logout(&self) -> Result<()> {
        self.call(ApiRequest::post(endpoints::LOGOUT)).await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        let resp = self
            .call(ApiRequest::post(endpoints::PASSWORD_RESET).json(json!({ "email": email })))
            .await?;
        Ok(resp.text_message())
    }

    // ========== profiles ==========

    pub async fn user_profile(&self) -> Result<Map<String, JsonValue>> {
        self.call_json(ApiRequest::get(endpoints::USER_PROFILE)).await
    }

    pub async fn student_profile(&self) -> Result<Map<String, JsonValue>> {
        self.call_json(ApiRequest::get(endpoints::STUDENT_PROFILE)).await
    }

    /// Student detail record; used to backfill GPA
    pub async fn student(&self, student_number: &str, timeout: Duration) -> Result<JsonValue> {
        self.call_json(ApiRequest::get(endpoints::student(student_number)).timeout(timeout))
            .await
    }

    /// Registrar (UBYS) transcript record
    pub async fn student_record(&self, student_number: &str) -> Result<JsonValue> {
        self.call_json(ApiRequest::get(endpoints::student_record(student_number)))
            .await
    }

    // ========== submissions ==========

    /// Collection endpoint; accepts a bare array or `{ "data": [...] }`
    pub async fn submissions(&self, path: &str) -> Result<Vec<JsonValue>> {
        let value: JsonValue = self.call_json(ApiRequest::get(path)).await?;
        Ok(match value {
            JsonValue::Array(items) => items,
            JsonValue::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("content")) {
                Some(JsonValue::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        })
    }

    /// Single-object endpoint such as a student's latest submission
    pub async fn submission(&self, path: &str) -> Result<Option<JsonValue>> {
        let value: JsonValue = self.call_json(ApiRequest::get(path)).await?;
        Ok((!value.is_null()).then_some(value))
    }

    pub async fn subordinate_status(&self) -> Result<Vec<SubordinateStatus>> {
        let value: Option<Vec<SubordinateStatus>> = self
            .call_json(ApiRequest::get(endpoints::SUBORDINATE_STATUS))
            .await?;
        Ok(value.unwrap_or_default())
    }

    pub async fn approve(&self, submission_id: i64) -> Result<()> {
        self.call(ApiRequest::put(endpoints::approve(submission_id)))
            .await?;
        Ok(())
    }

    pub async fn reject(&self, submission_id: i64, reason: &str) -> Result<()> {
        self.call(
            ApiRequest::put(endpoints::reject(submission_id)).query("rejectionReason", reason),
        )
        .await?;
        Ok(())
    }

    /// Any 2xx confirms the finalization; the body only supplies a message
    pub async fn finalize(&self, path: &str) -> Result<Option<String>> {
        let resp = self.call(ApiRequest::post(path)).await?;
        Ok(resp.text_message())
    }

    pub async fn finalize_advisor(&self, advisor_id: i64) -> Result<()> {
        self.call(ApiRequest::post(endpoints::finalize_advisor(advisor_id)))
            .await?;
        Ok(())
    }

    pub async fn list_finalized(&self) -> Result<FinalizedFlag> {
        let flag: Option<FinalizedFlag> = self
            .call_json(ApiRequest::get(endpoints::MY_LIST_FINALIZED))
            .await?;
        Ok(flag.unwrap_or_default())
    }

    // ========== files ==========

    pub async fn list_files(&self, submission_id: i64) -> Result<Vec<SubmissionFile>> {
        let files: Option<Vec<SubmissionFile>> = self
            .call_json(ApiRequest::get(endpoints::submission_files(submission_id)))
            .await?;
        Ok(files.unwrap_or_default())
    }

    pub async fn upload_file(&self, submission_id: i64, part: FilePart) -> Result<SubmissionFile> {
        self.call_json(ApiRequest::post(endpoints::upload_file(submission_id)).file(part))
            .await
    }

    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        Ok(self
            .call(ApiRequest::get(endpoints::download_file(file_id)))
            .await?
            .body)
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.call(ApiRequest::delete(endpoints::delete_file(file_id)))
            .await?;
        Ok(())
    }
}
