//! Submission attachments

use tracing::info;

use crate::clients::AgmsClient;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::infrastructure::{Backend, FilePart};
use crate::models::SubmissionFile;
use crate::services::validation::FieldError;

pub struct FileService {
    max_upload_bytes: usize,
}

impl FileService {
    pub fn new(config: &Config) -> Self {
        Self::with_limit(config.max_upload_bytes)
    }

    pub fn with_limit(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }

    pub async fn list<B: Backend>(
        &self,
        client: &AgmsClient<B>,
        submission_id: i64,
    ) -> Result<Vec<SubmissionFile>> {
        client.list_files(submission_id).await
    }

    /// Checked locally before anything is sent
    pub async fn upload<B: Backend>(
        &self,
        client: &AgmsClient<B>,
        submission_id: i64,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<SubmissionFile> {
        let mut errors = Vec::new();
        if file_name.trim().is_empty() {
            errors.push(FieldError::new("file", "File name is required"));
        }
        if bytes.is_empty() {
            errors.push(FieldError::new("file", "File is empty"));
        }
        if bytes.len() > self.max_upload_bytes {
            errors.push(FieldError::new(
                "file",
                format!("File exceeds the {} byte limit", self.max_upload_bytes),
            ));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let size = bytes.len();
        let part = FilePart {
            field: "file".to_string(),
            file_name: file_name.trim().to_string(),
            content_type: if content_type.is_empty() {
                "application/octet-stream".to_string()
            } else {
                content_type.to_string()
            },
            bytes,
        };
        let stored = client.upload_file(submission_id, part).await?;
        info!("uploaded {} ({} bytes) to submission {}", stored.file_name, size, submission_id);
        Ok(stored)
    }

    pub async fn download<B: Backend>(&self, client: &AgmsClient<B>, file_id: &str) -> Result<Vec<u8>> {
        client.download_file(file_id).await
    }

    pub async fn delete<B: Backend>(&self, client: &AgmsClient<B>, file_id: &str) -> Result<()> {
        client.delete_file(file_id).await?;
        info!("deleted file {}", file_id);
        Ok(())
    }
}
