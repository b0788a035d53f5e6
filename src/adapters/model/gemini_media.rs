//! Gemini media store - uploads audio/image payloads to the file API.
//!
//! The returned file URI is the opaque handle attached to generation
//! requests. File lifecycle beyond the single request is not managed here;
//! uploaded files expire provider-side.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{MediaError, MediaRef, MediaStore};

/// Media store backed by the Gemini file upload API.
pub struct GeminiMediaStore {
    api_key: Secret<String>,
    base_url: String,
    client: Client,
}

impl GeminiMediaStore {
    /// Creates a new media store with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            client,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.base_url)
    }
}

#[async_trait]
impl MediaStore for GeminiMediaStore {
    async fn upload(&self, data: &[u8], mime_type: &str) -> Result<MediaRef, MediaError> {
        let metadata = serde_json::json!({"file": {"display_name": "braindump-upload"}});

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| MediaError::rejected(e.to_string()))?,
            )
            .part(
                "file",
                Part::bytes(data.to_vec())
                    .mime_str(mime_type)
                    .map_err(|e| MediaError::rejected(format!("invalid mime type {}: {}", mime_type, e)))?,
            );

        let response = self
            .client
            .post(self.upload_url())
            .query(&[("uploadType", "multipart")])
            .header("x-goog-api-key", self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::rejected(format!(
                "upload failed with status {}: {}",
                status, body
            )));
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::network(format!("Failed to parse upload response: {}", e)))?;

        let mime = if payload.file.mime_type.is_empty() {
            mime_type.to_string()
        } else {
            payload.file.mime_type
        };

        Ok(MediaRef::new(payload.file.uri, mime))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    uri: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}
