//! Mock model adapters for testing.
//!
//! Configurable implementations of the `ModelProvider` and `MediaStore`
//! ports, allowing tests to run without calling the real provider.
//!
//! # Features
//!
//! - Pre-configured replies, consumed in order
//! - Error injection for resilience testing
//! - Call tracking for verification

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    GenerationRequest, MediaError, MediaRef, MediaStore, ModelError, ModelInfo, ModelProvider,
};

/// Mock model tier for testing.
///
/// Replies are consumed in configuration order; once the queue is empty a
/// default reply is returned.
#[derive(Debug, Clone)]
pub struct MockModelProvider {
    replies: Arc<Mutex<VecDeque<Result<String, ModelError>>>>,
    info: ModelInfo,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockModelProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModelProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            info: ModelInfo::new("mock", "mock-model-1"),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful reply to the queue.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Adds an error to the queue.
    pub fn with_error(self, error: ModelError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.info.model = model.into();
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, ModelError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Mock reply".to_string()))
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(request);
        self.next_reply()
    }

    fn model_info(&self) -> ModelInfo {
        self.info.clone()
    }
}

/// Mock media store for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMediaStore {
    uploads: Arc<Mutex<Vec<(usize, String)>>>,
    error: Arc<Mutex<Option<MediaError>>>,
}

impl MockMediaStore {
    /// Creates a store that accepts every upload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that fails every upload with `error`.
    pub fn failing(error: MediaError) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }

    /// Returns the number of successful uploads.
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Returns recorded uploads as (payload length, mime type) pairs.
    pub fn get_uploads(&self) -> Vec<(usize, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, data: &[u8], mime_type: &str) -> Result<MediaRef, MediaError> {
        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((data.len(), mime_type.to_string()));
        Ok(MediaRef::new(
            format!("mock://files/{}", uploads.len()),
            mime_type,
        ))
    }
}
