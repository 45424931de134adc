//! Mock backend for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizforge_core::error::ProviderError;
use quizforge_core::traits::{ChatBackend, ChatRequest, ChatResponse};

/// A chat backend that replays fixed completion choices without network access.
pub struct MockBackend {
    /// Choices returned for every call.
    choices: Vec<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockBackend {
    /// Create a mock that returns the given choices, in order.
    pub fn new(choices: Vec<String>) -> Self {
        Self {
            choices,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always answers with a single choice.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock whose replies carry no choices at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Get the number of calls made to this backend.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this backend.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        Ok(ChatResponse {
            choices: self.choices.clone(),
            model: request.model.clone(),
        })
    }
}
