//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! so the enrichment pipeline can be exercised without calling a provider. It
//! returns a canned text reply (or a provider error) and counts the calls it
//! receives.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Failure(String),
}

/// A mock completion model for testing purposes.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    reply: Arc<Mutex<Option<Reply>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCompletionModel {
    /// Creates a mock that replies with an empty text until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` on every call.
    pub async fn set_text_response(&self, text: &str) {
        *self.reply.lock().await = Some(Reply::Text(text.to_string()));
    }

    /// Fail every call with a provider error carrying `message`.
    pub async fn set_failure(&self, message: &str) {
        *self.reply.lock().await = Some(Reply::Failure(message.to_string()));
    }

    /// Number of completion requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self.reply.lock().await.clone();
        let text = match reply {
            Some(Reply::Failure(message)) => return Err(CompletionError::ProviderError(message)),
            Some(Reply::Text(text)) => text,
            None => String::new(),
        };

        Ok(CompletionResponse {
            choice: OneOrMany::one(AssistantContent::text(&text)),
            raw_response: text,
        })
    }
}
