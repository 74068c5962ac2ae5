//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::*;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this completion text
    Content(String),
    /// Fail with a request error carrying this message
    Fail(String),
}

/// Mock backend for testing.
///
/// Replies come from a script queue first, then from the default response.
/// Every request is captured so tests can inspect the prompt that was sent.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    default_response: Mutex<String>,
    script: Mutex<VecDeque<MockReply>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
    call_count: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            default_response: Mutex::new("Mock response".to_string()),
            script: Mutex::new(VecDeque::new()),
            delay: None,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the default response content.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.set_response(content);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the default response.
    pub fn set_response(&self, content: impl Into<String>) {
        if let Ok(mut response) = self.default_response.lock() {
            *response = content.into();
        }
    }

    /// Queue a one-shot reply ahead of the default response.
    pub fn push_reply(&self, reply: MockReply) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    /// Toggle availability at runtime.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> MockReply {
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or_else(|| {
            MockReply::Content(
                self.default_response
                    .lock()
                    .map(|r| r.clone())
                    .unwrap_or_default(),
            )
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let prompt_tokens = (request.user_text().len() / 4) as u32;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        match self.next_reply() {
            MockReply::Content(content) => Ok(CompletionResponse {
                usage: Usage {
                    prompt_tokens,
                    completion_tokens: (content.len() / 4) as u32,
                },
                content,
                finish_reason: FinishReason::Stop,
            }),
            MockReply::Fail(message) => Err(LlmError::RequestFailed(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend() {
        let backend = MockBackend::new("test-model").with_response("Hello, world!");

        assert!(backend.is_available().await);
        assert_eq!(backend.call_count(), 0);

        let response = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello, world!");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.last_request().unwrap().user_text(), "Hi");
    }

    #[tokio::test]
    async fn test_mock_script_runs_before_default() {
        let backend = MockBackend::default().with_response("default");
        backend.push_reply(MockReply::Content("first".to_string()));
        backend.push_reply(MockReply::Fail("second fails".to_string()));

        let first = backend.complete(CompletionRequest::user("a")).await.unwrap();
        assert_eq!(first.content, "first");

        let second = backend.complete(CompletionRequest::user("b")).await;
        assert!(matches!(second, Err(LlmError::RequestFailed(_))));

        let third = backend.complete(CompletionRequest::user("c")).await.unwrap();
        assert_eq!(third.content, "default");
        assert_eq!(backend.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let backend = MockBackend::new("test-model").with_available(false);

        assert!(!backend.is_available().await);

        let result = backend.complete(CompletionRequest::user("Hi")).await;
        assert!(result.is_err());
    }
}
