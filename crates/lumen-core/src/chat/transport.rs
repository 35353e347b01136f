//! HTTP execution with a bounded retry loop.
//!
//! The transport owns the request/response cycle: it POSTs the assembled
//! body, classifies the outcome, and retries immediately (no backoff, no
//! jitter) until the attempt cap is reached. HTTP-level errors, connection
//! failures, and malformed response bodies all fold into the same retry
//! path; only the last failure is surfaced when attempts run out.
//!
//! The actual socket work sits behind [`HttpSend`] so tests can substitute
//! a scripted sender, and per-attempt observability goes through an
//! injectable [`AttemptObserver`] instead of a fixed logger.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::chat::request::BuiltRequest;
use crate::error::{CallError, CallResult};

/// Total attempts per call, matching the original adapters.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One HTTP round trip, reduced to what the retry loop needs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

/// A single POST round trip.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn HttpSend>` for dynamic dispatch).
#[async_trait]
pub trait HttpSend: Send + Sync {
    /// Execute the request once. Connection failures, timeouts, and body
    /// read errors map to [`CallError::Transport`]; a response with any
    /// status code is `Ok`.
    async fn send(&self, request: &BuiltRequest) -> CallResult<HttpResponse>;
}

/// Production sender backed by a shared `reqwest` client.
pub struct ReqwestSender {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestSender {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for ReqwestSender {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: &BuiltRequest) -> CallResult<HttpResponse> {
        let mut builder = self
            .client
            .post(&request.url)
            .timeout(self.timeout)
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await.map_err(|e| CallError::Transport {
            message: format!("request failed: {e}"),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| CallError::Transport {
            message: format!("reading response body: {e}"),
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            body,
        })
    }
}

/// Per-attempt observability sink.
///
/// Call-site context (provider name, attempt number) arrives as structured
/// arguments; implementations decide where it goes.
pub trait AttemptObserver: Send + Sync {
    fn attempt_started(&self, provider: &str, attempt: u32, max_attempts: u32, payload_bytes: usize);
    fn response_received(&self, provider: &str, status: u16, body: &str);
    fn attempt_failed(&self, provider: &str, attempt: u32, error: &CallError);
    fn call_succeeded(&self, provider: &str, content_len: usize);
}

/// Default observer forwarding to `tracing`.
///
/// Milestones log at info, payload contents at debug.
pub struct TracingObserver;

impl AttemptObserver for TracingObserver {
    fn attempt_started(
        &self,
        provider: &str,
        attempt: u32,
        max_attempts: u32,
        payload_bytes: usize,
    ) {
        tracing::info!(provider, attempt, max_attempts, "sending completion request");
        tracing::debug!(provider, payload_bytes, "request payload assembled");
    }

    fn response_received(&self, provider: &str, status: u16, body: &str) {
        tracing::info!(provider, status, "response received");
        tracing::debug!(provider, body, "raw response");
    }

    fn attempt_failed(&self, provider: &str, attempt: u32, error: &CallError) {
        tracing::warn!(provider, attempt, error = %error, "attempt failed");
    }

    fn call_succeeded(&self, provider: &str, content_len: usize) {
        tracing::info!(provider, content_len, "completion received");
    }
}

// --- Response wire types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pull the assistant text out of a chat-completions response body.
///
/// Any deviation — malformed JSON, empty `choices`, missing content — is a
/// transport-level failure and feeds the retry loop like a network error.
fn extract_content(body: &str) -> CallResult<String> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| CallError::Transport {
        message: format!("failed to parse response: {e}"),
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CallError::Transport {
            message: "response contained no choices".to_string(),
        })
}

/// Executes built requests with bounded, immediate retries.
pub struct ChatTransport {
    sender: Box<dyn HttpSend>,
    observer: Box<dyn AttemptObserver>,
    max_attempts: u32,
}

impl ChatTransport {
    /// Production transport: reqwest sender, tracing observer, 3 attempts.
    pub fn new(timeout: Duration) -> Self {
        Self::with_sender(Box::new(ReqwestSender::new(timeout)))
    }

    pub fn with_sender(sender: Box<dyn HttpSend>) -> Self {
        Self {
            sender,
            observer: Box::new(TracingObserver),
            max_attempts: DEFAULT_ATTEMPTS,
        }
    }

    pub fn observer(mut self, observer: Box<dyn AttemptObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Execute the request, retrying up to the attempt cap.
    ///
    /// Returns the extracted assistant text on the first successful,
    /// parseable response; otherwise the last observed failure.
    pub async fn execute(&self, provider: &str, request: &BuiltRequest) -> CallResult<String> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            self.observer
                .attempt_started(provider, attempt, self.max_attempts, request.body.len());

            let failure = match self.sender.send(request).await {
                Ok(response) => {
                    self.observer
                        .response_received(provider, response.status, &response.body);
                    if (200..300).contains(&response.status) {
                        match extract_content(&response.body) {
                            Ok(text) => {
                                self.observer.call_succeeded(provider, text.len());
                                return Ok(text);
                            }
                            Err(e) => e,
                        }
                    } else {
                        CallError::HttpStatus {
                            status: response.status,
                            reason: response.reason,
                        }
                    }
                }
                Err(e) => e,
            };

            self.observer.attempt_failed(provider, attempt, &failure);
            last_error = Some(failure);
        }

        Err(last_error.unwrap_or(CallError::ExhaustedRetries))
    }
}

impl Default for ChatTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Scripted sender: each call invokes the response factory with the
    /// current call index, so tests can vary outcomes per attempt.
    struct MockSender {
        response_fn: Box<dyn Fn(u32) -> CallResult<HttpResponse> + Send + Sync>,
        calls: Arc<AtomicU32>,
    }

    impl MockSender {
        fn new<F>(response_fn: F) -> Self
        where
            F: Fn(u32) -> CallResult<HttpResponse> + Send + Sync + 'static,
        {
            Self {
                response_fn: Box::new(response_fn),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn calls_handle(&self) -> Arc<AtomicU32> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl HttpSend for MockSender {
        async fn send(&self, _request: &BuiltRequest) -> CallResult<HttpResponse> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response_fn)(idx)
        }
    }

    fn ok_response(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            body: body.to_string(),
        }
    }

    fn error_response(status: u16, reason: &str) -> HttpResponse {
        HttpResponse {
            status,
            reason: reason.to_string(),
            body: String::new(),
        }
    }

    fn dummy_request() -> BuiltRequest {
        BuiltRequest {
            url: "http://localhost:11434/v1/chat/completions".to_string(),
            headers: vec![("Content-Type", "application/json".to_string())],
            body: b"{}".to_vec(),
        }
    }

    const WELL_FORMED: &str = r#"{"choices":[{"message":{"content":"4"}}]}"#;

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let sender = MockSender::new(|_| Ok(ok_response(WELL_FORMED)));
        let calls = sender.calls_handle();
        let transport = ChatTransport::with_sender(Box::new(sender));

        let text = transport.execute("ollama", &dummy_request()).await.unwrap();
        assert_eq!(text, "4");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_persistent_500_attempts_exactly_three_times() {
        let sender = MockSender::new(|_| Ok(error_response(500, "Internal Server Error")));
        let calls = sender.calls_handle();
        let transport = ChatTransport::with_sender(Box::new(sender));

        let err = transport
            .execute("openrouter", &dummy_request())
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, CallError::HttpStatus { status: 500, .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let sender = MockSender::new(|idx| {
            if idx == 0 {
                Ok(error_response(503, "Service Unavailable"))
            } else {
                Ok(ok_response(WELL_FORMED))
            }
        });
        let calls = sender.calls_handle();
        let transport = ChatTransport::with_sender(Box::new(sender));

        let text = transport.execute("ollama", &dummy_request()).await.unwrap();
        assert_eq!(text, "4");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_connection_failure_retried() {
        let sender = MockSender::new(|_| {
            Err(CallError::Transport {
                message: "connection refused".to_string(),
            })
        });
        let calls = sender.calls_handle();
        let transport = ChatTransport::with_sender(Box::new(sender));

        let err = transport.execute("ollama", &dummy_request()).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_body_folds_into_retry_path() {
        let sender = MockSender::new(|_| Ok(ok_response("not json at all")));
        let calls = sender.calls_handle();
        let transport = ChatTransport::with_sender(Box::new(sender));

        let err = transport.execute("ollama", &dummy_request()).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("failed to parse response"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_a_parse_failure() {
        let sender = MockSender::new(|_| Ok(ok_response(r#"{"choices":[]}"#)));
        let transport = ChatTransport::with_sender(Box::new(sender));

        let err = transport.execute("ollama", &dummy_request()).await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_null_content_is_a_parse_failure() {
        let sender =
            MockSender::new(|_| Ok(ok_response(r#"{"choices":[{"message":{"content":null}}]}"#)));
        let transport = ChatTransport::with_sender(Box::new(sender));

        let err = transport.execute("ollama", &dummy_request()).await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_empty_content_string_is_success() {
        let sender =
            MockSender::new(|_| Ok(ok_response(r#"{"choices":[{"message":{"content":""}}]}"#)));
        let transport = ChatTransport::with_sender(Box::new(sender));

        let text = transport.execute("ollama", &dummy_request()).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_last_failure_wins_on_exhaustion() {
        let sender = MockSender::new(|idx| match idx {
            0 => Ok(error_response(500, "Internal Server Error")),
            1 => Ok(error_response(502, "Bad Gateway")),
            _ => Ok(error_response(503, "Service Unavailable")),
        });
        let transport = ChatTransport::with_sender(Box::new(sender));

        let err = transport.execute("ollama", &dummy_request()).await.unwrap_err();
        assert!(matches!(err, CallError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_attempt_cap_is_injectable() {
        let sender = MockSender::new(|_| Ok(error_response(500, "Internal Server Error")));
        let calls = sender.calls_handle();
        let transport = ChatTransport::with_sender(Box::new(sender)).max_attempts(1);

        let _ = transport.execute("ollama", &dummy_request()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_each_attempt() {
        struct CountingObserver {
            attempts: Arc<AtomicU32>,
            failures: Arc<AtomicU32>,
        }
        impl AttemptObserver for CountingObserver {
            fn attempt_started(&self, _: &str, attempt: u32, _: u32, _: usize) {
                self.attempts.fetch_max(attempt, Ordering::SeqCst);
            }
            fn response_received(&self, _: &str, _: u16, _: &str) {}
            fn attempt_failed(&self, _: &str, _: u32, _: &CallError) {
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
            fn call_succeeded(&self, _: &str, _: usize) {}
        }

        let attempts = Arc::new(AtomicU32::new(0));
        let failures = Arc::new(AtomicU32::new(0));
        let sender = MockSender::new(|_| Ok(error_response(500, "Internal Server Error")));
        let transport =
            ChatTransport::with_sender(Box::new(sender)).observer(Box::new(CountingObserver {
                attempts: attempts.clone(),
                failures: failures.clone(),
            }));

        let _ = transport.execute("ollama", &dummy_request()).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(failures.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_extract_content_well_formed() {
        assert_eq!(extract_content(WELL_FORMED).unwrap(), "4");
    }

    #[test]
    fn test_extract_content_missing_message_key() {
        let err = extract_content(r#"{"choices":[{"text":"4"}]}"#).unwrap_err();
        assert!(err.to_string().contains("failed to parse response"));
    }
}
