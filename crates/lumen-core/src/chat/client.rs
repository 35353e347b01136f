//! The call boundary: one request in, one string out.
//!
//! `ChatClient` glues the builder and transport together. Internal callers
//! get a typed result; `complete_text` flattens everything to the single
//! string the host displays, so no fault ever crosses the boundary.

use crate::chat::request::{build, CallRequest};
use crate::chat::transport::ChatTransport;
use crate::error::CallResult;

/// Issues completion calls. Stateless between calls; safe to share.
pub struct ChatClient {
    transport: ChatTransport,
}

impl ChatClient {
    pub fn new(transport: ChatTransport) -> Self {
        Self { transport }
    }

    /// Execute one completion call with a typed outcome.
    ///
    /// Image conversion and credential problems surface immediately,
    /// before any network I/O; transport-level failures have already been
    /// retried up to the attempt cap by the time they land here.
    pub async fn complete(&self, request: &CallRequest) -> CallResult<String> {
        let provider = request.profile.provider.name();
        tracing::debug!(
            provider,
            model = %request.model,
            sampling = ?request.sampling,
            has_image = request.image.is_some(),
            "starting completion call"
        );

        let built = build(request)?;
        self.transport.execute(provider, &built).await
    }

    /// Execute one completion call, flattened to the host contract:
    /// the generated text on success, `"Error: "` plus a description on
    /// any failure.
    pub async fn complete_text(&self, request: &CallRequest) -> String {
        match self.complete(request).await {
            Ok(text) => text,
            Err(e) => format!("Error: {e}"),
        }
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new(ChatTransport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::profile::ProviderProfile;
    use crate::chat::request::{BuiltRequest, Sampling};
    use crate::chat::transport::{HttpResponse, HttpSend};
    use crate::error::{CallError, CallResult};
    use crate::imaging::ImageSource;
    use async_trait::async_trait;
    use ndarray::{Array, IxDyn};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Sender that records every request it sees and replays a fixed body.
    struct RecordingSender {
        response: CallResult<HttpResponse>,
        calls: Arc<AtomicU32>,
        seen: Arc<Mutex<Vec<BuiltRequest>>>,
    }

    impl RecordingSender {
        fn new(response: CallResult<HttpResponse>) -> Self {
            Self {
                response,
                calls: Arc::new(AtomicU32::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn replying(status: u16, reason: &str, body: &str) -> Self {
            Self::new(Ok(HttpResponse {
                status,
                reason: reason.to_string(),
                body: body.to_string(),
            }))
        }
    }

    #[async_trait]
    impl HttpSend for RecordingSender {
        async fn send(&self, request: &BuiltRequest) -> CallResult<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            match &self.response {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(CallError::Transport {
                    message: e.to_string(),
                }),
            }
        }
    }

    fn client_with(sender: RecordingSender) -> ChatClient {
        ChatClient::new(ChatTransport::with_sender(Box::new(sender)))
    }

    #[tokio::test]
    async fn test_local_server_end_to_end() {
        let sender =
            RecordingSender::replying(200, "OK", r#"{"choices":[{"message":{"content":"4"}}]}"#);
        let seen = sender.seen.clone();
        let client = client_with(sender);

        let request = CallRequest {
            profile: ProviderProfile::ollama_fixed(),
            endpoint: "localhost:11434".to_string(),
            api_key: None,
            model: "llama3".to_string(),
            system_prompt: "You are helpful.".to_string(),
            user_prompt: "2+2=?".to_string(),
            image: None,
            sampling: Sampling {
                temperature: Some(0.7),
                ..Sampling::default()
            },
        };

        let text = client.complete(&request).await.unwrap();
        assert_eq!(text, "4");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://localhost:11434/v1/chat/completions");
        let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(body["model"], "llama3");
        assert!(body["options"]["temperature"].is_number());
    }

    #[tokio::test]
    async fn test_flattened_error_string() {
        let sender = RecordingSender::replying(500, "Internal Server Error", "");
        let client = client_with(sender);

        let request = CallRequest {
            profile: ProviderProfile::openrouter_fixed(),
            endpoint: String::new(),
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            system_prompt: String::new(),
            user_prompt: "hello".to_string(),
            image: None,
            sampling: Sampling::default(),
        };

        let text = client.complete_text(&request).await;
        assert_eq!(text, "Error: HTTPError 500: Internal Server Error");
    }

    #[tokio::test]
    async fn test_conversion_failure_skips_network() {
        let sender =
            RecordingSender::replying(200, "OK", r#"{"choices":[{"message":{"content":"x"}}]}"#);
        let calls = sender.calls.clone();
        let client = client_with(sender);

        let request = CallRequest {
            profile: ProviderProfile::ollama_tunable().with_vision(),
            endpoint: "localhost:11434".to_string(),
            api_key: None,
            model: "llava".to_string(),
            system_prompt: String::new(),
            user_prompt: "describe".to_string(),
            image: Some(ImageSource::Bytes(Array::from_elem(IxDyn(&[8, 8, 2]), 1u8))),
            sampling: Sampling::default(),
        };

        let text = client.complete_text(&request).await;
        assert!(text.starts_with("Error: converting image:"), "got: {text}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let sender =
            RecordingSender::replying(200, "OK", r#"{"choices":[{"message":{"content":"x"}}]}"#);
        let calls = sender.calls.clone();
        let client = client_with(sender);

        let request = CallRequest {
            profile: ProviderProfile::openrouter_tunable(),
            endpoint: String::new(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            system_prompt: String::new(),
            user_prompt: "hello".to_string(),
            image: None,
            sampling: Sampling::default(),
        };

        let text = client.complete_text(&request).await;
        assert!(text.starts_with("Error: API key required"), "got: {text}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_vision_call_sends_data_url() {
        let sender = RecordingSender::replying(
            200,
            "OK",
            r#"{"choices":[{"message":{"content":"a gray square"}}]}"#,
        );
        let seen = sender.seen.clone();
        let client = client_with(sender);

        let request = CallRequest {
            profile: ProviderProfile::ollama_tunable().with_vision(),
            endpoint: "localhost:11434".to_string(),
            api_key: None,
            model: "llava".to_string(),
            system_prompt: "You describe images.".to_string(),
            user_prompt: "What is this?".to_string(),
            image: Some(ImageSource::Bytes(Array::from_elem(IxDyn(&[8, 8, 3]), 99u8))),
            sampling: Sampling::default(),
        };

        let text = client.complete(&request).await.unwrap();
        assert_eq!(text, "a gray square");

        let seen = seen.lock().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        let url = body["messages"][1]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}
