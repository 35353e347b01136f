//! Lumen Core - Chat-completion adapters for node-graph hosts.
//!
//! Lumen bridges a visual pipeline host to external chat-completion APIs:
//! a cloud aggregator (OpenRouter) and a locally hosted inference server
//! (Ollama), optionally attaching an image for vision-capable models.
//!
//! # Architecture
//!
//! One parameterized cycle replaces per-backend wrapper code:
//!
//! ```text
//! CallRequest → [normalize image] → build body → retrying POST → text
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{CallRequest, ChatClient, ProviderProfile, Sampling};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ChatClient::default();
//!     let request = CallRequest {
//!         profile: ProviderProfile::ollama_fixed(),
//!         endpoint: "localhost:11434".to_string(),
//!         api_key: None,
//!         model: "llama3".to_string(),
//!         system_prompt: "You are helpful.".to_string(),
//!         user_prompt: "2+2=?".to_string(),
//!         image: None,
//!         sampling: Sampling { temperature: Some(0.7), ..Default::default() },
//!     };
//!     println!("{}", client.complete_text(&request).await);
//! }
//! ```

// Module declarations
pub mod chat;
pub mod config;
pub mod error;
pub mod imaging;

// Re-exports for convenient access
pub use chat::{
    build, AttemptObserver, BuiltRequest, CallRequest, ChatClient, ChatTransport, HttpResponse,
    HttpSend, ParamMode, Provider, ProviderProfile, ReqwestSender, Sampling, TracingObserver,
};
pub use config::Config;
pub use error::{CallError, CallResult, ConfigError, LumenError, Result};
pub use imaging::{normalize, EncodedImage, HostTensor, ImageSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
