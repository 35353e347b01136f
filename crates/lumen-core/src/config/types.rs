//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// OpenRouter (cloud aggregator) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Default model identifier
    pub model: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENROUTER_API_KEY}".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
        }
    }
}

/// Ollama (local server) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// host:port of the local server
    pub endpoint: String,

    /// Default model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
        }
    }
}

/// Retry and timeout settings for completion calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Total attempts per call
    pub attempts: u32,

    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout_ms: 60_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
