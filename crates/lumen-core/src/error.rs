//! Error types for the Lumen adapter core.
//!
//! Errors are organized by concern: configuration problems on one side,
//! per-call failures (image conversion, transport, HTTP status) on the other.
//! Call failures carry the text that is ultimately surfaced to the host.

use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Completion call errors
    #[error("Call error: {0}")]
    Call(#[from] CallError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of a single completion call.
///
/// The `Display` text of each variant is exactly what the host sees after the
/// `"Error: "` prefix, so wording here is part of the external contract.
#[derive(Error, Debug)]
pub enum CallError {
    /// Input image could not be converted to an encodable form.
    /// Deterministic, so never retried.
    #[error("converting image: {message}")]
    ImageConversion { message: String },

    /// Bearer token required by the provider but not supplied
    #[error("API key required for {provider} but not set")]
    MissingApiKey { provider: &'static str },

    /// Request body could not be serialized
    #[error("serializing request: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Non-2xx HTTP response. Retried up to the attempt cap.
    #[error("HTTPError {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Connection failure, timeout, or malformed response body.
    /// Retried identically to `HttpStatus`.
    #[error("{message}")]
    Transport { message: String },

    /// The retry loop completed without capturing a specific error
    #[error("exhausted retries")]
    ExhaustedRetries,
}

impl CallError {
    /// Whether the transport may retry after this failure.
    ///
    /// Image conversion and missing credentials are deterministic; hitting
    /// the endpoint again cannot change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CallError::HttpStatus { .. } | CallError::Transport { .. }
        )
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Convenience type alias for per-call results.
pub type CallResult<T> = std::result::Result<T, CallError>;
