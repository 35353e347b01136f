//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.call.attempts == 0 {
            return Err(ConfigError::ValidationError(
                "call.attempts must be > 0".into(),
            ));
        }
        if self.call.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "call.timeout_ms must be > 0".into(),
            ));
        }
        if self.ollama.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "ollama.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}
