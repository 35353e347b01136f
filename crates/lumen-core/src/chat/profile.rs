//! Provider profiles: static descriptions of the supported backends.
//!
//! Each profile is one point on the provider × parameter-mode grid, plus a
//! vision capability flag. Profiles carry no connection state — they only
//! decide endpoint scheme, auth requirement, and how sampling parameters are
//! encoded on the wire.

/// Fixed OpenRouter chat-completions endpoint.
pub(crate) const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// A supported chat-completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Cloud aggregator; fixed HTTPS endpoint, bearer-token auth
    OpenRouter,
    /// Locally hosted server addressed by host:port; plaintext HTTP, no auth.
    /// Plain HTTP is intentional — the server lives on a trusted local network.
    Ollama,
}

impl Provider {
    /// Provider name for logging and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
        }
    }

    /// Resolve the chat-completions URL for this provider.
    ///
    /// `endpoint` is the host:port of the local server; OpenRouter ignores it.
    pub fn completions_url(&self, endpoint: &str) -> String {
        match self {
            Provider::OpenRouter => OPENROUTER_URL.to_string(),
            Provider::Ollama => format!("http://{endpoint}/v1/chat/completions"),
        }
    }

    /// Whether calls to this provider carry an `Authorization` header.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Provider::OpenRouter)
    }
}

/// How sampling parameters are exposed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    /// Only `temperature` is forwarded; other parameters are dropped
    Fixed,
    /// All provided sampling parameters are forwarded
    Tunable,
}

/// One backend/variant combination.
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    pub provider: Provider,
    pub params: ParamMode,
    /// Whether this variant accepts an image input
    pub supports_image: bool,
}

impl ProviderProfile {
    pub const fn new(provider: Provider, params: ParamMode) -> Self {
        Self {
            provider,
            params,
            supports_image: false,
        }
    }

    /// Mark this profile as vision-capable.
    pub const fn with_vision(mut self) -> Self {
        self.supports_image = true;
        self
    }

    pub const fn openrouter_fixed() -> Self {
        Self::new(Provider::OpenRouter, ParamMode::Fixed)
    }

    pub const fn openrouter_tunable() -> Self {
        Self::new(Provider::OpenRouter, ParamMode::Tunable)
    }

    pub const fn ollama_fixed() -> Self {
        Self::new(Provider::Ollama, ParamMode::Fixed)
    }

    pub const fn ollama_tunable() -> Self {
        Self::new(Provider::Ollama, ParamMode::Tunable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_url_from_host_port() {
        let url = Provider::Ollama.completions_url("localhost:11434");
        assert_eq!(url, "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_openrouter_url_ignores_endpoint() {
        let url = Provider::OpenRouter.completions_url("ignored:1234");
        assert_eq!(url, "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_auth_required_only_for_openrouter() {
        assert!(Provider::OpenRouter.requires_auth());
        assert!(!Provider::Ollama.requires_auth());
    }

    #[test]
    fn test_vision_flag() {
        let profile = ProviderProfile::ollama_tunable().with_vision();
        assert!(profile.supports_image);
        assert!(!ProviderProfile::ollama_tunable().supports_image);
    }
}
