//! The `lumen ask` command: one completion call, one line of output.

use clap::{Args, ValueEnum};
use lumen_core::{
    CallRequest, ChatClient, ChatTransport, Config, ImageSource, ParamMode, Provider,
    ProviderProfile, Sampling,
};
use std::path::PathBuf;
use std::time::Duration;

/// Backend selection for the `ask` command.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ProviderArg {
    /// Cloud aggregator (requires an API key)
    Openrouter,
    /// Locally hosted server (no auth)
    Ollama,
}

/// Arguments for the `ask` command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// User prompt text
    pub prompt: String,

    /// Backend to call
    #[arg(long, value_enum, default_value = "ollama")]
    pub provider: ProviderArg,

    /// System prompt
    #[arg(long, default_value = "")]
    pub system: String,

    /// Model identifier (defaults to the configured model for the provider)
    #[arg(long)]
    pub model: Option<String>,

    /// host:port of the local server (Ollama only)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for OpenRouter (falls back to config, then the env var)
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Attach an image file (selects the vision-capable profile)
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Forward max_tokens and top_p in addition to temperature
    #[arg(long)]
    pub tunable: bool,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Nucleus sampling threshold
    #[arg(long)]
    pub top_p: Option<f32>,
}

/// Execute the ask command.
pub async fn execute(args: AskArgs, config: &Config) -> anyhow::Result<()> {
    let provider = match args.provider {
        ProviderArg::Openrouter => Provider::OpenRouter,
        ProviderArg::Ollama => Provider::Ollama,
    };
    let params = if args.tunable {
        ParamMode::Tunable
    } else {
        ParamMode::Fixed
    };

    let mut profile = ProviderProfile::new(provider, params);
    if args.image.is_some() {
        profile = profile.with_vision();
    }

    let image = match &args.image {
        Some(path) => Some(ImageSource::from_path(path)?),
        None => None,
    };

    let model = args.model.unwrap_or_else(|| match provider {
        Provider::OpenRouter => config.openrouter.model.clone(),
        Provider::Ollama => config.ollama.model.clone(),
    });

    let request = CallRequest {
        profile,
        endpoint: args
            .endpoint
            .unwrap_or_else(|| config.ollama.endpoint.clone()),
        api_key: args.api_key.or_else(|| config.openrouter_api_key()),
        model,
        system_prompt: args.system,
        user_prompt: args.prompt,
        image,
        sampling: Sampling {
            max_tokens: args.max_tokens,
            temperature: args.temperature,
            top_p: args.top_p,
        },
    };

    let transport = ChatTransport::new(Duration::from_millis(config.call.timeout_ms))
        .max_attempts(config.call.attempts);
    let client = ChatClient::new(transport);

    // The single output value: generated text, or "Error: ..." on failure.
    println!("{}", client.complete_text(&request).await);
    Ok(())
}
