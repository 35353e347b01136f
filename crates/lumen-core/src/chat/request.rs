//! Request assembly: call parameters in, URL + headers + JSON body out.
//!
//! The body is built from typed serde structs so field order is fixed and
//! the same `CallRequest` always serializes to byte-identical output. Fields
//! the caller did not provide are omitted from the wire payload entirely —
//! defaulting is the caller's concern, not the transport's.

use serde::Serialize;

use crate::chat::profile::{ParamMode, Provider, ProviderProfile};
use crate::error::{CallError, CallResult};
use crate::imaging::{normalize, ImageSource};

/// Generation-time sampling controls, each independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sampling {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl Sampling {
    pub fn is_empty(&self) -> bool {
        self.max_tokens.is_none() && self.temperature.is_none() && self.top_p.is_none()
    }

    /// Restrict to the parameters a profile variant forwards.
    fn for_mode(self, mode: ParamMode) -> Sampling {
        match mode {
            ParamMode::Fixed => Sampling {
                temperature: self.temperature,
                ..Sampling::default()
            },
            ParamMode::Tunable => self,
        }
    }
}

/// The unit of work submitted by a caller.
#[derive(Debug)]
pub struct CallRequest {
    pub profile: ProviderProfile,
    /// host:port of the local server; ignored by OpenRouter
    pub endpoint: String,
    /// Bearer token; required for OpenRouter, unused by Ollama
    pub api_key: Option<String>,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub image: Option<ImageSource>,
    pub sampling: Sampling,
}

/// A fully assembled HTTP request, ready for the transport.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

// --- Wire types ---

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

/// Ollama nests sampling under `options` and calls the token limit `num_predict`.
#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

/// Plain string for text-only calls, array of typed parts when an image rides along.
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

/// Assemble the complete request for a call.
///
/// Normalizes the image (when present), selects the endpoint URL and header
/// set, and serializes the provider-specific body to UTF-8 JSON bytes.
pub fn build(request: &CallRequest) -> CallResult<BuiltRequest> {
    let profile = &request.profile;

    let data_url = match &request.image {
        Some(source) if profile.supports_image => Some(normalize(source)?.data_url()),
        Some(_) => {
            return Err(CallError::ImageConversion {
                message: "profile does not accept an image input".to_string(),
            })
        }
        None => None,
    };

    let messages = match &data_url {
        None => vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(&request.system_prompt),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(&request.user_prompt),
            },
        ],
        Some(url) => vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Parts(vec![ContentPart::Text {
                    text: &request.system_prompt,
                }]),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: &request.user_prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: url.clone() },
                    },
                ]),
            },
        ],
    };

    let sampling = request.sampling.for_mode(profile.params);

    let body = match profile.provider {
        Provider::OpenRouter => ChatBody {
            model: &request.model,
            messages,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            options: None,
        },
        Provider::Ollama => ChatBody {
            model: &request.model,
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            options: (!sampling.is_empty()).then_some(OllamaOptions {
                num_predict: sampling.max_tokens,
                temperature: sampling.temperature,
                top_p: sampling.top_p,
            }),
        },
    };

    let mut headers = vec![("Content-Type", "application/json".to_string())];
    if profile.provider.requires_auth() {
        let key = request
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CallError::MissingApiKey {
                provider: profile.provider.name(),
            })?;
        headers.push(("Authorization", format!("Bearer {key}")));
    }

    Ok(BuiltRequest {
        url: profile.provider.completions_url(&request.endpoint),
        headers,
        body: serde_json::to_vec(&body)?,
    })
}
