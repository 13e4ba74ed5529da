//! External AI providers consulted before the rule-based engines.

pub mod chat_completions;
pub mod gemini;
pub mod prompts;
pub mod schema;

pub use chat_completions::ChatCompletionsClient;
pub use gemini::GeminiClient;

use crate::config::{
    ProviderConfig, ProvidersConfig, GEMINI_DEFAULT_MODEL, GROQ_DEFAULT_MODEL,
    OPENAI_DEFAULT_MODEL,
};
use crate::error::Result;
use crate::models::ProviderKind;
use std::time::Duration;
use thiserror::Error;

/// Why a single provider attempt produced no usable answer.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Longest error body kept from a non-success response.
pub const MAX_ERROR_BODY_CHARS: usize = 200;

impl ProviderError {
    /// Failure while decoding a success body. A timeout mid-body stays a timeout.
    fn envelope(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Malformed(format!("response envelope: {}", e))
        }
    }

    async fn from_status(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ProviderError::Status {
            status,
            body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// System and user messages for one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// A configured provider. Every variant answers a [`Prompt`] with raw JSON text.
pub enum Provider {
    Groq(ChatCompletionsClient),
    OpenAi(ChatCompletionsClient),
    Gemini(GeminiClient),
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Groq(_) => ProviderKind::Groq,
            Provider::OpenAi(_) => ProviderKind::OpenAi,
            Provider::Gemini(_) => ProviderKind::Gemini,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Groq(c) | Provider::OpenAi(c) => c.model(),
            Provider::Gemini(c) => c.model(),
        }
    }

    /// Label stored as `model_used`, e.g. "Groq llama-3.3-70b-versatile".
    pub fn label(&self) -> String {
        format!("{} {}", self.kind(), self.model())
    }

    pub async fn attempt(&self, prompt: &Prompt) -> std::result::Result<String, ProviderError> {
        match self {
            Provider::Groq(c) | Provider::OpenAi(c) => c.complete(prompt).await,
            Provider::Gemini(c) => c.complete(prompt).await,
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.kind())
            .field("model", &self.model())
            .finish()
    }
}

/// Providers with usable credentials, held in priority order.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts `providers` into priority order.
    pub fn new(mut providers: Vec<Provider>) -> Self {
        providers.sort_by_key(|p| p.kind());
        Self { providers }
    }

    /// Build clients for every enabled provider with a credential; skip the rest.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut providers = Vec::new();

        for kind in ProviderKind::PRIORITY {
            let entry = match kind {
                ProviderKind::Groq => config.groq.as_ref(),
                ProviderKind::OpenAi => config.openai.as_ref(),
                ProviderKind::Gemini => config.gemini.as_ref(),
            };
            let Some(entry) = entry.filter(|c| c.is_usable()) else {
                tracing::debug!(provider = %kind, "Provider not configured, skipping");
                continue;
            };
            providers.push(build(kind, entry, timeout)?);
        }

        Ok(Self { providers })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(Provider::kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

fn build(kind: ProviderKind, entry: &ProviderConfig, timeout: Duration) -> Result<Provider> {
    let base_url = |default: &str| entry.base_url.clone().unwrap_or_else(|| default.into());
    let model = |default: &str| entry.model.clone().unwrap_or_else(|| default.into());

    let provider = match kind {
        ProviderKind::Groq => Provider::Groq(ChatCompletionsClient::new(
            base_url(chat_completions::GROQ_BASE_URL),
            &entry.api_key,
            model(GROQ_DEFAULT_MODEL),
            timeout,
        )?),
        ProviderKind::OpenAi => Provider::OpenAi(ChatCompletionsClient::new(
            base_url(chat_completions::OPENAI_BASE_URL),
            &entry.api_key,
            model(OPENAI_DEFAULT_MODEL),
            timeout,
        )?),
        ProviderKind::Gemini => Provider::Gemini(GeminiClient::new(
            base_url(gemini::GEMINI_BASE_URL),
            &entry.api_key,
            model(GEMINI_DEFAULT_MODEL),
            timeout,
        )?),
    };
    Ok(provider)
}
