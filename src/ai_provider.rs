use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: AIProvider,
        status: u16,
        body: String,
    },

    #[error("Invalid {0} response format")]
    MalformedResponse(AIProvider),

    #[error("{0} API key required")]
    MissingApiKey(AIProvider),

    #[error("Text generation unavailable")]
    Unavailable,
}

/// Anything that can turn a system preamble and a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    OpenAI,
    Ollama,
    Claude,
    #[serde(rename = "none")]
    Disabled,
}

impl std::fmt::Display for AIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AIProvider::OpenAI => write!(f, "openai"),
            AIProvider::Ollama => write!(f, "ollama"),
            AIProvider::Claude => write!(f, "claude"),
            AIProvider::Disabled => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for AIProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(AIProvider::OpenAI),
            "ollama" => Ok(AIProvider::Ollama),
            "claude" | "anthropic" => Ok(AIProvider::Claude),
            "none" | "off" | "" => Ok(AIProvider::Disabled),
            _ => Err(anyhow::anyhow!("Unknown AI provider: {}", s)),
        }
    }
}

impl AIProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::OpenAI => "gpt-4o-mini",
            AIProvider::Ollama => "qwen2.5",
            AIProvider::Claude => "claude-3-5-haiku-latest",
            AIProvider::Disabled => "",
        }
    }

    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            AIProvider::OpenAI => Some("OPENAI_API_KEY"),
            AIProvider::Claude => Some("ANTHROPIC_API_KEY"),
            AIProvider::Ollama | AIProvider::Disabled => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AIConfig {
    pub provider: AIProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

/// HTTP-backed generator for the OpenAI, Ollama and Anthropic chat APIs
pub struct AIProviderClient {
    config: AIConfig,
    http_client: reqwest::Client,
}

impl AIProviderClient {
    pub fn new(config: AIConfig) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(AIProviderClient {
            config,
            http_client,
        })
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(GenerationError::MissingApiKey(self.config.provider))
    }

    async fn post(
        &self,
        request: reqwest::RequestBuilder,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                provider: self.config.provider,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn chat_openai(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1");

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let request = self
            .http_client
            .post(format!("{}/chat/completions", base_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", api_key));
        let response_json = self.post(request, &request_body).await?;

        response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(GenerationError::MalformedResponse(AIProvider::OpenAI))
    }

    async fn chat_ollama(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("http://localhost:11434");

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt}
            ],
            "stream": false
        });

        let request = self
            .http_client
            .post(format!("{}/api/chat", base_url.trim_end_matches('/')));
        let response_json = self.post(request, &request_body).await?;

        response_json["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(GenerationError::MalformedResponse(AIProvider::Ollama))
    }

    async fn chat_claude(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key()?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.anthropic.com/v1");

        let request_body = serde_json::json!({
            "model": self.config.model,
            "system": system_prompt,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let request = self
            .http_client
            .post(format!("{}/messages", base_url.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let response_json = self.post(request, &request_body).await?;

        response_json["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(GenerationError::MalformedResponse(AIProvider::Claude))
    }
}

#[async_trait]
impl TextGenerator for AIProviderClient {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        match self.config.provider {
            AIProvider::OpenAI => self.chat_openai(system_prompt, prompt).await,
            AIProvider::Ollama => self.chat_ollama(system_prompt, prompt).await,
            AIProvider::Claude => self.chat_claude(system_prompt, prompt).await,
            AIProvider::Disabled => Err(GenerationError::Unavailable),
        }
    }
}

/// Fixed-reply generator. With no reply configured every call fails, which
/// sends the persona down its fallback path.
#[derive(Debug, Clone, Default)]
pub struct CannedGenerator {
    reply: Option<String>,
}

impl CannedGenerator {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
        }
    }

    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _system_prompt: &str, _prompt: &str) -> Result<String, GenerationError> {
        self.reply.clone().ok_or(GenerationError::Unavailable)
    }
}
