//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   GeminiBackend           Google Gemini API (gemini-2.0-flash, gemini-1.5-pro, ...)
//!   OpenAiCompatibleBackend any OpenAI-compatible endpoint (Ollama, LMStudio, vLLM, ...)

use std::sync::Arc;

use aminoverse_common::{AminoverseError, SandboxClient};
use aminoverse_config::{LlmConfig, LlmProvider};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const OLLAMA_API_URL: &str = "http://localhost:11434";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Client error: {0}")]
    Client(#[from] AminoverseError),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Model returned no text")]
    EmptyResponse,
}

// ── Request / Response ────────────────────────────────────────────────────────

/// One stateless single-turn completion.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), max_tokens: 2048, temperature: 0.2 }
    }

    pub fn with_generation(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
}

/// Build the backend named in the config. A missing API key is not an error here;
/// the backend reports `Unavailable` on each call instead.
pub fn build_backend(config: &LlmConfig, client: SandboxClient) -> Arc<dyn LlmBackend> {
    match config.provider {
        LlmProvider::Gemini => {
            let mut backend = GeminiBackend::new(client, config.resolved_api_key(), &config.model);
            if let Some(ref url) = config.base_url {
                backend = backend.with_base_url(url);
            }
            Arc::new(backend)
        }
        LlmProvider::OpenaiCompatible => {
            let base_url = config.base_url.as_deref().unwrap_or(OLLAMA_API_URL);
            Arc::new(OpenAiCompatibleBackend::new(
                client,
                base_url,
                &config.model,
                config.resolved_api_key(),
            ))
        }
    }
}

// ── Helper: parse OpenAI-style response ──────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(body)
}

fn non_empty(response: LlmResponse) -> Result<LlmResponse, LlmError> {
    if response.content.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(response)
}

// ── 1. OpenAI-Compatible (Ollama, LMStudio, vLLM, …) ─────────────────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<SecretString>,
    client: SandboxClient,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        client: SandboxClient,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client,
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k.expose_secret()),
            None    => req,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model":       self.model,
            "messages":    [{ "role": "user", "content": req.prompt }],
            "max_tokens":  req.max_tokens,
            "temperature": req.temperature,
        });
        let resp = self.auth(self.client.post(&url)?).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        non_empty(parse_openai_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
}

// ── 2. Google Gemini ──────────────────────────────────────────────────────────

pub struct GeminiBackend {
    pub model: String,
    base_url: String,
    api_key: Option<SecretString>,
    client: SandboxClient,
}

impl GeminiBackend {
    pub fn new(client: SandboxClient, api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: GEMINI_API_URL.to_string(),
            api_key,
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            LlmError::Unavailable("no Gemini API key configured".to_string())
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": req.prompt }] }],
            "generationConfig": {
                "maxOutputTokens": req.max_tokens,
                "temperature":     req.temperature,
            }
        });

        // Key goes in a header so it never shows up in a logged URL.
        let resp = self.client
            .post(&url)?
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let content = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string();

        let prompt_tokens = json["usageMetadata"]["promptTokenCount"]
            .as_u64().unwrap_or(0) as u32;
        let completion_tokens = json["usageMetadata"]["candidatesTokenCount"]
            .as_u64().unwrap_or(0) as u32;

        non_empty(LlmResponse {
            content,
            model: self.model.clone(),
            prompt_tokens,
            completion_tokens,
        })
    }

    fn model_id(&self) -> &str { &self.model }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
