//! LLM Client — unified interface for Gemini, OpenAI-compatible and Ollama backends.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{GenerationRequest, GenerationResponse};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Default local Ollama base URL.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// The capability "produce a reply from prior turns and a prompt".
///
/// Everything that talks to a model goes through this trait so callers can
/// swap in a stub for tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// Provider backend for text generation.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini { base_url: String, api_key: String },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible { base_url: String, api_key: String },
    /// Ollama running locally.
    Ollama { base_url: String },
    /// No backend — all calls return error, triggering the caller's fallback.
    None,
}

impl LlmProvider {
    /// Build a provider from its config name.
    ///
    /// An empty `base_url` selects the provider's default. Hosted providers
    /// without an API key degrade to [`LlmProvider::None`].
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` for an unknown provider name.
    pub fn from_settings(
        name: &str,
        base_url: &str,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let url = |default: &str| {
            if base_url.trim().is_empty() {
                default.to_string()
            } else {
                base_url.trim_end_matches('/').to_string()
            }
        };
        let api_key = api_key.filter(|k| !k.trim().is_empty());

        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => match api_key {
                Some(api_key) => Ok(Self::Gemini { base_url: url(DEFAULT_GEMINI_BASE_URL), api_key }),
                None => {
                    warn!("No API key for Gemini — every reply will use the fallback line");
                    Ok(Self::None)
                }
            },
            "openai" => match api_key {
                Some(api_key) => Ok(Self::OpenAiCompatible { base_url: url(DEFAULT_OPENAI_BASE_URL), api_key }),
                None => {
                    warn!("No API key for OpenAI — every reply will use the fallback line");
                    Ok(Self::None)
                }
            },
            "ollama" => Ok(Self::Ollama { base_url: url(DEFAULT_OLLAMA_BASE_URL) }),
            "none" => Ok(Self::None),
            other => Err(LlmError::ConfigError(format!("unknown LLM provider: '{other}'"))),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "gemini",
            Self::OpenAiCompatible { .. } => "openai",
            Self::Ollama { .. } => "ollama",
            Self::None => "none",
        }
    }
}

/// The main LLM client that routes requests to the configured backend.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client with no LLM backend (all calls fail → fallback reply).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Check if the LLM client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// The configured provider.
    #[must_use]
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Send one request per attempt until success or the retries run out.
    async fn send_with_retries(
        &self,
        label: &str,
        build: impl Fn() -> RequestBuilder + Send + Sync,
        extract: fn(&Value) -> Result<String, LlmError>,
        timeout_ms: u64,
    ) -> Result<GenerationResponse, LlmError> {
        let attempts = self.max_retries + 1;
        let mut last_error = LlmError::Unavailable(format!("{label} was never called"));

        for attempt in 0..attempts {
            if attempt > 0 {
                debug!("Retrying {} call (attempt {}/{})", label, attempt + 1, attempts);
            }

            let start = Instant::now();
            let result = build()
                .timeout(Duration::from_millis(timeout_ms))
                .send()
                .await;

            let error = match result {
                Ok(resp) if resp.status().is_success() => {
                    let body: Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::ParseError(e.to_string()))?;
                    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let text = extract(&body)?;
                    debug!(latency_ms, chars = text.len(), "{} reply received", label);
                    return Ok(GenerationResponse {
                        text,
                        latency_ms,
                        model: self.model.clone(),
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    let detail = resp.text().await.unwrap_or_default();
                    LlmError::RequestFailed(format!("HTTP {status}: {detail}"))
                }
                Err(e) if e.is_timeout() => LlmError::Timeout(timeout_ms),
                Err(e) => LlmError::from(e),
            };

            warn!("{} request failed: {}", label, error);
            if !error.is_retryable() {
                return Err(error);
            }
            last_error = error;
        }

        if attempts == 1 {
            Err(last_error)
        } else {
            Err(LlmError::RetriesExhausted {
                attempts,
                last_error: last_error.to_string(),
            })
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    /// Generate a reply from the configured backend.
    ///
    /// Returns `Err` if the backend is unavailable or every attempt fails.
    /// The caller should fall back to a canned line on error.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Gemini { base_url, api_key } => {
                let url = format!("{base_url}/v1beta/models/{}:generateContent", self.model);
                let body = gemini_body(request);
                self.send_with_retries(
                    "Gemini",
                    || {
                        self.http
                            .post(&url)
                            .header("x-goog-api-key", api_key)
                            .json(&body)
                    },
                    extract_gemini_text,
                    request.timeout_ms,
                )
                .await
            }
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                let url = format!("{base_url}/v1/chat/completions");
                let body = openai_body(&self.model, request);
                self.send_with_retries(
                    "OpenAI",
                    || self.http.post(&url).bearer_auth(api_key).json(&body),
                    extract_openai_text,
                    request.timeout_ms,
                )
                .await
            }
            LlmProvider::Ollama { base_url } => {
                let url = format!("{base_url}/api/chat");
                let body = ollama_body(&self.model, request);
                self.send_with_retries(
                    "Ollama",
                    || self.http.post(&url).json(&body),
                    extract_ollama_text,
                    request.timeout_ms,
                )
                .await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

/// Gemini `generateContent` body: prior turns, then the prompt as a user turn.
#[must_use]
pub fn gemini_body(request: &GenerationRequest) -> Value {
    let mut contents: Vec<Value> = request
        .prior_turns
        .iter()
        .map(|turn| json!({ "role": turn.role.as_str(), "parts": [{ "text": turn.text }] }))
        .collect();
    contents.push(json!({ "role": "user", "parts": [{ "text": request.prompt }] }));

    json!({
        "contents": contents,
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
        }
    })
}

/// OpenAI chat completions body.
#[must_use]
pub fn openai_body(model: &str, request: &GenerationRequest) -> Value {
    json!({
        "model": model,
        "messages": chat_messages(request),
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

/// Ollama `/api/chat` body.
#[must_use]
pub fn ollama_body(model: &str, request: &GenerationRequest) -> Value {
    json!({
        "model": model,
        "messages": chat_messages(request),
        "stream": false,
        "options": {
            "temperature": request.temperature,
            "num_predict": request.max_tokens,
        }
    })
}

fn chat_messages(request: &GenerationRequest) -> Vec<Value> {
    let mut messages: Vec<Value> = request
        .prior_turns
        .iter()
        .map(|turn| json!({ "role": turn.role.openai_name(), "content": turn.text }))
        .collect();
    messages.push(json!({ "role": "user", "content": request.prompt }));
    messages
}

/// Pull the reply text out of a Gemini response.
///
/// # Errors
/// `Blocked` when the prompt or candidate was stopped by a safety filter,
/// `ParseError` when no candidate text is present.
pub fn extract_gemini_text(body: &Value) -> Result<String, LlmError> {
    if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
        return Err(LlmError::Blocked(reason.to_string()));
    }

    let candidate = &body["candidates"][0];
    if candidate.is_null() {
        return Err(LlmError::ParseError("response has no candidates".into()));
    }

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.is_empty() {
        if let Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) =
            candidate["finishReason"].as_str()
        {
            return Err(LlmError::Blocked(reason.to_string()));
        }
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

/// Pull the reply text out of an OpenAI chat completions response.
///
/// # Errors
/// `ParseError` when the expected field is missing.
pub fn extract_openai_text(body: &Value) -> Result<String, LlmError> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))
}

/// Pull the reply text out of an Ollama chat response.
///
/// # Errors
/// `ParseError` when the expected field is missing.
pub fn extract_ollama_text(body: &Value) -> Result<String, LlmError> {
    body["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LlmError::ParseError("missing message.content".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
