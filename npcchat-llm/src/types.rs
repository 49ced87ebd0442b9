//! Core types for generation requests and responses.

use std::fmt;

use serde::{Deserialize, Serialize};

use npcchat_core::config::{DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TEMPERATURE};

/// Speaker of a prior turn, in the generator's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The human side of the conversation.
    User,
    /// The model (NPC) side of the conversation.
    Model,
}

impl ChatRole {
    /// Gemini role name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }

    /// Role name used by OpenAI-style chat APIs (and Ollama).
    #[must_use]
    pub fn openai_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One earlier utterance given to the generator as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who said it.
    pub role: ChatRole,
    /// What was said.
    pub text: String,
}

impl ChatTurn {
    /// A user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    /// A model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into() }
    }
}

/// A request to the generator: prior turns plus the new prompt.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Earlier turns, oldest first.
    pub prior_turns: Vec<ChatTurn>,
    /// The new, instruction-annotated prompt.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl GenerationRequest {
    /// Create a request with the same short-reply defaults as `[llm]` config.
    #[must_use]
    pub fn new(prior_turns: Vec<ChatTurn>, prompt: impl Into<String>) -> Self {
        Self {
            prior_turns,
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A response from the generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    /// The generated text, untrimmed.
    pub text: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model was used.
    pub model: String,
}
