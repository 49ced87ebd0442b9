//! Configuration for the npcchat system.
//!
//! Maps directly to `npcchat.toml`. Every field has a default, so an empty
//! file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Default hard timeout for one generation call, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default token limit per reply.
pub const DEFAULT_MAX_TOKENS: u32 = 120;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcChatConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Where the message log comes from.
    #[serde(default)]
    pub input: InputConfig,
    /// The NPC persona and its memory.
    #[serde(default)]
    pub npc: NpcConfig,
    /// Text generation backend.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Session driver settings.
    #[serde(default)]
    pub session: SessionConfig,
}

impl NpcChatConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ChatError::Config` if the TOML is invalid or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ChatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `ChatError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.npc.name.trim().is_empty() {
            return Err(ChatError::Config("npc.name must not be empty".into()));
        }
        if self.npc.history_capacity == 0 {
            return Err(ChatError::Config("npc.history_capacity must be at least 1".into()));
        }
        if self.llm.request_timeout_ms == 0 {
            return Err(ChatError::Config("llm.request_timeout_ms must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ChatError::Config(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.session.max_concurrent_players == 0 {
            return Err(ChatError::Config(
                "session.max_concurrent_players must be at least 1".into(),
            ));
        }
        if let Some(template) = &self.npc.system_template {
            if !template.contains("{mood}") {
                return Err(ChatError::Config(
                    "npc.system_template must contain the {mood} placeholder".into(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Message log source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the JSON message log.
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            messages_path: default_messages_path(),
        }
    }
}

/// The NPC persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcConfig {
    /// Name the NPC answers to in its instructions.
    #[serde(default = "default_npc_name")]
    pub name: String,
    /// Turns remembered per player.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Most recent turns passed to the generator as prior context.
    #[serde(default = "default_history_capacity")]
    pub prompt_turns: usize,
    /// Replacement persona template. Supports `{npc_name}` and `{mood}`.
    #[serde(default)]
    pub system_template: Option<String>,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            name: default_npc_name(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            prompt_turns: DEFAULT_HISTORY_CAPACITY,
            system_template: None,
        }
    }
}

/// Text generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "gemini", "openai", "ollama", "none".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL for the provider API. Empty means the provider's default.
    #[serde(default)]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Hard timeout for any generation call in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Extra attempts after a failed call before falling back.
    #[serde(default)]
    pub max_retries: u32,
    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: String::new(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_ms: default_timeout_ms(),
            max_retries: 0,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Session driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Players processed concurrently. 1 processes the whole log in order on
    /// one lane; larger values give each player its own serialized lane.
    #[serde(default = "default_concurrency")]
    pub max_concurrent_players: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_players: default_concurrency(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_messages_path() -> String { "players.json".to_string() }
fn default_npc_name() -> String { "Gregor".to_string() }
fn default_history_capacity() -> usize { DEFAULT_HISTORY_CAPACITY }
fn default_provider() -> String { "gemini".to_string() }
fn default_model() -> String { "gemini-1.5-flash".to_string() }
fn default_api_key_env() -> String { "GOOGLE_API_KEY".to_string() }
fn default_timeout_ms() -> u64 { DEFAULT_REQUEST_TIMEOUT_MS }
fn default_max_tokens() -> u32 { DEFAULT_MAX_TOKENS }
fn default_temperature() -> f32 { DEFAULT_TEMPERATURE }
fn default_concurrency() -> usize { 1 }

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
