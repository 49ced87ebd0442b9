//! NPC reply generation with a guaranteed answer.
//!
//! [`ReplyGenerator`] turns (mood, player line, recent history) into a
//! generation request, calls the configured [`TextGenerator`], and returns
//! the trimmed reply. Any failure (transport, status code, timeout, a
//! blocked or missing answer) is logged and replaced by [`FALLBACK_REPLY`].
//! A successful answer is returned trimmed, even if that leaves it empty.
//! Errors never reach the caller, so one bad call cannot halt a run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use npcchat_core::config::{
    DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TEMPERATURE, NpcChatConfig,
};
use npcchat_core::history::{DEFAULT_HISTORY_CAPACITY, PromptEntry, Role};
use npcchat_core::mood::Mood;
use npcchat_llm::{ChatTurn, GenerationRequest, LlmError, PersonaPrompt, TextGenerator};

/// What the NPC says when the generator fails.
pub const FALLBACK_REPLY: &str = "I... am not feeling well. I cannot talk right now.";

/// The reply for one message and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOutcome {
    /// Text to show the player.
    pub text: String,
    /// Whether `text` is the fallback line.
    pub used_fallback: bool,
}

impl ReplyOutcome {
    fn generated(text: String) -> Self {
        Self { text, used_fallback: false }
    }

    fn fallback() -> Self {
        Self { text: FALLBACK_REPLY.to_string(), used_fallback: true }
    }
}

/// Builds prompts for the NPC and absorbs generation failures.
#[derive(Clone)]
pub struct ReplyGenerator {
    generator: Arc<dyn TextGenerator>,
    persona: PersonaPrompt,
    prompt_turns: usize,
    max_tokens: u32,
    temperature: f32,
    timeout_ms: u64,
}

impl ReplyGenerator {
    /// Wrap `generator` with the given persona and default request settings.
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, persona: PersonaPrompt) -> Self {
        Self {
            generator,
            persona,
            prompt_turns: DEFAULT_HISTORY_CAPACITY,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Build from the `[npc]` and `[llm]` sections of the config.
    #[must_use]
    pub fn from_config(generator: Arc<dyn TextGenerator>, config: &NpcChatConfig) -> Self {
        let persona = match &config.npc.system_template {
            Some(template) => PersonaPrompt::custom(&config.npc.name, template),
            None => PersonaPrompt::builtin(&config.npc.name),
        };
        Self::new(generator, persona)
            .with_prompt_turns(config.npc.prompt_turns)
            .with_timeout(config.llm.request_timeout_ms)
            .with_sampling(config.llm.max_tokens, config.llm.temperature)
    }

    /// Limit how many recent turns are sent as context.
    #[must_use]
    pub fn with_prompt_turns(mut self, prompt_turns: usize) -> Self {
        self.prompt_turns = prompt_turns;
        self
    }

    /// Set the hard per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set token limit and temperature.
    #[must_use]
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// How many recent turns the caller should pass in.
    #[must_use]
    pub fn prompt_turns(&self) -> usize {
        self.prompt_turns
    }

    /// The persona in use.
    #[must_use]
    pub fn persona(&self) -> &PersonaPrompt {
        &self.persona
    }

    /// Build the request that [`generate_reply`](Self::generate_reply) would send.
    pub fn build_request<'a>(
        &self,
        mood: Mood,
        message_text: &str,
        history: impl IntoIterator<Item = PromptEntry<'a>>,
    ) -> GenerationRequest {
        let prior_turns = history
            .into_iter()
            .map(|entry| match entry.role {
                Role::User => ChatTurn::user(entry.text),
                Role::Model => ChatTurn::model(entry.text),
            })
            .collect();

        GenerationRequest::new(prior_turns, self.persona.render(mood.as_str(), message_text))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_timeout(self.timeout_ms)
    }

    /// Produce the NPC's reply. Never fails; see [`FALLBACK_REPLY`].
    pub async fn generate_reply<'a>(
        &self,
        mood: Mood,
        message_text: &str,
        history: impl IntoIterator<Item = PromptEntry<'a>>,
    ) -> ReplyOutcome {
        let request = self.build_request(mood, message_text, history);
        debug!(
            npc = self.persona.npc_name(),
            %mood,
            prior_turns = request.prior_turns.len(),
            "requesting reply"
        );

        let deadline = Duration::from_millis(self.timeout_ms);
        let result = match tokio::time::timeout(deadline, self.generator.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout_ms)),
        };

        match result {
            Ok(response) => {
                let text = response.text.trim();
                if text.is_empty() {
                    warn!(model = %response.model, "Generator returned only whitespace");
                }
                debug!(latency_ms = response.latency_ms, model = %response.model, "reply generated");
                ReplyOutcome::generated(text.to_string())
            }
            Err(e) => {
                error!(error = %e, "Could not get AI reply, using fallback");
                ReplyOutcome::fallback()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
