//! # npcchat-llm — Text Generation Layer for npcchat
//!
//! Provides a unified interface for reply generation across backends:
//!   - **Gemini** (Google Generative Language API, default)
//!   - **OpenAI-compatible API** (OpenAI, Together, vLLM, ...)
//!   - **Ollama** (local)
//!   - **None** (every call fails, so callers use their fallback line)
//!
//! All generation goes through the [`TextGenerator`] trait, which gives:
//!   - Prior turns + prompt as the only inputs
//!   - Bounded per-call timeout
//!   - Optional retries
//!   - Typed errors the caller can absorb

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider, TextGenerator};
pub use error::LlmError;
pub use prompt::PersonaPrompt;
pub use types::{ChatRole, ChatTurn, GenerationRequest, GenerationResponse};
