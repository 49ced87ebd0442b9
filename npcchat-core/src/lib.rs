//! # npcchat Core Library
//!
//! Provider-agnostic conversation state for a single game NPC.
//!
//! A run replays a log of player chat messages in chronological order. For
//! each player the NPC keeps:
//!
//! - **Mood** — neutral, friendly or angry, moved only by [`mood::next_mood`]
//! - **History** — a bounded FIFO of the last few [`Turn`]s, fed back to the
//!   text generator as prior context
//!
//! ## Modules
//!
//! - `loader` — JSON message log → validated, time-ordered [`ChatMessage`]s
//! - `mood` — keyword-driven mood transitions
//! - `history` — [`HistoryWindow`] ring of role-tagged turns
//! - `registry` — [`PlayerRegistry`] of per-player [`ConversationState`]
//! - `config` — `npcchat.toml` mapping

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod history;
pub mod loader;
pub mod mood;
pub mod registry;
pub mod types;

pub use config::NpcChatConfig;
pub use error::{ChatError, Result};
pub use history::{HistoryWindow, PromptEntry, Role, Turn};
pub use mood::{Mood, next_mood};
pub use registry::{ConversationState, PlayerRegistry};
pub use types::*;
