//! # npcchat-session — Session Driver for npcchat
//!
//! This crate ties the provider-agnostic `npcchat-core` state to the
//! `npcchat-llm` text generators and replays a chat log through the NPC.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               npcchat-session                │
//! │  ┌──────────────┐        ┌────────────────┐  │
//! │  │ SessionDriver│───────▶│ ReplyGenerator │  │
//! │  └──────┬───────┘        └───────┬────────┘  │
//! │         │                        │           │
//! │         ▼                        ▼           │
//! │  ┌──────────────┐        ┌────────────────┐  │
//! │  │ npcchat-core │        │  npcchat-llm   │  │
//! │  └──────────────┘        └────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `driver` — per-message state machine, sequential or per-player lanes
//! - `reply` — prompt assembly and fallback-on-failure generation
//! - `report` — transcript formatting
//! - `settings` — config discovery, logging, and wiring

pub mod driver;
pub mod reply;
pub mod report;
pub mod settings;

pub use driver::{Interaction, RunSummary, SessionDriver};
pub use reply::{FALLBACK_REPLY, ReplyGenerator, ReplyOutcome};
