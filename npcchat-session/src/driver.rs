//! Session driver — replays a message log through the NPC.
//!
//! For every message, in chronological order:
//!
//! 1. resolve (or create) the sender's [`ConversationState`]
//! 2. generate a reply from the mood and history as they were *before* this
//!    message
//! 3. move the mood with [`next_mood`]
//! 4. append the player line and the reply to the history
//! 5. report an [`Interaction`]
//!
//! With `max_concurrent_players > 1` the log is split into one lane per
//! player. A lane handles its player's messages strictly in order; lanes run
//! concurrently. Interactions are still reported in global log order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use npcchat_core::history::Turn;
use npcchat_core::mood::{Mood, next_mood};
use npcchat_core::registry::{ConversationState, PlayerRegistry};
use npcchat_core::types::{ChatMessage, PlayerId, Timestamp};

use crate::reply::ReplyGenerator;

/// Everything that happened for one processed message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    /// Sender.
    pub player_id: PlayerId,
    /// When the message was sent.
    pub timestamp: Timestamp,
    /// What the player said.
    pub message: String,
    /// Mood used to generate the reply.
    pub mood_before: Mood,
    /// Mood after this message.
    pub mood_after: Mood,
    /// What the NPC replied.
    pub reply: String,
    /// Whether the reply is the fallback line.
    pub used_fallback: bool,
    /// History given to the generator (before this message's turns).
    pub history_used: Vec<Turn>,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Messages processed.
    pub messages_processed: usize,
    /// Distinct players in the registry after the run.
    pub players_seen: usize,
    /// Replies that fell back to the canned line.
    pub fallback_replies: usize,
}

/// Apply one message to one player's state.
pub async fn advance(
    state: &mut ConversationState,
    message: &ChatMessage,
    replies: &ReplyGenerator,
) -> Interaction {
    let mood_before = state.mood;
    let history_used = state.history.snapshot();

    let outcome = replies
        .generate_reply(
            mood_before,
            &message.text,
            state.history.prompt_entries(replies.prompt_turns()),
        )
        .await;

    let mood_after = next_mood(mood_before, &message.text);
    state.mood = mood_after;
    state.record_turn(message.text.clone(), outcome.text.clone());

    if mood_before != mood_after {
        debug!(player = %message.player_id, from = %mood_before, to = %mood_after, "mood changed");
    }

    Interaction {
        player_id: message.player_id.clone(),
        timestamp: message.timestamp.clone(),
        message: message.text.clone(),
        mood_before,
        mood_after,
        reply: outcome.text,
        used_fallback: outcome.used_fallback,
        history_used,
    }
}

/// Owns the player registry and drives messages through it.
pub struct SessionDriver {
    registry: PlayerRegistry,
    replies: ReplyGenerator,
    max_concurrent_players: usize,
}

impl SessionDriver {
    /// Driver over an empty default registry, processing sequentially.
    #[must_use]
    pub fn new(replies: ReplyGenerator) -> Self {
        Self::with_registry(replies, PlayerRegistry::new())
    }

    /// Driver over an existing registry.
    #[must_use]
    pub fn with_registry(replies: ReplyGenerator, registry: PlayerRegistry) -> Self {
        Self {
            registry,
            replies,
            max_concurrent_players: 1,
        }
    }

    /// Allow up to `n` player lanes in flight at once (`1` = sequential).
    #[must_use]
    pub fn with_max_concurrent_players(mut self, n: usize) -> Self {
        self.max_concurrent_players = n.max(1);
        self
    }

    /// Current per-player state.
    #[must_use]
    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// Consume the driver, keeping the registry.
    #[must_use]
    pub fn into_registry(self) -> PlayerRegistry {
        self.registry
    }

    /// Process a single message against the registry.
    pub async fn process(&mut self, message: &ChatMessage) -> Interaction {
        let state = self.registry.get_or_create(&message.player_id);
        advance(state, message, &self.replies).await
    }

    /// Process every message and hand each [`Interaction`] to `report`, in
    /// log order. `messages` must already be chronologically sorted.
    pub async fn run(
        &mut self,
        messages: &[ChatMessage],
        mut report: impl FnMut(&Interaction),
    ) -> RunSummary {
        info!(messages = messages.len(), lanes = self.max_concurrent_players, "processing messages");

        let mut summary = RunSummary::default();
        let mut tally = |interaction: &Interaction| {
            summary.messages_processed += 1;
            summary.fallback_replies += usize::from(interaction.used_fallback);
            report(interaction);
        };
        if self.max_concurrent_players > 1 {
            for interaction in self.run_lanes(messages).await {
                tally(&interaction);
            }
        } else {
            for message in messages {
                tally(&self.process(message).await);
            }
        }

        let summary = RunSummary {
            players_seen: self.registry.len(),
            ..summary
        };
        info!(
            processed = summary.messages_processed,
            players = summary.players_seen,
            fallbacks = summary.fallback_replies,
            "all messages processed"
        );
        summary
    }

    /// One task per player; returns interactions in original log order.
    async fn run_lanes(&mut self, messages: &[ChatMessage]) -> Vec<Interaction> {
        let lanes = partition_by_player(messages);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_players));
        let mut tasks = JoinSet::new();

        for (player_id, lane) in lanes {
            let mut state = self.registry.take(&player_id);
            let replies = self.replies.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let mut out = Vec::with_capacity(lane.len());
                for (seq, message) in lane {
                    out.push((seq, advance(&mut state, &message, &replies).await));
                }
                (player_id, state, out)
            });
        }

        let mut ordered = Vec::with_capacity(messages.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((player_id, state, out)) => {
                    self.registry.restore(player_id, state);
                    ordered.extend(out);
                }
                Err(e) => error!(error = %e, "player lane aborted; its interactions are lost"),
            }
        }

        ordered.sort_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, interaction)| interaction).collect()
    }
}

/// Group messages by player, keeping each player's messages in log order and
/// tagging each with its position in the full log.
fn partition_by_player(messages: &[ChatMessage]) -> Vec<(PlayerId, Vec<(usize, ChatMessage)>)> {
    let mut index: HashMap<&PlayerId, usize> = HashMap::new();
    let mut lanes: Vec<(PlayerId, Vec<(usize, ChatMessage)>)> = Vec::new();

    for (seq, message) in messages.iter().enumerate() {
        let slot = *index.entry(&message.player_id).or_insert_with(|| {
            lanes.push((message.player_id.clone(), Vec::new()));
            lanes.len() - 1
        });
        lanes[slot].1.push((seq, message.clone()));
    }
    lanes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
