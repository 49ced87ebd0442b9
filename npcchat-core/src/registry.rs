//! Per-player conversation state store.
//!
//! The [`PlayerRegistry`] is owned by whoever drives the session and handed
//! around by reference. Entries are created lazily on first reference and
//! are never removed for the lifetime of a run, except for the explicit
//! [`PlayerRegistry::take`] / [`PlayerRegistry::restore`] hand-off used when
//! a player's messages are processed on a separate lane.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::history::{DEFAULT_HISTORY_CAPACITY, HistoryWindow, Turn};
use crate::mood::Mood;
use crate::types::PlayerId;

/// What the NPC currently feels about, and remembers of, one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    /// Current mood toward the player.
    pub mood: Mood,
    /// Most recent turns exchanged with the player.
    pub history: HistoryWindow,
}

impl ConversationState {
    /// Fresh state: neutral mood, empty history of the given capacity.
    #[must_use]
    pub fn new(history_capacity: usize) -> Self {
        Self {
            mood: Mood::Neutral,
            history: HistoryWindow::with_capacity(history_capacity),
        }
    }

    /// Append the player's line, then the NPC's reply.
    pub fn record_turn(&mut self, player_text: impl Into<String>, npc_text: impl Into<String>) {
        self.history.append(Turn::Player(player_text.into()));
        self.history.append(Turn::Npc(npc_text.into()));
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Mapping from player id to that player's [`ConversationState`].
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    states: HashMap<PlayerId, ConversationState>,
    history_capacity: usize,
}

impl PlayerRegistry {
    /// Empty registry whose new entries use the default history capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Empty registry whose new entries keep `history_capacity` turns.
    #[must_use]
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            states: HashMap::new(),
            history_capacity,
        }
    }

    /// Return the player's state, inserting a fresh one if absent.
    pub fn get_or_create(&mut self, player_id: &PlayerId) -> &mut ConversationState {
        let capacity = self.history_capacity;
        self.states.entry(player_id.clone()).or_insert_with(|| {
            debug!(player = %player_id, "new conversation state");
            ConversationState::new(capacity)
        })
    }

    /// Look up a player's state without creating it.
    #[must_use]
    pub fn get(&self, player_id: &str) -> Option<&ConversationState> {
        self.states.get(player_id)
    }

    /// Replace the player's mood (creating the entry if needed).
    pub fn set_mood(&mut self, player_id: &PlayerId, mood: Mood) {
        self.get_or_create(player_id).mood = mood;
    }

    /// Append the player's line then the NPC's reply to the player's history.
    pub fn record_turn(
        &mut self,
        player_id: &PlayerId,
        player_text: impl Into<String>,
        npc_text: impl Into<String>,
    ) {
        self.get_or_create(player_id)
            .record_turn(player_text, npc_text);
    }

    /// Remove and return the player's state, or a fresh one if absent.
    ///
    /// Pair with [`restore`](Self::restore) once the player's lane is done.
    pub fn take(&mut self, player_id: &PlayerId) -> ConversationState {
        self.states
            .remove(player_id)
            .unwrap_or_else(|| ConversationState::new(self.history_capacity))
    }

    /// Put a previously taken state back.
    pub fn restore(&mut self, player_id: PlayerId, state: ConversationState) {
        self.states.insert(player_id, state);
    }

    /// Number of players seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no player has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every known player and their state, sorted by player id.
    #[must_use]
    pub fn players(&self) -> Vec<(&PlayerId, &ConversationState)> {
        let mut players: Vec<_> = self.states.iter().collect();
        players.sort_by(|a, b| a.0.cmp(b.0));
        players
    }

    /// History capacity given to newly created entries.
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_starts_neutral_and_empty() {
        let mut registry = PlayerRegistry::new();
        let state = registry.get_or_create(&PlayerId::from("p1"));
        assert_eq!(state.mood, Mood::Neutral);
        assert!(state.history.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_or_create_returns_existing() {
        let mut registry = PlayerRegistry::new();
        let id = PlayerId::from("p1");
        registry.set_mood(&id, Mood::Angry);
        assert_eq!(registry.get_or_create(&id).mood, Mood::Angry);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn record_turn_appends_player_then_npc() {
        let mut registry = PlayerRegistry::new();
        let id = PlayerId::from("p1");
        registry.record_turn(&id, "hello", "Move along.");

        let history = registry.get("p1").expect("exists").history.snapshot();
        assert_eq!(
            history,
            vec![Turn::Player("hello".into()), Turn::Npc("Move along.".into())]
        );
    }

    #[test]
    fn players_are_isolated() {
        let mut registry = PlayerRegistry::new();
        registry.set_mood(&PlayerId::from("p1"), Mood::Friendly);
        registry.record_turn(&PlayerId::from("p2"), "hi", "Hm.");

        let p1 = registry.get("p1").expect("p1");
        let p2 = registry.get("p2").expect("p2");
        assert_eq!(p1.mood, Mood::Friendly);
        assert!(p1.history.is_empty());
        assert_eq!(p2.mood, Mood::Neutral);
        assert_eq!(p2.history.len(), 2);
    }

    #[test]
    fn capacity_applies_to_new_entries() {
        let mut registry = PlayerRegistry::with_history_capacity(2);
        let id = PlayerId::from("p1");
        registry.record_turn(&id, "a", "b");
        registry.record_turn(&id, "c", "d");
        let history = registry.get("p1").expect("exists").history.snapshot();
        assert_eq!(history, vec![Turn::Player("c".into()), Turn::Npc("d".into())]);
    }

    #[test]
    fn take_and_restore_round_trip() {
        let mut registry = PlayerRegistry::new();
        let id = PlayerId::from("p1");
        registry.set_mood(&id, Mood::Angry);

        let state = registry.take(&id);
        assert!(registry.get("p1").is_none());
        registry.restore(id.clone(), state);
        assert_eq!(registry.get("p1").map(|s| s.mood), Some(Mood::Angry));

        let fresh = registry.take(&PlayerId::from("ghost"));
        assert_eq!(fresh.mood, Mood::Neutral);
    }

    #[test]
    fn players_sorted_by_id() {
        let mut registry = PlayerRegistry::new();
        for id in ["p3", "p1", "p2"] {
            registry.get_or_create(&PlayerId::from(id));
        }
        let ids: Vec<_> = registry.players().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }
}
