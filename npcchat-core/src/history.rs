//! Rolling per-player conversation history.
//!
//! A [`HistoryWindow`] is a bounded FIFO of [`Turn`]s. Appending is the only
//! mutation; once the window is full the oldest turn is evicted first.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of turns kept per player (three player/NPC pairs).
pub const DEFAULT_HISTORY_CAPACITY: usize = 6;

/// One utterance in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "speaker", content = "text")]
pub enum Turn {
    /// Something the player said.
    Player(String),
    /// Something the NPC replied.
    Npc(String),
}

impl Turn {
    /// The spoken text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Player(text) | Self::Npc(text) => text,
        }
    }

    /// The prompt role this turn maps to.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Player(_) => Role::User,
            Self::Npc(_) => Role::Model,
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(text) => write!(f, "player: {text:?}"),
            Self::Npc(text) => write!(f, "npc: {text:?}"),
        }
    }
}

/// Who spoke a prompt entry, from the text generator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The player.
    User,
    /// The NPC.
    Model,
}

impl Role {
    /// `"user"` or `"model"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role-tagged view of one [`Turn`], borrowed from the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptEntry<'a> {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub text: &'a str,
}

impl<'a> From<&'a Turn> for PromptEntry<'a> {
    fn from(turn: &'a Turn) -> Self {
        Self {
            role: turn.role(),
            text: turn.text(),
        }
    }
}

/// Bounded FIFO of the most recent turns with one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl HistoryWindow {
    /// Create an empty window with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty window that keeps at most `capacity` turns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Add a turn at the tail, evicting from the head while over capacity.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Role-tagged entries for the most recent `max_turns` turns, oldest first.
    ///
    /// The iterator is lazy and can be cloned to walk the entries again.
    pub fn prompt_entries(
        &self,
        max_turns: usize,
    ) -> impl DoubleEndedIterator<Item = PromptEntry<'_>> + ExactSizeIterator + Clone + '_ {
        let skip = self.turns.len().saturating_sub(max_turns);
        self.turns.iter().skip(skip).map(PromptEntry::from)
    }

    /// All stored turns, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator + '_ {
        self.turns.iter()
    }

    /// Owned copy of the stored turns, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Number of stored turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been said yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Maximum number of turns kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryWindow {
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

    fn push_pair(window: &mut HistoryWindow, i: usize) {
        window.append(Turn::Player(format!("player {i}")));
        window.append(Turn::Npc(format!("npc {i}")));
    }

    #[test]
    fn four_pairs_leave_last_three() {
        let mut window = HistoryWindow::new();
        for i in 1..=4 {
            push_pair(&mut window, i);
        }

        assert_eq!(window.len(), 6);
        let expected: Vec<Turn> = (2..=4)
            .flat_map(|i| [Turn::Player(format!("player {i}")), Turn::Npc(format!("npc {i}"))])
            .collect();
        assert_eq!(window.snapshot(), expected);
    }

    #[test]
    fn odd_overflow_evicts_single_turn() {
        let mut window = HistoryWindow::with_capacity(3);
        push_pair(&mut window, 1);
        push_pair(&mut window, 2);
        assert_eq!(window.len(), 3);
        assert_eq!(window.snapshot()[0], Turn::Npc("npc 1".into()));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut window = HistoryWindow::with_capacity(0);
        push_pair(&mut window, 1);
        assert!(window.is_empty());
    }

    #[test]
    fn prompt_entries_map_roles_in_order() {
        let mut window = HistoryWindow::new();
        push_pair(&mut window, 1);

        let entries: Vec<_> = window.prompt_entries(6).collect();
        assert_eq!(
            entries,
            vec![
                PromptEntry { role: Role::User, text: "player 1" },
                PromptEntry { role: Role::Model, text: "npc 1" },
            ]
        );
    }

    #[test]
    fn prompt_entries_limit_to_most_recent() {
        let mut window = HistoryWindow::new();
        push_pair(&mut window, 1);
        push_pair(&mut window, 2);

        let entries: Vec<_> = window.prompt_entries(2).map(|e| e.text).collect();
        assert_eq!(entries, vec!["player 2", "npc 2"]);
        assert_eq!(window.prompt_entries(0).count(), 0);
        assert_eq!(window.prompt_entries(100).len(), 4);
    }

    #[test]
    fn prompt_entries_can_be_replayed() {
        let mut window = HistoryWindow::new();
        push_pair(&mut window, 1);
        let entries = window.prompt_entries(6);
        let again = entries.clone();
        assert_eq!(entries.count(), again.count());
    }

    #[test]
    fn turn_serializes_as_tagged_variant() {
        let json = serde_json::to_string(&Turn::Npc("Halt.".into())).expect("serialize");
        assert_eq!(json, r#"{"speaker":"npc","text":"Halt."}"#);
    }
}
