//! Human-readable transcript output.

use std::fmt;

use tracing::info;

use npcchat_core::history::Turn;
use npcchat_core::registry::PlayerRegistry;

use crate::driver::{Interaction, RunSummary};

/// Render turns as `[player: "..", npc: ".."]`.
#[must_use]
pub fn format_history(turns: &[Turn]) -> String {
    let items: Vec<String> = turns.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---")?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Player ID: {}", self.player_id)?;
        writeln!(f, "   Player says: {:?}", self.message)?;
        writeln!(f, "   NPC mood now: {} (was {})", self.mood_after, self.mood_before)?;
        if self.used_fallback {
            writeln!(f, "   NPC replies: {:?} [fallback]", self.reply)?;
        } else {
            writeln!(f, "   NPC replies: {:?}", self.reply)?;
        }
        writeln!(f, "   History used: {}", format_history(&self.history_used))?;
        write!(f, "---")
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} message(s) from {} player(s); {} fallback repl{}.",
            self.messages_processed,
            self.players_seen,
            self.fallback_replies,
            if self.fallback_replies == 1 { "y" } else { "ies" }
        )
    }
}

/// Log each player's final mood and history size, sorted by player id.
pub fn log_final_states(registry: &PlayerRegistry) {
    for (player, state) in registry.players() {
        info!(
            player = %player,
            mood = %state.mood,
            turns = state.history.len(),
            "final conversation state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use npcchat_core::mood::Mood;
    use npcchat_core::types::{PlayerId, Timestamp};

    fn interaction(used_fallback: bool) -> Interaction {
        Interaction {
            player_id: PlayerId::from("p1"),
            timestamp: Timestamp::parse("2024-01-01T10:00:00").expect("ts"),
            message: "please help me".into(),
            mood_before: Mood::Neutral,
            mood_after: Mood::Friendly,
            reply: "Of course, traveler.".into(),
            used_fallback,
            history_used: vec![Turn::Player("hi".into()), Turn::Npc("Hm.".into())],
        }
    }

    #[test]
    fn transcript_contains_every_field() {
        let text = interaction(false).to_string();
        assert!(text.contains("Timestamp: 2024-01-01T10:00:00"));
        assert!(text.contains("Player ID: p1"));
        assert!(text.contains("\"please help me\""));
        assert!(text.contains("friendly (was neutral)"));
        assert!(text.contains("\"Of course, traveler.\""));
        assert!(text.contains(r#"[player: "hi", npc: "Hm."]"#));
        assert!(!text.contains("[fallback]"));
    }

    #[test]
    fn fallback_is_marked() {
        assert!(interaction(true).to_string().contains("[fallback]"));
    }

    #[test]
    fn empty_history_renders_brackets() {
        assert_eq!(format_history(&[]), "[]");
    }

    #[test]
    fn summary_pluralizes() {
        let one = RunSummary { messages_processed: 3, players_seen: 2, fallback_replies: 1 };
        assert!(one.to_string().ends_with("1 fallback reply."));
        let many = RunSummary { fallback_replies: 2, ..one };
        assert!(many.to_string().ends_with("2 fallback replies."));
    }
}
