//! NPC mood toward a player and the keyword rules that move it.
//!
//! [`next_mood`] is the only place a mood ever changes. It is a pure
//! function of the current mood and the player's message: no state, no
//! randomness, no I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Words that make the NPC friendly. Checked first.
pub const FRIENDLY_TRIGGERS: &[&str] = &["help", "quest", "thank", "please"];

/// Words that make the NPC angry. Only checked if no friendly word matched.
pub const ANGRY_TRIGGERS: &[&str] = &["useless", "stupid", "hate", "worst"];

/// The NPC's disposition toward one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Starting mood. Professional and concise.
    #[default]
    Neutral,
    /// Helpful and welcoming.
    Friendly,
    /// Dismissive and grumpy.
    Angry,
}

impl Mood {
    /// All moods.
    #[must_use]
    pub fn all() -> &'static [Mood] {
        &[Self::Neutral, Self::Friendly, Self::Angry]
    }

    /// Lowercase name, as used in prompts and transcripts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Friendly => "friendly",
            Self::Angry => "angry",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "friendly" => Ok(Self::Friendly),
            "angry" => Ok(Self::Angry),
            _ => Err(format!("unknown mood: '{s}'")),
        }
    }
}

/// Compute the mood after the player says `text`.
///
/// Matching is a case-insensitive substring search, so `"Thanks!"` and
/// `"helpful"` both count. If the message contains both friendly and angry
/// words, friendly wins. If it contains neither, the mood is unchanged.
#[must_use]
pub fn next_mood(current: Mood, text: &str) -> Mood {
    let lowered = text.to_lowercase();
    if contains_any(&lowered, FRIENDLY_TRIGGERS) {
        Mood::Friendly
    } else if contains_any(&lowered, ANGRY_TRIGGERS) {
        Mood::Angry
    } else {
        current
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
