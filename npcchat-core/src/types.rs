//! Core type definitions for the npcchat conversation model.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of the player who sent a message.
///
/// Opaque to the system: two ids are the same player iff the strings match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a player id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// An ISO-8601 timestamp as it appeared in the input, plus its parsed instant.
///
/// Ordering and equality use the instant only. Offset-carrying inputs are
/// normalized to UTC; offset-less inputs are taken to already be UTC.
#[derive(Debug, Clone, Serialize)]
pub struct Timestamp {
    /// The text exactly as supplied, kept for reporting.
    pub raw: String,
    /// The instant used for chronological ordering (UTC).
    pub instant: NaiveDateTime,
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

impl Timestamp {
    /// Parse an ISO-8601 date or date-time.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH[:MM[:SS[.fff]]]` (a single space
    /// may replace the `T`, and `,` may replace the `.`), the basic forms
    /// `YYYYMMDD[THH[MM[SS]]]`, and any date-time form with `Z`, `±HH`,
    /// `±HHMM` or `±HH:MM`.
    ///
    /// # Errors
    /// Returns a description of the problem if the text is not a timestamp.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("timestamp is empty".to_string());
        }

        // `2024-01-01 10:00:00` → `2024-01-01T10:00:00`
        let normalized = if trimmed.len() > 10 && trimmed.as_bytes()[10] == b' ' {
            format!("{}T{}", &trimmed[..10], &trimmed[11..])
        } else {
            trimmed.to_string()
        };

        let instant = parse_instant(&to_extended(&normalized))
            .ok_or_else(|| format!("'{raw}' is not a valid ISO-8601 timestamp"))?;

        Ok(Self {
            raw: raw.to_string(),
            instant,
        })
    }
}

/// Rewrite basic-form dates and times, hour-only times, comma fractions and
/// short or `Z` offsets into the extended form the chrono formats expect.
/// Anything it does not recognise is passed through for the parser to reject.
fn to_extended(s: &str) -> String {
    if !s.is_ascii() {
        return s.to_string();
    }
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    let (date, time) = match s.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (s, None),
    };
    let date = if date.len() == 8 && is_digits(date) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    };
    let Some(time) = time else {
        return date;
    };

    let (clock, offset) = split_offset(time);
    let (main, fraction) = match clock.find(['.', ',']) {
        Some(i) => (&clock[..i], Some(&clock[i + 1..])),
        None => (clock, None),
    };
    let mut main = if !main.contains(':') && matches!(main.len(), 4 | 6) && is_digits(main) {
        (0..main.len())
            .step_by(2)
            .map(|i| &main[i..i + 2])
            .collect::<Vec<_>>()
            .join(":")
    } else {
        main.to_string()
    };
    if main.len() == 2 {
        main.push_str(":00");
    }

    let mut out = format!("{date}T{main}");
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out.push_str(&extended_offset(offset));
    out
}

/// Split `10:00:00+02:00` into `("10:00:00", "+02:00")`.
fn split_offset(time: &str) -> (&str, &str) {
    if let Some(clock) = time.strip_suffix(['Z', 'z']) {
        return (clock, "Z");
    }
    match time.rfind(['+', '-']) {
        Some(i) => (&time[..i], &time[i..]),
        None => (time, ""),
    }
}

fn extended_offset(offset: &str) -> String {
    if offset == "Z" {
        return "+00:00".to_string();
    }
    let Some(rest) = offset.get(1..) else {
        return offset.to_string();
    };
    let sign = &offset[..1];
    match rest.len() {
        2 if !rest.contains(':') => format!("{sign}{rest}:00"),
        4 if !rest.contains(':') => format!("{sign}{}:{}", &rest[..2], &rest[2..]),
        _ => offset.to_string(),
    }
}

fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl FromStr for Timestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One chat line sent by a player to the NPC. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Who sent it.
    pub player_id: PlayerId,
    /// What they said.
    pub text: String,
    /// When they said it.
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Build a message, parsing the timestamp.
    ///
    /// # Errors
    /// Returns a description of the problem if `timestamp` does not parse.
    pub fn new(
        player_id: impl Into<PlayerId>,
        text: impl Into<String>,
        timestamp: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            player_id: player_id.into(),
            text: text.into(),
            timestamp: Timestamp::parse(timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
