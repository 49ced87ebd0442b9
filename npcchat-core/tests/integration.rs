//! Integration Tests — message log → registry flows
//!
//! Exercises the core pieces together without any text generator: load a
//! log from disk, replay it into a registry with fixed replies, and check
//! the resulting per-player moods and histories.

use std::io::Write;

use npcchat_core::history::Turn;
use npcchat_core::loader;
use npcchat_core::mood::{Mood, next_mood};
use npcchat_core::registry::PlayerRegistry;
use npcchat_core::ChatError;

const LOG: &str = r#"[
    {"player_id": "p2", "text": "You are useless", "timestamp": "2024-01-01T10:02:00"},
    {"player_id": "p1", "text": "Any quest for me?", "timestamp": "2024-01-01T10:01:00"},
    {"player_id": "p1", "text": "please help me", "timestamp": "2024-01-01T10:00:00"},
    {"player_id": "p2", "text": "Where is the tavern?", "timestamp": "2024-01-01T10:03:00"}
]"#;

fn write_log(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write log");
    file
}

// ---------------------------------------------------------------------------
// Load from disk
// ---------------------------------------------------------------------------

#[test]
fn loads_and_orders_file() {
    let file = write_log(LOG);
    let messages = loader::load_from_file(file.path()).expect("should load");

    let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["please help me", "Any quest for me?", "You are useless", "Where is the tavern?"]
    );
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = loader::load_from_file(dir.path().join("nope.json")).expect_err("should fail");
    assert!(matches!(err, ChatError::Io(_)));
}

#[test]
fn malformed_file_aborts_whole_load() {
    let file = write_log(r#"[{"player_id": "p1", "text": "hi"}]"#);
    let err = loader::load_from_file(file.path()).expect_err("should fail");
    assert!(err.is_malformed_input());
}

// ---------------------------------------------------------------------------
// Replay into registry
// ---------------------------------------------------------------------------

#[test]
fn replay_updates_moods_and_histories() {
    let messages = loader::load_from_str(LOG).expect("should load");
    let mut registry = PlayerRegistry::new();

    for message in &messages {
        let state = registry.get_or_create(&message.player_id);
        let before = state.mood;
        state.mood = next_mood(before, &message.text);
        state.record_turn(message.text.clone(), format!("reply to {}", message.text));
    }

    assert_eq!(registry.len(), 2);

    let p1 = registry.get("p1").expect("p1");
    assert_eq!(p1.mood, Mood::Friendly);
    assert_eq!(p1.history.len(), 4);
    assert_eq!(p1.history.snapshot()[0], Turn::Player("please help me".into()));

    // Angry from "useless", then unchanged by a neutral question.
    let p2 = registry.get("p2").expect("p2");
    assert_eq!(p2.mood, Mood::Angry);
    assert_eq!(
        p2.history.snapshot().last(),
        Some(&Turn::Npc("reply to Where is the tavern?".into()))
    );
}

#[test]
fn long_conversation_keeps_three_pairs() {
    let mut registry = PlayerRegistry::new();
    let id = "p1".into();
    for i in 1..=4 {
        registry.record_turn(&id, format!("line {i}"), format!("answer {i}"));
    }

    let state = registry.get("p1").expect("p1");
    let texts: Vec<_> = state.history.iter().map(Turn::text).collect();
    assert_eq!(
        texts,
        vec!["line 2", "answer 2", "line 3", "answer 3", "line 4", "answer 4"]
    );
}
