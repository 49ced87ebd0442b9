//! npcchat Benchmark Suite
//!
//! Everything a message costs apart from the text generator call:
//!   mood_transition_long_text ....... keyword scan over a long message
//!   history_append_full_window ...... append with eviction at capacity
//!   history_prompt_entries .......... walking the window into a prompt
//!   load_and_sort/{100,1000} ........ validation plus stable sort
//!   replay_500_messages_20_players .. registry updates for a whole log

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use npcchat_core::history::{HistoryWindow, Turn};
use npcchat_core::loader::{self, RawMessage};
use npcchat_core::mood::{Mood, next_mood};
use npcchat_core::registry::PlayerRegistry;

fn make_raw(i: usize, players: usize) -> RawMessage {
    // Reverse minute order so the sort has real work to do.
    let minute = 999 - i;
    RawMessage::new(
        &format!("p{}", i % players),
        "could you please help me find the blacksmith",
        &format!("2024-01-01T{:02}:{:02}:00", minute / 60 % 24, minute % 60),
    )
}

fn bench_mood_transition(c: &mut Criterion) {
    let text = "I walked all the way from the harbour and the road was long ".repeat(8) + "thank you";
    c.bench_function("mood_transition_long_text", |b| {
        b.iter(|| next_mood(black_box(Mood::Neutral), black_box(&text)));
    });
}

fn bench_history(c: &mut Criterion) {
    let mut window = HistoryWindow::new();
    for i in 0..6 {
        window.append(Turn::Player(format!("line {i}")));
    }

    c.bench_function("history_append_full_window", |b| {
        b.iter(|| {
            window.append(black_box(Turn::Npc("Move along.".to_string())));
        });
    });

    c.bench_function("history_prompt_entries", |b| {
        b.iter(|| {
            let total: usize = window.prompt_entries(black_box(6)).map(|e| e.text.len()).sum();
            black_box(total)
        });
    });
}

fn bench_loader(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_and_sort");
    for size in [100usize, 1000] {
        let records: Vec<RawMessage> = (0..size).map(|i| make_raw(i, 20)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| loader::load(black_box(records.clone())));
        });
    }
    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let records: Vec<RawMessage> = (0..500).map(|i| make_raw(i, 20)).collect();
    let Ok(messages) = loader::load(records) else {
        return;
    };

    c.bench_function("replay_500_messages_20_players", |b| {
        b.iter(|| {
            let mut registry = PlayerRegistry::new();
            for message in &messages {
                let state = registry.get_or_create(&message.player_id);
                state.mood = next_mood(state.mood, &message.text);
                state.record_turn(message.text.as_str(), "Move along.");
            }
            black_box(registry.len())
        });
    });
}

criterion_group!(
    benches,
    bench_mood_transition,
    bench_history,
    bench_loader,
    bench_replay,
);
criterion_main!(benches);
