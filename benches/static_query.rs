//! Static Query Engine benchmarks.
//!
//! Run with: `cargo bench --bench static_query`
//!
//! Characteristics are recomputed from the whole battlefield on every query,
//! so these measure how that cost grows with board size and with the number
//! of lords in play.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use duel_engine::cards::{Card, CardDefinition, Subtype};
use duel_engine::core::{EngineConfig, GameState, PlayerId};
use duel_engine::effects::StaticEffect;
use duel_engine::game::GameSnapshot;
use duel_engine::statics::StaticQuery;

/// A board with `goblins` goblins and `lords` goblin lords on each side.
fn goblin_board(goblins: usize, lords: usize) -> GameState {
    let mut state = GameState::new(EngineConfig::default());
    let goblin = Arc::new(
        CardDefinition::creature("Goblin Piker", "{1}{R}".parse().unwrap(), 2, 1).with_subtype(Subtype::Goblin),
    );
    let lord = Arc::new(
        CardDefinition::creature("Goblin King", "{1}{R}{R}".parse().unwrap(), 2, 2)
            .with_subtype(Subtype::Goblin)
            .with_static(StaticEffect::lord(Subtype::Goblin, 1, 1)),
    );
    for player in PlayerId::both() {
        for _ in 0..goblins {
            let card = Card::new(state.alloc_id(), player, goblin.clone());
            state.put_onto_battlefield(card, player);
        }
        for _ in 0..lords {
            let card = Card::new(state.alloc_id(), player, lord.clone());
            state.put_onto_battlefield(card, player);
        }
    }
    state
}

// =============================================================================
// Characteristics
// =============================================================================

fn bench_characteristics_by_board_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("characteristics_board_size");

    for goblins in [4, 16, 64] {
        let state = goblin_board(goblins, 2);
        let permanents = state.all_permanents().count();
        group.throughput(Throughput::Elements(permanents as u64));
        group.bench_with_input(BenchmarkId::new("whole_board", goblins), &state, |b, state| {
            b.iter(|| {
                for perm in state.all_permanents() {
                    black_box(StaticQuery::characteristics(state, perm));
                }
            });
        });
    }

    group.finish();
}

fn bench_power_by_lord_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("power_lord_count");

    for lords in [0, 2, 8] {
        let state = goblin_board(8, lords);
        let Some(target) = state.players[PlayerId::new(0)].battlefield.first() else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("single_goblin", lords), &lords, |b, _| {
            b.iter(|| black_box(StaticQuery::power(&state, target)));
        });
    }

    group.finish();
}

// =============================================================================
// Snapshots
// =============================================================================

fn bench_snapshot(c: &mut Criterion) {
    let state = goblin_board(16, 2);
    c.bench_function("snapshot_for_player", |b| {
        b.iter(|| black_box(GameSnapshot::for_player(&state, PlayerId::new(0), 0)));
    });
}

criterion_group!(
    benches,
    bench_characteristics_by_board_size,
    bench_power_by_lord_count,
    bench_snapshot,
);
criterion_main!(benches);
