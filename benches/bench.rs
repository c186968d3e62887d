use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use toybox_battle::{
    ai,
    card::types::PlayerSlot,
    game::{moves::Move, rules::RuleSet, MatchEngine},
    sync::snapshots::MatchSnapshot,
};
use uuid::Uuid;

/// 기본 덱끼리 AI 대 AI 로 끝까지 진행합니다.
fn play_full_match(seed: u64, rules: &RuleSet) -> MatchEngine {
    let mut engine = MatchEngine::new(seed, rules.clone());
    let mut rng = StdRng::seed_from_u64(seed);

    for slot in PlayerSlot::ALL {
        let version = engine.version();
        engine
            .apply(slot, version, &Move::SetPlayerTeam { cards: vec![] })
            .expect("default deck is accepted");
    }

    for _ in 0..500 {
        if engine.is_over() {
            break;
        }
        let slot = engine.state().current_player;
        let version = engine.version();
        let mv = ai::choose_move(engine.state(), rules, &mut rng);
        if engine.apply(slot, version, &mv).is_err() {
            break;
        }
    }
    engine
}

fn bench_full_match(c: &mut Criterion) {
    let rules = RuleSet::default();
    let mut seed = 0u64;
    c.bench_function("ai_vs_ai_full_match", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(play_full_match(seed, &rules));
        })
    });
}

fn bench_snapshot_capture(c: &mut Criterion) {
    let engine = play_full_match(7, &RuleSet::default());
    let match_id = Uuid::new_v4();
    c.bench_function("snapshot_capture", |b| {
        b.iter(|| black_box(MatchSnapshot::capture(match_id, engine.state())))
    });
}

criterion_group!(benches, bench_full_match, bench_snapshot_capture);
criterion_main!(benches);
