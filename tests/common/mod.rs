#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix::{Actor, Context, Handler};
use rand::{rngs::StdRng, SeedableRng};
use toybox_battle::{
    ai,
    card::{
        template::CardTemplate,
        types::{InstanceId, PlayerSlot, TargetType},
        Ability,
    },
    env::{BattleSettings, CleanupSettings},
    game::{
        moves::{Move, MoveOutcome},
        rules::RuleSet,
        state::MatchState,
        MatchEngine,
    },
    sync::messages::SyncEvent,
};

// ============================================================
// 카드 템플릿
// ============================================================

pub fn template(name: &str, max_health: u32, abilities: Vec<Ability>) -> CardTemplate {
    CardTemplate {
        name: name.to_string(),
        display_asset: String::new(),
        max_health,
        attack: 10,
        defense: 5,
        speed: 5,
        abilities,
    }
}

/// 단일 적 대상 공격 능력 하나만 가진 카드
pub fn striker(name: &str, max_health: u32, damage: u32) -> CardTemplate {
    template(
        name,
        max_health,
        vec![Ability::new("Strike", TargetType::Enemy).damage(damage)],
    )
}

/// 대기 능력 강제 없이 자유롭게 시전할 수 있는 규칙
pub fn free_rules() -> RuleSet {
    RuleSet {
        enforce_pending_ability: false,
        ..RuleSet::default()
    }
}

// ============================================================
// 엔진 헬퍼
// ============================================================

/// 두 팀을 제출해 playing 단계로 들어간 엔진
pub fn engine_with_teams(
    seed: u64,
    rules: RuleSet,
    team0: Vec<CardTemplate>,
    team1: Vec<CardTemplate>,
) -> MatchEngine {
    let mut engine = MatchEngine::new(seed, rules);
    submit(&mut engine, PlayerSlot::Zero, Move::SetPlayerTeam { cards: team0 });
    submit(&mut engine, PlayerSlot::One, Move::SetPlayerTeam { cards: team1 });
    engine
}

/// 현재 버전으로 무브를 적용합니다. 거절되면 패닉합니다.
pub fn submit(engine: &mut MatchEngine, slot: PlayerSlot, mv: Move) -> MoveOutcome {
    let version = engine.version();
    engine
        .apply(slot, version, &mv)
        .unwrap_or_else(|e| panic!("{:?} from {} rejected: {}", mv, slot, e))
}

pub fn card_id(state: &MatchState, slot: PlayerSlot, index: usize) -> InstanceId {
    state.player(slot).cards[index].instance_id
}

pub fn cast(source: InstanceId, target: Option<InstanceId>, ability_index: usize) -> Move {
    Move::CastAbility {
        source,
        target,
        ability_index,
    }
}

/// 양쪽 좌석을 모두 AI 로 두고 매치를 끝까지 진행합니다.
/// 무브가 적용될 때마다 `observe` 가 적용 전/후 상태와 함께 호출됩니다.
pub fn play_ai_match<F>(seed: u64, rules: RuleSet, max_moves: usize, mut observe: F) -> MatchEngine
where
    F: FnMut(&MatchState, &Move, &MatchState),
{
    let mut engine = MatchEngine::new(seed, rules.clone());
    let mut rng = StdRng::seed_from_u64(seed ^ 0xA11CE);

    for slot in [PlayerSlot::Zero, PlayerSlot::One] {
        let before = engine.state().clone();
        let mv = Move::SetPlayerTeam { cards: vec![] };
        submit(&mut engine, slot, mv.clone());
        observe(&before, &mv, engine.state());
    }

    for _ in 0..max_moves {
        if engine.is_over() {
            break;
        }
        let slot = engine.state().current_player;
        let before = engine.state().clone();
        let mv = ai::choose_move(engine.state(), &rules, &mut rng);
        submit(&mut engine, slot, mv.clone());
        observe(&before, &mv, engine.state());
    }
    engine
}

// ============================================================
// 액터 테스트용 설정과 구독자
// ============================================================

pub fn fast_battle() -> BattleSettings {
    BattleSettings {
        turn_timeout_seconds: 0,
        disconnect_grace_seconds: 0,
        ai_move_delay_ms: 10,
        ..BattleSettings::default()
    }
}

pub fn cleanup() -> CleanupSettings {
    CleanupSettings::default()
}

/// 받은 SyncEvent 를 그대로 쌓아두는 구독자
pub struct Collector {
    pub events: Arc<Mutex<Vec<SyncEvent>>>,
}

impl Collector {
    pub fn new() -> (Self, Arc<Mutex<Vec<SyncEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: events.clone(),
            },
            events,
        )
    }
}

impl Actor for Collector {
    type Context = Context<Self>;
}

impl Handler<SyncEvent> for Collector {
    type Result = ();

    fn handle(&mut self, msg: SyncEvent, _ctx: &mut Self::Context) {
        self.events.lock().unwrap().push(msg);
    }
}

/// 지금까지 받은 스냅샷 버전들
pub fn snapshot_versions(events: &Arc<Mutex<Vec<SyncEvent>>>) -> Vec<u64> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            SyncEvent::Snapshot(s) => Some(s.version),
            _ => None,
        })
        .collect()
}

pub async fn settle(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}
