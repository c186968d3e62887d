//! 매치 하나를 소유하는 액터
//!
//! 매치 상태를 바꾸는 유일한 주체입니다. 모든 무브는 이 액터의 메일박스를 통해
//! 순서대로 하나씩 적용되고, 적용이 끝날 때마다 새 스냅샷이 모든 구독자에게 공개됩니다.
//! 턴 시간 초과, 연결 끊김 유예, AI 좌석 진행 같은 정책도 여기서 처리합니다.

use std::{collections::HashMap, time::Duration, time::Instant};

use actix::{Actor, ActorContext, AsyncContext, Context, Recipient, SpawnHandle};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    ai,
    card::types::PlayerSlot,
    env::{BattleSettings, CleanupSettings},
    exception::{GameError, MatchCorruption, MoveError},
    game::{
        determinism,
        moves::{Move, MoveOutcome, Termination, TerminationReason},
        phase::Phase,
        rules::RuleSet,
        MatchEngine,
    },
    metrics::{
        MATCHES_CORRUPTED_TOTAL, MATCHES_FINISHED_TOTAL, MATCH_DURATION_SECONDS,
        MOVES_APPLIED_TOTAL, MOVES_REJECTED_TOTAL, TURNS_SKIPPED_TOTAL,
    },
    server::registry::messages::MatchClosed,
    sync::{snapshots::MatchSnapshot, SyncHub},
};

pub mod handlers;
pub mod messages;

pub struct MatchActor {
    match_id: Uuid,
    engine: MatchEngine,
    hub: SyncHub,
    battle: BattleSettings,
    cleanup: CleanupSettings,
    /// 서버 AI 가 맡은 좌석
    ai_seat: Option<PlayerSlot>,
    ai_rng: StdRng,
    ai_timer: Option<SpawnHandle>,
    turn_timer: Option<SpawnHandle>,
    disconnect_timers: HashMap<PlayerSlot, SpawnHandle>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    started_at: Instant,
    last_activity: Instant,
    registry: Option<Recipient<MatchClosed>>,
}

impl MatchActor {
    pub fn new(
        match_id: Uuid,
        seed: u64,
        vs_ai: bool,
        battle: BattleSettings,
        cleanup: CleanupSettings,
        registry: Option<Recipient<MatchClosed>>,
    ) -> Self {
        let engine = MatchEngine::new(seed, RuleSet::from(&battle));
        let hub = SyncHub::new(MatchSnapshot::capture(match_id, engine.state()));
        let ai_seat = vs_ai.then_some(PlayerSlot::One);

        Self {
            match_id,
            engine,
            hub,
            battle,
            cleanup,
            ai_seat,
            ai_rng: determinism::ai_rng(seed, PlayerSlot::One),
            ai_timer: None,
            turn_timer: None,
            disconnect_timers: HashMap::new(),
            created_at: Utc::now(),
            finished_at: None,
            started_at: Instant::now(),
            last_activity: Instant::now(),
            registry,
        }
    }

    /// 무브를 엔진에 적용하고 결과를 공개합니다.
    fn submit(
        &mut self,
        slot: PlayerSlot,
        base_version: u64,
        mv: Move,
        ctx: &mut Context<Self>,
    ) -> Result<MoveOutcome, GameError> {
        match self.engine.apply(slot, base_version, &mv) {
            Ok(outcome) => {
                MOVES_APPLIED_TOTAL.with_label_values(&[outcome.kind]).inc();
                self.after_change(&outcome, ctx);
                Ok(outcome)
            }
            Err(MoveError::Rejected(rejection)) => {
                MOVES_REJECTED_TOTAL
                    .with_label_values(&[rejection.code().as_str()])
                    .inc();
                Err(rejection.into())
            }
            Err(MoveError::Corrupted(corruption)) => {
                self.abort(&corruption, ctx);
                Err(MoveError::Corrupted(corruption).into())
            }
        }
    }

    /// 외부 정책(연결 끊김, 시간 초과, 포기)에 의한 강제 패배
    fn forfeit(&mut self, loser: PlayerSlot, reason: TerminationReason, ctx: &mut Context<Self>) {
        match self.engine.force_leave(loser, reason) {
            Ok(Some(outcome)) => {
                info!(
                    "match {}: player {} forfeits ({})",
                    self.match_id,
                    loser,
                    reason.as_str()
                );
                MOVES_APPLIED_TOTAL.with_label_values(&[outcome.kind]).inc();
                self.after_change(&outcome, ctx);
            }
            Ok(None) => {}
            Err(MoveError::Corrupted(corruption)) => self.abort(&corruption, ctx),
            Err(MoveError::Rejected(rejection)) => {
                warn!(
                    "match {}: forfeit of player {} rejected: {}",
                    self.match_id, loser, rejection
                );
            }
        }
    }

    fn after_change(&mut self, outcome: &MoveOutcome, ctx: &mut Context<Self>) {
        self.last_activity = Instant::now();
        if outcome.skipped_turns > 0 {
            TURNS_SKIPPED_TOTAL.inc_by(u64::from(outcome.skipped_turns));
        }

        self.hub
            .publish(MatchSnapshot::capture(self.match_id, self.engine.state()));

        match outcome.terminated {
            Some(termination) => self.on_terminated(termination, ctx),
            None => {
                self.reschedule_turn_timer(ctx);
                self.schedule_ai_move(ctx);
            }
        }
    }

    fn on_terminated(&mut self, termination: Termination, ctx: &mut Context<Self>) {
        info!(
            "match {} finished: winner {:?}, reason {}",
            self.match_id,
            termination.winner.map(|w| w.as_str()),
            termination.reason.as_str()
        );
        MATCHES_FINISHED_TOTAL
            .with_label_values(&[termination.reason.as_str()])
            .inc();
        MATCH_DURATION_SECONDS.observe(self.started_at.elapsed().as_secs_f64());

        self.hub.announce_termination(termination);
        self.cancel_timers(ctx);
        self.finished_at = Some(Utc::now());

        ctx.run_later(
            Duration::from_secs(self.cleanup.finished_match_ttl_seconds),
            |act, ctx| {
                info!("match {}: finished match expired", act.match_id);
                ctx.stop();
            },
        );
    }

    fn abort(&mut self, corruption: &MatchCorruption, ctx: &mut Context<Self>) {
        error!("match {} aborted: {}", self.match_id, corruption);
        MATCHES_CORRUPTED_TOTAL.inc();
        self.hub.announce_abort(corruption.to_string());
        self.cancel_timers(ctx);
        ctx.stop();
    }

    fn cancel_timers(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.turn_timer.take() {
            ctx.cancel_future(handle);
        }
        if let Some(handle) = self.ai_timer.take() {
            ctx.cancel_future(handle);
        }
        for (_, handle) in self.disconnect_timers.drain() {
            ctx.cancel_future(handle);
        }
    }

    /// 현재 턴의 제한 시간을 다시 겁니다. 제한 시간 안에 버전이 바뀌지 않으면
    /// 현재 플레이어가 opponent_timeout 으로 패배합니다.
    fn reschedule_turn_timer(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.turn_timer.take() {
            ctx.cancel_future(handle);
        }
        if self.battle.turn_timeout_seconds == 0 || self.engine.state().phase != Phase::Playing {
            return;
        }

        let player = self.engine.state().current_player;
        let version = self.engine.version();
        let handle = ctx.run_later(
            Duration::from_secs(self.battle.turn_timeout_seconds),
            move |act, ctx| {
                act.turn_timer = None;
                if act.engine.version() != version {
                    return;
                }
                warn!(
                    "match {}: player {} timed out on turn {}",
                    act.match_id,
                    player,
                    act.engine.state().turn_number
                );
                act.forfeit(player, TerminationReason::OpponentTimeout, ctx);
            },
        );
        self.turn_timer = Some(handle);
    }

    /// AI 좌석의 차례라면 잠시 뒤 AI 무브를 예약합니다.
    fn schedule_ai_move(&mut self, ctx: &mut Context<Self>) {
        let Some(ai_seat) = self.ai_seat else {
            return;
        };
        let state = self.engine.state();
        if state.phase != Phase::Playing || state.current_player != ai_seat {
            return;
        }
        if let Some(handle) = self.ai_timer.take() {
            ctx.cancel_future(handle);
        }

        let version = self.engine.version();
        let handle = ctx.run_later(
            Duration::from_millis(self.battle.ai_move_delay_ms),
            move |act, ctx| {
                act.ai_timer = None;
                if act.engine.version() != version || act.engine.is_over() {
                    return;
                }
                let mv = ai::choose_move(act.engine.state(), act.engine.rules(), &mut act.ai_rng);
                if let Err(e) = act.submit(ai_seat, version, mv, ctx) {
                    warn!("match {}: AI move rejected ({}), ending turn", act.match_id, e);
                    if act.engine.version() == version {
                        if let Err(e) = act.submit(ai_seat, version, Move::EndTurn, ctx) {
                            error!("match {}: AI could not end its turn: {}", act.match_id, e);
                        }
                    }
                }
            },
        );
        self.ai_timer = Some(handle);
    }

    /// 좌석의 연결이 끊겼을 때. 유예 시간 안에 다시 붙지 않으면 패배 처리합니다.
    fn on_seat_disconnected(&mut self, seat: PlayerSlot, ctx: &mut Context<Self>) {
        if self.engine.is_over() || self.hub.seat_connected(seat) {
            return;
        }

        let grace = self.battle.disconnect_grace_seconds;
        if grace == 0 {
            self.forfeit(seat, TerminationReason::OpponentLeft, ctx);
            return;
        }

        info!(
            "match {}: seat {} disconnected, waiting {}s",
            self.match_id, seat, grace
        );
        let handle = ctx.run_later(Duration::from_secs(grace), move |act, ctx| {
            act.disconnect_timers.remove(&seat);
            if !act.hub.seat_connected(seat) {
                act.forfeit(seat, TerminationReason::OpponentLeft, ctx);
            }
        });
        if let Some(previous) = self.disconnect_timers.insert(seat, handle) {
            ctx.cancel_future(previous);
        }
    }

    fn check_idle(&mut self, ctx: &mut Context<Self>) {
        if self.finished_at.is_some() {
            return;
        }
        let idle = self.last_activity.elapsed();
        if idle > Duration::from_secs(self.cleanup.idle_match_ttl_seconds) {
            info!(
                "match {}: idle for {}s, closing",
                self.match_id,
                idle.as_secs()
            );
            self.hub.announce_abort("match closed after inactivity".into());
            ctx.stop();
        }
    }
}

impl Actor for MatchActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            "MatchActor {} started (seed {}, vs_ai {})",
            self.match_id,
            self.engine.state().seed,
            self.ai_seat.is_some()
        );

        ctx.run_interval(
            Duration::from_secs(self.cleanup.interval_seconds),
            |act, ctx| act.check_idle(ctx),
        );

        // AI 좌석은 시작하자마자 기본 덱을 제출합니다.
        if let Some(ai_seat) = self.ai_seat {
            let version = self.engine.version();
            let team = Move::SetPlayerTeam { cards: vec![] };
            if let Err(e) = self.submit(ai_seat, version, team, ctx) {
                error!("match {}: AI team submission failed: {}", self.match_id, e);
            }
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("MatchActor {} stopped", self.match_id);
        if let Some(registry) = &self.registry {
            registry.do_send(MatchClosed {
                match_id: self.match_id,
            });
        }
    }
}
