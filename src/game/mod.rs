//! 권위 있는 매치 코어
//!
//! 검증기, 효과 해석기, 턴/페이즈 상태 기계를 하나의 `MatchEngine` 으로 묶습니다.
//! 엔진은 I/O 를 하지 않으며, 하나의 매치에 대해 무브를 순서대로 하나씩 적용합니다.

pub mod determinism;
pub mod effects;
pub mod invariants;
pub mod moves;
pub mod phase;
pub mod rules;
pub mod state;
pub mod turn;
pub mod validation;

use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::{
    card::types::PlayerSlot,
    exception::{MatchCorruption, MoveError},
};

use moves::{Move, MoveOutcome, Termination, TerminationReason};
use rules::RuleSet;
use state::MatchState;
use validation::ValidatedMove;

pub struct MatchEngine {
    state: MatchState,
    rules: RuleSet,
    rng: StdRng,
    aborted: Option<MatchCorruption>,
}

impl MatchEngine {
    /// setup 단계의 새 매치를 만듭니다.
    pub fn new(seed: u64, rules: RuleSet) -> Self {
        Self::with_state(MatchState::new(seed), rules)
    }

    /// 이미 구성된 상태에서 엔진을 시작합니다. 난수 스트림은 상태의 시드에서 만들어집니다.
    pub fn with_state(state: MatchState, rules: RuleSet) -> Self {
        let rng = determinism::turn_rng(state.seed);
        Self {
            state,
            rules,
            rng,
            aborted: None,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn corruption(&self) -> Option<&MatchCorruption> {
        self.aborted.as_ref()
    }

    /// 무브 하나를 적용합니다. 검증 -> 해석 -> 턴 전이 -> 불변식 확인 순서로 진행되며
    /// 거절된 무브는 상태를 전혀 바꾸지 않습니다.
    pub fn apply(
        &mut self,
        acting: PlayerSlot,
        base_version: u64,
        mv: &Move,
    ) -> Result<MoveOutcome, MoveError> {
        if self.aborted.is_some() {
            return Err(MatchCorruption::MatchAborted.into());
        }

        let validated =
            match validation::validate(&self.state, &self.rules, acting, base_version, mv) {
                Ok(validated) => validated,
                Err(rejection) => {
                    debug!(
                        "rejected {} from player {}: {}",
                        mv.kind(),
                        acting,
                        rejection
                    );
                    return Err(rejection.into());
                }
            };

        let was_over = self.state.is_over();
        self.state.effects.clear();
        let result = self.execute(acting, validated);
        self.commit(mv.kind(), was_over, result)
    }

    /// 외부 정책(연결 끊김, 턴 시간 초과)에 의한 강제 패배. 버전 검사는 하지 않습니다.
    /// 이미 끝난 매치라면 `Ok(None)` 을 돌려줍니다.
    pub fn force_leave(
        &mut self,
        loser: PlayerSlot,
        reason: TerminationReason,
    ) -> Result<Option<MoveOutcome>, MoveError> {
        if self.aborted.is_some() {
            return Err(MatchCorruption::MatchAborted.into());
        }
        if self.state.is_over() {
            return Ok(None);
        }

        self.state.effects.clear();
        turn::force_win(&mut self.state, loser, reason);
        self.commit("forfeit", false, Ok(0)).map(Some)
    }

    fn execute(&mut self, acting: PlayerSlot, validated: ValidatedMove) -> Result<u32, MatchCorruption> {
        match validated {
            ValidatedMove::Team(cards) => {
                info!("player {} submitted a team of {}", acting, cards.len());
                let player = self.state.player_mut(acting);
                player.roster = cards.iter().map(|c| c.instance_id).collect();
                player.cards = cards;
                player.ready = true;

                if self.state.players.iter().all(|p| p.ready) {
                    return turn::enter_playing(&mut self.state, &self.rules, &mut self.rng);
                }
                Ok(0)
            }
            ValidatedMove::Cast(plan) => {
                effects::resolve(&mut self.state, &plan)?;
                if turn::check_winner(&mut self.state).is_some() {
                    return Ok(0);
                }
                turn::end_turn(&mut self.state, &self.rules, &mut self.rng)
            }
            ValidatedMove::EndTurn => turn::end_turn(&mut self.state, &self.rules, &mut self.rng),
            ValidatedMove::Leave => {
                turn::force_win(&mut self.state, acting, TerminationReason::OpponentLeft);
                Ok(0)
            }
        }
    }

    fn commit(
        &mut self,
        kind: &'static str,
        was_over: bool,
        result: Result<u32, MatchCorruption>,
    ) -> Result<MoveOutcome, MoveError> {
        self.state.version += 1;

        let checked = result.and_then(|skipped| {
            invariants::check(&self.state)?;
            Ok(skipped)
        });

        match checked {
            Ok(skipped_turns) => {
                let terminated: Option<Termination> = if !was_over && self.state.is_over() {
                    self.state.termination
                } else {
                    None
                };
                debug!(
                    "applied {} -> version {} (turn {}, player {})",
                    kind, self.state.version, self.state.turn_number, self.state.current_player
                );
                Ok(MoveOutcome {
                    version: self.state.version,
                    kind,
                    terminated,
                    skipped_turns,
                })
            }
            Err(corruption) => {
                error!(
                    "match state corrupted after {} (version {}): {}",
                    kind, self.state.version, corruption
                );
                self.aborted = Some(corruption.clone());
                Err(corruption.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::types::{InstanceId, TargetType},
        exception::{Rejection, RejectionCode},
    };
    use phase::Phase;

    fn submit_defaults(engine: &mut MatchEngine) {
        let team = Move::SetPlayerTeam { cards: vec![] };
        let v = engine.version();
        engine.apply(PlayerSlot::One, v, &team).unwrap();
        let v = engine.version();
        engine.apply(PlayerSlot::Zero, v, &team).unwrap();
    }

    #[test]
    fn both_teams_start_the_battle() {
        let mut engine = MatchEngine::new(3, RuleSet::default());
        submit_defaults(&mut engine);
        let state = engine.state();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.version, 2);
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.current_player, PlayerSlot::Zero);
        assert!(state.pending.is_some());
    }

    #[test]
    fn rejection_leaves_state_untouched() {
        let mut engine = MatchEngine::new(3, RuleSet::default());
        submit_defaults(&mut engine);
        let before = engine.state().clone();

        let err = engine.apply(PlayerSlot::One, 2, &Move::EndTurn).unwrap_err();
        assert_eq!(
            err,
            MoveError::Rejected(Rejection::NotYourTurn {
                current: PlayerSlot::Zero
            })
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn pending_cast_consumes_the_turn() {
        let mut engine = MatchEngine::new(3, RuleSet::default());
        submit_defaults(&mut engine);

        let pending = engine.state().pending.unwrap();
        let ability = engine.state().find_card(pending.source_id).unwrap().abilities
            [pending.ability_index]
            .clone();
        let side = ability.target_type.target_side(PlayerSlot::Zero);
        let target = match ability.target_type {
            TargetType::Enemy | TargetType::Ally => {
                Some(engine.state().player(side).cards[0].instance_id)
            }
            _ => None,
        };

        let outcome = engine
            .apply(
                PlayerSlot::Zero,
                2,
                &Move::CastAbility {
                    source: pending.source_id,
                    target,
                    ability_index: pending.ability_index,
                },
            )
            .unwrap();
        assert_eq!(outcome.version, 3);
        assert_eq!(engine.state().current_player, PlayerSlot::One);
        assert_eq!(engine.state().turn_number, 2);
        assert!(!engine.state().effects.is_empty());
    }

    #[test]
    fn leaving_hands_the_win_to_the_opponent() {
        let mut engine = MatchEngine::new(3, RuleSet::default());
        let outcome = engine.apply(PlayerSlot::Zero, 0, &Move::LeaveMatch).unwrap();
        let t = outcome.terminated.unwrap();
        assert_eq!(t.winner, Some(PlayerSlot::One));
        assert_eq!(t.reason, TerminationReason::OpponentLeft);

        let err = engine
            .apply(PlayerSlot::One, outcome.version, &Move::EndTurn)
            .unwrap_err();
        match err {
            MoveError::Rejected(r) => assert_eq!(r.code(), RejectionCode::WrongPhase),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            engine.force_leave(PlayerSlot::One, TerminationReason::OpponentTimeout),
            Ok(None)
        );
    }

    #[test]
    fn corruption_aborts_only_this_engine() {
        let mut broken = MatchState::new(1);
        broken.winner = Some(PlayerSlot::Zero);
        let mut engine = MatchEngine::with_state(broken, RuleSet::default());

        let err = engine.apply(PlayerSlot::Zero, 0, &Move::LeaveMatch);
        // winner 가 이미 있으므로 검증 단계에서 거절됩니다.
        assert!(matches!(err, Err(MoveError::Rejected(_))));

        let mut broken = MatchState::new(1);
        broken.players[1].roster.push(InstanceId::from(uuid::Uuid::nil()));
        let mut engine = MatchEngine::with_state(broken, RuleSet::default());
        let err = engine
            .apply(PlayerSlot::Zero, 0, &Move::SetPlayerTeam { cards: vec![] })
            .unwrap_err();
        assert!(matches!(err, MoveError::Corrupted(_)));
        assert!(engine.corruption().is_some());

        let err = engine.apply(PlayerSlot::One, 1, &Move::LeaveMatch).unwrap_err();
        assert_eq!(err, MoveError::Corrupted(MatchCorruption::MatchAborted));

        let healthy = MatchEngine::new(1, RuleSet::default());
        assert!(healthy.corruption().is_none());
    }
}
