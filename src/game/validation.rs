//! validation.rs
//!
//! 무브 검증기. 상태를 읽기만 하며, 거절 시 상태는 그대로 유지됩니다.

use crate::{
    card::{
        catalog::default_deck_for,
        template::{instantiate_card, CardTemplate},
        types::{InstanceId, PlayerSlot, TargetType},
        Card,
    },
    exception::Rejection,
};

use super::{moves::Move, phase::Phase, rules::RuleSet, state::MatchState};

/// 검증을 통과한 능력 시전 계획. 대상 목록은 시전 시점의 고정 스냅샷입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastPlan {
    pub caster: PlayerSlot,
    pub source: InstanceId,
    pub ability_index: usize,
    pub targets: Vec<InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedMove {
    Team(Vec<Card>),
    Cast(CastPlan),
    EndTurn,
    Leave,
}

/// 무브를 검증합니다.
///
/// 검사 순서: 버전 -> 페이즈 -> 턴 소유권 -> 원본 카드 -> 능력 -> 대기 능력 -> 대상 -> 사용 횟수
pub fn validate(
    state: &MatchState,
    rules: &RuleSet,
    acting: PlayerSlot,
    base_version: u64,
    mv: &Move,
) -> Result<ValidatedMove, Rejection> {
    if base_version != state.version {
        return Err(Rejection::StaleVersion {
            submitted: base_version,
            current: state.version,
        });
    }

    check_phase(state, mv)?;

    match mv {
        Move::SetPlayerTeam { cards } => validate_team(state, rules, acting, cards),
        Move::CastAbility {
            source,
            target,
            ability_index,
        } => {
            check_turn(state, acting)?;
            validate_cast(state, rules, acting, *source, *target, *ability_index)
                .map(ValidatedMove::Cast)
        }
        Move::EndTurn => {
            check_turn(state, acting)?;
            Ok(ValidatedMove::EndTurn)
        }
        Move::LeaveMatch => Ok(ValidatedMove::Leave),
    }
}

fn check_phase(state: &MatchState, mv: &Move) -> Result<(), Rejection> {
    let allowed = if state.winner.is_some() || state.is_over() {
        false
    } else {
        match mv {
            Move::SetPlayerTeam { .. } => state.phase == Phase::Setup,
            Move::CastAbility { .. } | Move::EndTurn => state.phase == Phase::Playing,
            Move::LeaveMatch => true,
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(Rejection::WrongPhase {
            phase: state.phase,
            action: mv.kind(),
        })
    }
}

fn check_turn(state: &MatchState, acting: PlayerSlot) -> Result<(), Rejection> {
    if acting != state.current_player {
        return Err(Rejection::NotYourTurn {
            current: state.current_player,
        });
    }
    Ok(())
}

fn validate_team(
    state: &MatchState,
    rules: &RuleSet,
    acting: PlayerSlot,
    cards: &[CardTemplate],
) -> Result<ValidatedMove, Rejection> {
    // setup 은 동시 진행이므로 턴 검사 대신 준비 여부만 확인합니다.
    if state.player(acting).ready {
        return Err(Rejection::AlreadyReady(acting));
    }

    let templates = if cards.is_empty() {
        default_deck_for(acting)
    } else {
        cards
    };

    if templates.len() > rules.max_team_size {
        return Err(Rejection::InvalidTeam(format!(
            "team has {} cards, at most {} allowed",
            templates.len(),
            rules.max_team_size
        )));
    }

    let roster = templates
        .iter()
        .enumerate()
        .map(|(idx, t)| instantiate_card(t, acting, idx, state.seed))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedMove::Team(roster))
}

fn validate_cast(
    state: &MatchState,
    rules: &RuleSet,
    acting: PlayerSlot,
    source: InstanceId,
    target: Option<InstanceId>,
    ability_index: usize,
) -> Result<CastPlan, Rejection> {
    // 원본 카드
    let card = state
        .find_card(source)
        .ok_or(Rejection::UnknownInstanceId(source))?;
    if card.owner != acting {
        return Err(Rejection::NotYourCard(source));
    }
    if !card.can_act() || state.locate_active(source).is_none() {
        return Err(Rejection::DeadOrFrozenSource(source));
    }

    // 능력
    let ability = card
        .abilities
        .get(ability_index)
        .ok_or(Rejection::UnknownAbility {
            card: source,
            index: ability_index,
        })?;

    if rules.enforce_pending_ability {
        match state.pending {
            Some(p) if p.source_id == source && p.ability_index == ability_index => {}
            _ => return Err(Rejection::NotPendingAbility),
        }
    }

    // 대상
    let side = ability.target_type.target_side(acting);
    let targets = match ability.target_type {
        TargetType::Enemy | TargetType::Ally => {
            let target_id = target.ok_or_else(|| {
                Rejection::InvalidTarget(format!("'{}' requires a target", ability.name))
            })?;
            let target_card = state
                .find_card(target_id)
                .ok_or(Rejection::UnknownInstanceId(target_id))?;
            if target_card.owner != side {
                return Err(Rejection::InvalidTarget(format!(
                    "'{}' must target player {}'s roster",
                    ability.name, side
                )));
            }
            if !target_card.is_alive() {
                return Err(Rejection::InvalidTarget(format!(
                    "target {} is not alive",
                    target_id
                )));
            }
            vec![target_id]
        }
        TargetType::SelfTarget => match target {
            None => vec![source],
            Some(t) if t == source => vec![source],
            Some(t) => {
                return Err(Rejection::InvalidTarget(format!(
                    "'{}' can only target its caster, got {}",
                    ability.name, t
                )))
            }
        },
        TargetType::AllEnemies | TargetType::AllAllies => {
            let snapshot: Vec<InstanceId> = state
                .player(side)
                .alive_cards()
                .map(|c| c.instance_id)
                .collect();
            if snapshot.is_empty() {
                return Err(Rejection::InvalidTarget(format!(
                    "player {} has no living cards",
                    side
                )));
            }
            snapshot
        }
    };

    // 사용 횟수
    if rules.once_per_match() && card.ability_used(ability_index) {
        return Err(Rejection::AbilityExhausted {
            card: source,
            index: ability_index,
        });
    }

    Ok(CastPlan {
        caster: acting,
        source,
        ability_index,
        targets,
    })
}
