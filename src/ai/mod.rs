//! 싱글 플레이 AI 드라이버
//!
//! 엔진 바깥의 협력자로서 현재 상태를 읽고 무브를 고릅니다. 상태를 직접 바꾸지 않습니다.

use rand::{seq::SliceRandom, Rng};

use crate::{
    card::types::{InstanceId, PlayerSlot, TargetType},
    game::{
        moves::Move,
        phase::Phase,
        rules::RuleSet,
        state::MatchState,
        validation::{validate, ValidatedMove},
    },
};

/// 능력 하나에 대해 시도해볼 대상 후보
fn target_candidates(
    state: &MatchState,
    caster: PlayerSlot,
    source: InstanceId,
    target_type: TargetType,
) -> Vec<Option<InstanceId>> {
    match target_type {
        TargetType::Enemy | TargetType::Ally => state
            .player(target_type.target_side(caster))
            .alive_cards()
            .map(|c| Some(c.instance_id))
            .collect(),
        TargetType::SelfTarget => vec![Some(source)],
        TargetType::AllEnemies | TargetType::AllAllies => vec![None],
    }
}

/// 현재 플레이어가 둘 수 있는 모든 합법 무브. 항상 `EndTurn` 을 포함합니다.
pub fn enumerate_moves(state: &MatchState, rules: &RuleSet) -> Vec<Move> {
    if state.phase != Phase::Playing || state.is_over() {
        return vec![];
    }

    let slot = state.current_player;
    let mut moves = Vec::new();

    for card in state.player(slot).cards.iter().filter(|c| c.can_act()) {
        for (ability_index, ability) in card.abilities.iter().enumerate() {
            for target in target_candidates(state, slot, card.instance_id, ability.target_type) {
                let mv = Move::CastAbility {
                    source: card.instance_id,
                    target,
                    ability_index,
                };
                if validate(state, rules, slot, state.version, &mv).is_ok() {
                    moves.push(mv);
                }
            }
        }
    }

    moves.push(Move::EndTurn);
    moves
}

/// 대기 중인 능력으로 무작위 합법 대상을 고릅니다. 회복 능력은 다친 아군을 우선합니다.
/// 합법 대상이 없으면 `EndTurn` 을 돌려줍니다.
pub fn choose_move<R: Rng + ?Sized>(state: &MatchState, rules: &RuleSet, rng: &mut R) -> Move {
    let slot = state.current_player;
    let Some(pending) = state.pending else {
        return Move::EndTurn;
    };
    let Some(card) = state.find_card(pending.source_id) else {
        return Move::EndTurn;
    };
    let Some(ability) = card.abilities.get(pending.ability_index) else {
        return Move::EndTurn;
    };

    let legal: Vec<Move> = target_candidates(state, slot, pending.source_id, ability.target_type)
        .into_iter()
        .map(|target| Move::CastAbility {
            source: pending.source_id,
            target,
            ability_index: pending.ability_index,
        })
        .filter(|mv| {
            matches!(
                validate(state, rules, slot, state.version, mv),
                Ok(ValidatedMove::Cast(_))
            )
        })
        .collect();

    let preferred: Vec<&Move> = if ability.heal > 0 {
        legal
            .iter()
            .filter(|mv| match mv {
                Move::CastAbility {
                    target: Some(t), ..
                } => state
                    .find_card(*t)
                    .map(|c| c.current_health < c.max_health)
                    .unwrap_or(false),
                _ => false,
            })
            .collect()
    } else {
        vec![]
    };

    if let Some(mv) = preferred.choose(rng) {
        return (*mv).clone();
    }
    legal.choose(rng).cloned().unwrap_or(Move::EndTurn)
}
