//! turn.rs
//!
//! 턴/페이즈 상태 기계. 페이즈 전이, 턴 소유권 순환, 턴 시작/종료 처리, 승리 판정을 담당합니다.

use rand::{rngs::StdRng, Rng};
use tracing::{debug, info};

use crate::{
    card::{types::PlayerSlot, Card},
    exception::MatchCorruption,
};

use super::{
    effects::{EffectRecord, SkipReason},
    moves::{Termination, TerminationReason},
    phase::Phase,
    rules::RuleSet,
    state::{MatchState, PendingAbility, PlayerState},
};

/// 한 번의 무브 처리 중 연속으로 건너뛸 수 있는 턴의 상한.
/// 빙결은 최대 2턴이므로 정상적인 매치는 이 값에 닿지 않습니다.
pub const MAX_CONSECUTIVE_SKIPS: u32 = 16;

/// 시전 가능한 능력 인덱스 목록
fn castable_abilities(card: &Card, rules: &RuleSet) -> Vec<usize> {
    (0..card.abilities.len())
        .filter(|&i| !rules.once_per_match() || !card.ability_used(i))
        .collect()
}

/// 얼어있는지와 상관없이 앞으로 시전할 수 있는 능력이 남아있는지
fn has_castable(player: &PlayerState, rules: &RuleSet) -> bool {
    player
        .alive_cards()
        .any(|c| !castable_abilities(c, rules).is_empty())
}

fn transition(state: &mut MatchState, next: Phase, forced: bool) {
    debug_assert!(state.phase.can_transition_to(next, forced));
    info!("phase {} -> {}", state.phase, next);
    state.phase = next;
}

/// 매치를 끝냅니다. 이미 끝난 매치라면 아무것도 하지 않습니다.
fn terminate(state: &mut MatchState, termination: Termination, forced: bool) -> Option<Termination> {
    if state.is_over() {
        return None;
    }
    transition(state, Phase::GameOver, forced);
    state.winner = termination.winner;
    state.termination = Some(termination);
    state.pending = None;
    info!(
        "match over: winner={:?} reason={}",
        termination.winner.map(|w| w.as_str()),
        termination.reason.as_str()
    );
    Some(termination)
}

/// 양쪽이 모두 준비되면 호출됩니다. 첫 턴은 항상 0번 좌석입니다.
pub fn enter_playing(
    state: &mut MatchState,
    rules: &RuleSet,
    rng: &mut StdRng,
) -> Result<u32, MatchCorruption> {
    transition(state, Phase::Playing, false);
    state.turn_number = 1;
    state.current_player = PlayerSlot::Zero;
    begin_turn(state, rules, rng)
}

/// 턴 시작 처리. 빙결 카운트다운 후 현재 플레이어의 카드와 능력을 무작위로 뽑습니다.
///
/// 행동할 카드가 없으면 턴을 자동으로 넘기고 `TurnSkipped` 를 출력 큐에 남깁니다.
/// 건너뛴 턴 수를 돌려줍니다.
pub fn begin_turn(
    state: &mut MatchState,
    rules: &RuleSet,
    rng: &mut StdRng,
) -> Result<u32, MatchCorruption> {
    let mut skipped = 0;

    loop {
        let slot = state.current_player;

        for card in state.player_mut(slot).cards.iter_mut() {
            card.frozen_turns = card.frozen_turns.saturating_sub(1);
        }

        let candidates: Vec<(usize, Vec<usize>)> = state
            .player(slot)
            .cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.can_act())
            .map(|(i, c)| (i, castable_abilities(c, rules)))
            .filter(|(_, abilities)| !abilities.is_empty())
            .collect();

        if !candidates.is_empty() {
            let (card_idx, abilities) = &candidates[rng.gen_range(0..candidates.len())];
            let ability_index = abilities[rng.gen_range(0..abilities.len())];
            let card = &state.player(slot).cards[*card_idx];
            let source_id = card.instance_id;
            debug!(
                "turn {} begins for player {}: pending '{}' of {}",
                state.turn_number, slot, card.abilities[ability_index].name, card.name
            );
            state.pending = Some(PendingAbility {
                source_id,
                ability_index,
            });
            return Ok(skipped);
        }

        if !has_castable(state.player(slot), rules) && !has_castable(state.player(slot.other()), rules)
        {
            terminate(
                state,
                Termination {
                    winner: None,
                    reason: TerminationReason::Stalemate,
                },
                false,
            );
            return Ok(skipped);
        }

        let reason = if state.player(slot).cards.iter().any(|c| c.can_act()) {
            SkipReason::Exhausted
        } else {
            SkipReason::AllFrozen
        };
        info!(
            "player {} has no action on turn {}, skipping ({:?})",
            slot, state.turn_number, reason
        );
        state.effects.push(EffectRecord::TurnSkipped {
            player: slot,
            reason,
            turn_number: state.turn_number,
        });

        skipped += 1;
        if skipped > MAX_CONSECUTIVE_SKIPS {
            return Err(MatchCorruption::TurnLoopDiverged(skipped));
        }
        finish_turn(state);
    }
}

/// 턴 종료 처리: 현재 플레이어의 버프 감소, 턴 소유권 이동, 턴 번호 증가
fn finish_turn(state: &mut MatchState) {
    let slot = state.current_player;
    let mut expired = Vec::new();
    let player = state.player_mut(slot);
    player.buffs.retain_mut(|buff| {
        buff.remaining_turns = buff.remaining_turns.saturating_sub(1);
        if buff.remaining_turns == 0 {
            expired.push(buff.ability_name.clone());
            false
        } else {
            true
        }
    });
    for ability_name in expired {
        state.effects.push(EffectRecord::BuffExpired {
            player: slot,
            ability_name,
        });
    }

    state.pending = None;
    state.current_player = slot.other();
    state.turn_number += 1;
}

/// 명시적 endTurn 혹은 능력 해석 후 호출됩니다.
pub fn end_turn(
    state: &mut MatchState,
    rules: &RuleSet,
    rng: &mut StdRng,
) -> Result<u32, MatchCorruption> {
    finish_turn(state);
    begin_turn(state, rules, rng)
}

/// 승리 조건 확인. 한 번 정해진 승자는 바뀌지 않습니다.
pub fn check_winner(state: &mut MatchState) -> Option<Termination> {
    if state.is_over() || state.phase != Phase::Playing || state.turn_number == 0 {
        return None;
    }
    let loser = PlayerSlot::ALL
        .into_iter()
        .find(|slot| !state.player(*slot).has_alive_card())?;
    terminate(
        state,
        Termination {
            winner: Some(loser.other()),
            reason: TerminationReason::Normal,
        },
        false,
    )
}

/// 이탈/시간 초과 등으로 상대에게 강제 승리를 줍니다.
pub fn force_win(
    state: &mut MatchState,
    loser: PlayerSlot,
    reason: TerminationReason,
) -> Option<Termination> {
    terminate(
        state,
        Termination {
            winner: Some(loser.other()),
            reason,
        },
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::{
            template::{instantiate_card, CardTemplate},
            types::TargetType,
            Ability,
        },
        game::{determinism::turn_rng, rules::AbilityUsePolicy, state::TimedBuff},
    };

    fn ready_state(cards_per_side: usize) -> MatchState {
        let mut state = MatchState::new(21);
        let t = CardTemplate {
            name: "Tin".into(),
            display_asset: String::new(),
            max_health: 50,
            attack: 0,
            defense: 0,
            speed: 0,
            abilities: vec![
                Ability::new("Poke", TargetType::Enemy).damage(5),
                Ability::new("Hum", TargetType::SelfTarget).buff(1, 1),
            ],
        };
        for slot in PlayerSlot::ALL {
            let cards: Vec<Card> = (0..cards_per_side)
                .map(|i| instantiate_card(&t, slot, i, 21).unwrap())
                .collect();
            let p = state.player_mut(slot);
            p.roster = cards.iter().map(|c| c.instance_id).collect();
            p.cards = cards;
            p.ready = true;
        }
        state
    }

    #[test]
    fn entering_playing_starts_with_slot_zero() {
        let mut state = ready_state(2);
        let mut rng = turn_rng(1);
        let skipped = enter_playing(&mut state, &RuleSet::default(), &mut rng).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.current_player, PlayerSlot::Zero);
        let pending = state.pending.unwrap();
        assert_eq!(
            state.find_card(pending.source_id).unwrap().owner,
            PlayerSlot::Zero
        );
    }

    #[test]
    fn end_turn_alternates_and_counts() {
        let mut state = ready_state(1);
        let rules = RuleSet::default();
        let mut rng = turn_rng(1);
        enter_playing(&mut state, &rules, &mut rng).unwrap();
        for expected in 2..6u32 {
            let before = state.current_player;
            end_turn(&mut state, &rules, &mut rng).unwrap();
            assert_eq!(state.current_player, before.other());
            assert_eq!(state.turn_number, expected);
        }
    }

    #[test]
    fn frozen_roster_is_skipped() {
        let mut state = ready_state(1);
        let rules = RuleSet::default();
        let mut rng = turn_rng(1);
        enter_playing(&mut state, &rules, &mut rng).unwrap();
        state.player_mut(PlayerSlot::One).cards[0].frozen_turns = 2;

        let skipped = end_turn(&mut state, &rules, &mut rng).unwrap();

        assert_eq!(skipped, 1);
        assert_eq!(state.player(PlayerSlot::One).cards[0].frozen_turns, 1);
        assert_eq!(state.current_player, PlayerSlot::Zero);
        assert_eq!(state.turn_number, 3);
        assert!(state.effects.iter().any(|e| matches!(
            e,
            EffectRecord::TurnSkipped {
                player: PlayerSlot::One,
                reason: SkipReason::AllFrozen,
                ..
            }
        )));
    }

    #[test]
    fn buffs_decay_at_owner_turn_end() {
        let mut state = ready_state(1);
        let rules = RuleSet::default();
        let mut rng = turn_rng(1);
        enter_playing(&mut state, &rules, &mut rng).unwrap();
        let source_id = state.player(PlayerSlot::Zero).cards[0].instance_id;
        state.player_mut(PlayerSlot::Zero).buffs.push(TimedBuff {
            source_id,
            ability_name: "Hum".into(),
            amount: 3,
            remaining_turns: 2,
        });

        end_turn(&mut state, &rules, &mut rng).unwrap();
        assert_eq!(state.player(PlayerSlot::Zero).buffs[0].remaining_turns, 1);

        // 상대 턴 종료는 0번 좌석 버프에 영향이 없습니다.
        end_turn(&mut state, &rules, &mut rng).unwrap();
        assert_eq!(state.player(PlayerSlot::Zero).buffs.len(), 1);

        end_turn(&mut state, &rules, &mut rng).unwrap();
        assert!(state.player(PlayerSlot::Zero).buffs.is_empty());
    }

    #[test]
    fn winner_is_set_once() {
        let mut state = ready_state(1);
        let rules = RuleSet::default();
        let mut rng = turn_rng(1);
        enter_playing(&mut state, &rules, &mut rng).unwrap();

        let mut dead = state.player_mut(PlayerSlot::Zero).cards.remove(0);
        dead.current_health = 0;
        state.player_mut(PlayerSlot::Zero).graveyard.push(dead);

        let t = check_winner(&mut state).unwrap();
        assert_eq!(t.winner, Some(PlayerSlot::One));
        assert_eq!(state.phase, Phase::GameOver);

        assert!(check_winner(&mut state).is_none());
        assert!(force_win(&mut state, PlayerSlot::One, TerminationReason::OpponentLeft).is_none());
        assert_eq!(state.winner, Some(PlayerSlot::One));
    }

    #[test]
    fn no_winner_during_setup() {
        let mut state = ready_state(0);
        assert!(check_winner(&mut state).is_none());
        assert_eq!(state.phase, Phase::Setup);
    }

    #[test]
    fn exhausted_players_end_in_stalemate() {
        let mut state = ready_state(1);
        let rules = RuleSet {
            ability_use_policy: AbilityUsePolicy::OncePerMatch,
            ..RuleSet::default()
        };
        for slot in PlayerSlot::ALL {
            state.player_mut(slot).cards[0].ability_uses = vec![1, 1];
        }
        let mut rng = turn_rng(1);
        enter_playing(&mut state, &rules, &mut rng).unwrap();

        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.winner, None);
        assert_eq!(
            state.termination.map(|t| t.reason),
            Some(TerminationReason::Stalemate)
        );
    }
}
