mod common;

use toybox_battle::{
    card::{
        types::{PlayerSlot, TargetType},
        Ability,
    },
    exception::{MoveError, Rejection},
    game::{
        effects::{EffectRecord, SkipReason},
        moves::{Move, TerminationReason},
        phase::Phase,
        rules::RuleSet,
        MatchEngine,
    },
};

use common::*;

// ============================================================
// 첫 공격 (1장 대 1장)
// ============================================================

#[cfg(test)]
mod first_strike_tests {
    use super::*;

    #[test]
    fn first_player_hits_for_thirty() {
        let mut engine = engine_with_teams(
            1,
            RuleSet::default(),
            vec![striker("Bot", 100, 30)],
            vec![striker("Rex", 100, 30)],
        );
        assert_eq!(engine.state().phase, Phase::Playing);
        assert_eq!(engine.state().current_player, PlayerSlot::Zero);
        assert_eq!(engine.state().turn_number, 1);

        let source = card_id(engine.state(), PlayerSlot::Zero, 0);
        let target = card_id(engine.state(), PlayerSlot::One, 0);
        submit(&mut engine, PlayerSlot::Zero, cast(source, Some(target), 0));

        let state = engine.state();
        assert_eq!(state.player(PlayerSlot::One).cards[0].current_health, 70);
        assert_eq!(state.current_player, PlayerSlot::One);
        assert_eq!(state.turn_number, 2);
    }
}

// ============================================================
// 보호막 흡수
// ============================================================

#[cfg(test)]
mod shield_tests {
    use super::*;

    #[test]
    fn shield_absorbs_first_then_health() {
        let engine = engine_with_teams(
            2,
            RuleSet::default(),
            vec![striker("Bot", 100, 25)],
            vec![striker("Rex", 100, 25)],
        );
        let mut state = engine.state().clone();
        state.players[1].cards[0].shields = 10;
        let mut engine = MatchEngine::with_state(state, RuleSet::default());

        let source = card_id(engine.state(), PlayerSlot::Zero, 0);
        let target = card_id(engine.state(), PlayerSlot::One, 0);
        submit(&mut engine, PlayerSlot::Zero, cast(source, Some(target), 0));

        let hit = &engine.state().player(PlayerSlot::One).cards[0];
        assert_eq!(hit.shields, 0);
        assert_eq!(hit.current_health, 85);
    }
}

// ============================================================
// 사망과 묘지 이동
// ============================================================

#[cfg(test)]
mod death_tests {
    use super::*;

    #[test]
    fn lethal_hit_moves_card_to_graveyard_and_out_of_area_targets() {
        let sniper = template(
            "Sniper",
            100,
            vec![
                Ability::new("Snipe", TargetType::Enemy).damage(20),
                Ability::new("Quake", TargetType::AllEnemies).damage(5),
            ],
        );
        let mut engine = engine_with_teams(
            3,
            free_rules(),
            vec![sniper],
            vec![striker("Weak", 20, 1), striker("Tank", 100, 1)],
        );
        let source = card_id(engine.state(), PlayerSlot::Zero, 0);
        let weak = card_id(engine.state(), PlayerSlot::One, 0);
        let tank = card_id(engine.state(), PlayerSlot::One, 1);

        submit(&mut engine, PlayerSlot::Zero, cast(source, Some(weak), 0));

        let defender = engine.state().player(PlayerSlot::One);
        assert!(defender.cards.iter().all(|c| c.instance_id != weak));
        assert_eq!(defender.graveyard.len(), 1);
        assert_eq!(defender.graveyard[0].instance_id, weak);
        assert_eq!(defender.graveyard[0].current_health, 0);
        assert!(engine.state().effects.iter().any(|e| matches!(
            e,
            EffectRecord::Death { instance_id, owner: PlayerSlot::One } if *instance_id == weak
        )));

        submit(&mut engine, PlayerSlot::One, Move::EndTurn);
        submit(&mut engine, PlayerSlot::Zero, cast(source, None, 1));

        let quake = engine
            .state()
            .effects
            .iter()
            .find_map(|e| match e {
                EffectRecord::Ability(resolved) => Some(resolved.clone()),
                _ => None,
            })
            .expect("area ability recorded");
        assert_eq!(quake.target_ids, vec![tank]);
        assert_eq!(
            engine.state().player(PlayerSlot::One).cards[0].current_health,
            95
        );
    }
}

// ============================================================
// 빙결로 인한 턴 건너뛰기
// ============================================================

#[cfg(test)]
mod freeze_skip_tests {
    use super::*;

    #[test]
    fn frozen_roster_skips_its_turn() {
        let frost = template(
            "Frost",
            100,
            vec![Ability::new("Chill", TargetType::Enemy).freeze()],
        );
        let mut engine = engine_with_teams(
            4,
            RuleSet::default(),
            vec![frost],
            vec![striker("Rex", 100, 10)],
        );
        let source = card_id(engine.state(), PlayerSlot::Zero, 0);
        let target = card_id(engine.state(), PlayerSlot::One, 0);

        let outcome = submit(&mut engine, PlayerSlot::Zero, cast(source, Some(target), 0));

        let state = engine.state();
        let frozen = &state.player(PlayerSlot::One).cards[0];
        assert_eq!(frozen.frozen_turns, 1);
        assert!(frozen.is_frozen());
        assert_eq!(outcome.skipped_turns, 1);
        assert_eq!(state.current_player, PlayerSlot::Zero);
        assert_eq!(state.turn_number, 3);
        assert!(state.effects.contains(&EffectRecord::TurnSkipped {
            player: PlayerSlot::One,
            reason: SkipReason::AllFrozen,
            turn_number: 2,
        }));

        // 다음 차례에는 빙결이 풀리고 정상적으로 행동합니다.
        submit(&mut engine, PlayerSlot::Zero, Move::EndTurn);
        let state = engine.state();
        assert_eq!(state.current_player, PlayerSlot::One);
        assert_eq!(state.turn_number, 4);
        assert!(!state.player(PlayerSlot::One).cards[0].is_frozen());
        assert_eq!(state.pending.map(|p| p.source_id), Some(target));
    }
}

// ============================================================
// 팀 중복 제출
// ============================================================

#[cfg(test)]
mod team_submission_tests {
    use super::*;

    #[test]
    fn second_submission_is_rejected_and_roster_kept() {
        let mut engine = MatchEngine::new(5, RuleSet::default());
        submit(
            &mut engine,
            PlayerSlot::Zero,
            Move::SetPlayerTeam {
                cards: vec![striker("First", 100, 10)],
            },
        );
        let before = engine.state().clone();

        let err = engine
            .apply(
                PlayerSlot::Zero,
                engine.version(),
                &Move::SetPlayerTeam {
                    cards: vec![striker("Second", 50, 5), striker("Third", 50, 5)],
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            MoveError::Rejected(Rejection::AlreadyReady(PlayerSlot::Zero))
        ));
        assert_eq!(engine.state(), &before);
        let names: Vec<&str> = engine
            .state()
            .player(PlayerSlot::Zero)
            .cards
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["First"]);
    }
}

// ============================================================
// 승리 판정
// ============================================================

#[cfg(test)]
mod win_tests {
    use super::*;

    #[test]
    fn last_card_down_ends_the_match_immediately() {
        let mut engine = engine_with_teams(
            6,
            RuleSet::default(),
            vec![striker("Glass", 10, 5)],
            vec![striker("Hammer", 100, 50)],
        );
        let glass = card_id(engine.state(), PlayerSlot::Zero, 0);
        let hammer = card_id(engine.state(), PlayerSlot::One, 0);

        submit(&mut engine, PlayerSlot::Zero, cast(glass, Some(hammer), 0));
        let turn_before = engine.state().turn_number;
        let outcome = submit(&mut engine, PlayerSlot::One, cast(hammer, Some(glass), 0));

        let state = engine.state();
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.winner, Some(PlayerSlot::One));
        assert_eq!(state.turn_number, turn_before);
        let termination = outcome.terminated.expect("termination reported");
        assert_eq!(termination.winner, Some(PlayerSlot::One));
        assert_eq!(termination.reason, TerminationReason::Normal);

        // 끝난 매치에는 어떤 무브도 적용되지 않습니다.
        let frozen = engine.state().clone();
        for (slot, mv) in [
            (PlayerSlot::Zero, Move::EndTurn),
            (PlayerSlot::One, Move::EndTurn),
            (PlayerSlot::Zero, Move::LeaveMatch),
        ] {
            let err = engine.apply(slot, engine.version(), &mv).unwrap_err();
            assert!(matches!(err, MoveError::Rejected(Rejection::WrongPhase { .. })));
        }
        assert_eq!(engine.state(), &frozen);
    }

    #[test]
    fn leaving_gives_the_opponent_the_win() {
        let mut engine = engine_with_teams(
            7,
            RuleSet::default(),
            vec![striker("Bot", 100, 10)],
            vec![striker("Rex", 100, 10)],
        );
        let outcome = submit(&mut engine, PlayerSlot::One, Move::LeaveMatch);
        let termination = outcome.terminated.expect("termination reported");
        assert_eq!(termination.winner, Some(PlayerSlot::Zero));
        assert_eq!(termination.reason, TerminationReason::OpponentLeft);
    }

    #[test]
    fn timeout_forfeit_uses_the_same_path() {
        let mut engine = engine_with_teams(
            8,
            RuleSet::default(),
            vec![striker("Bot", 100, 10)],
            vec![striker("Rex", 100, 10)],
        );
        let outcome = engine
            .force_leave(PlayerSlot::Zero, TerminationReason::OpponentTimeout)
            .unwrap()
            .expect("match was running");
        assert_eq!(outcome.terminated.unwrap().winner, Some(PlayerSlot::One));
        assert_eq!(engine.state().winner, Some(PlayerSlot::One));

        // 두 번째 강제 패배는 아무 일도 하지 않습니다.
        let version = engine.version();
        assert!(engine
            .force_leave(PlayerSlot::One, TerminationReason::OpponentLeft)
            .unwrap()
            .is_none());
        assert_eq!(engine.version(), version);
        assert_eq!(engine.state().winner, Some(PlayerSlot::One));
    }
}

// ============================================================
// 극단적인 수치
// ============================================================

#[cfg(test)]
mod extreme_stat_tests {
    use super::*;

    #[test]
    fn buffed_maximum_damage_saturates_instead_of_overflowing() {
        let hero = template(
            "Hero",
            100,
            vec![
                Ability::new("Focus", TargetType::SelfTarget).buff(1, 5),
                Ability::new("Nuke", TargetType::Enemy).damage(u32::MAX),
            ],
        );
        let mut engine = engine_with_teams(
            9,
            free_rules(),
            vec![hero],
            vec![striker("Rex", 100, 10)],
        );
        let hero = card_id(engine.state(), PlayerSlot::Zero, 0);
        let rex = card_id(engine.state(), PlayerSlot::One, 0);

        submit(&mut engine, PlayerSlot::Zero, cast(hero, Some(hero), 0));
        submit(&mut engine, PlayerSlot::One, Move::EndTurn);
        let outcome = submit(&mut engine, PlayerSlot::Zero, cast(hero, Some(rex), 1));

        let resolved = engine
            .state()
            .effects
            .iter()
            .find_map(|e| match e {
                EffectRecord::Ability(resolved) => Some(resolved.clone()),
                _ => None,
            })
            .expect("nuke recorded");
        assert_eq!(resolved.amounts.damage, u32::MAX);
        assert_eq!(engine.state().winner, Some(PlayerSlot::Zero));
        assert_eq!(
            outcome.terminated.map(|t| t.reason),
            Some(TerminationReason::Normal)
        );
        assert!(engine.corruption().is_none());
    }
}
