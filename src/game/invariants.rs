//! 매 무브 뒤에 확인하는 상태 불변식.
//! 하나라도 깨지면 해당 매치는 손상된 것으로 보고 중단됩니다.

use std::collections::HashSet;

use crate::{card::types::PlayerSlot, exception::MatchCorruption};

use super::{phase::Phase, state::MatchState};

pub fn check(state: &MatchState) -> Result<(), MatchCorruption> {
    for slot in PlayerSlot::ALL {
        let player = state.player(slot);
        let mut seen = HashSet::new();

        for card in &player.cards {
            if card.owner != slot {
                return Err(MatchCorruption::OwnerMismatch {
                    id: card.instance_id,
                    listed: slot,
                    owner: card.owner,
                });
            }
            if card.current_health > card.max_health {
                return Err(MatchCorruption::HealthOutOfBounds {
                    id: card.instance_id,
                    current: card.current_health,
                    max: card.max_health,
                });
            }
            if !card.is_alive() {
                return Err(MatchCorruption::DeadCardInPlay(card.instance_id));
            }
            if !seen.insert(card.instance_id) {
                return Err(MatchCorruption::DuplicatedCard(card.instance_id));
            }
        }

        for card in &player.graveyard {
            if card.owner != slot {
                return Err(MatchCorruption::OwnerMismatch {
                    id: card.instance_id,
                    listed: slot,
                    owner: card.owner,
                });
            }
            if card.is_alive() {
                return Err(MatchCorruption::LivingCardInGraveyard(card.instance_id));
            }
            if !seen.insert(card.instance_id) {
                return Err(MatchCorruption::DuplicatedCard(card.instance_id));
            }
        }

        // cards 와 graveyard 는 제출된 로스터를 정확히 분할해야 합니다.
        let roster: HashSet<_> = player.roster.iter().copied().collect();
        if let Some(missing) = player.roster.iter().find(|id| !seen.contains(id)) {
            return Err(MatchCorruption::MissingCard(*missing));
        }
        if let Some(stray) = seen.iter().find(|id| !roster.contains(id)) {
            return Err(MatchCorruption::StrayCard(*stray));
        }
    }

    if state.winner.is_some() && state.phase != Phase::GameOver {
        return Err(MatchCorruption::WinnerOutsideGameOver(state.phase));
    }

    Ok(())
}
