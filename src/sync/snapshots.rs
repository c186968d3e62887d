use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    card::{
        types::{InstanceId, PlayerSlot},
        Ability, Card,
    },
    game::{
        effects::EffectRecord,
        moves::Termination,
        phase::Phase,
        state::{MatchState, PendingAbility, PlayerState, TimedBuff},
    },
};

// ===================================================================
// 클라이언트에게 전달되는 읽기 전용 스냅샷
// ===================================================================

/// 카드 한 장의 전체 공개 정보
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub instance_id: InstanceId,
    pub owner: PlayerSlot,
    pub position: usize,
    pub name: String,
    pub display_asset: String,
    pub max_health: u32,
    pub current_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub shields: u32,
    pub frozen: bool,
    pub frozen_turns: u32,
    pub is_alive: bool,
    pub abilities: Vec<Ability>,
    pub ability_uses: Vec<u32>,
}

impl From<&Card> for CardSnapshot {
    fn from(card: &Card) -> Self {
        Self {
            instance_id: card.instance_id,
            owner: card.owner,
            position: card.position,
            name: card.name.clone(),
            display_asset: card.display_asset.clone(),
            max_health: card.max_health,
            current_health: card.current_health,
            attack: card.attack,
            defense: card.defense,
            speed: card.speed,
            shields: card.shields,
            frozen: card.is_frozen(),
            frozen_turns: card.frozen_turns,
            is_alive: card.is_alive(),
            abilities: card.abilities.clone(),
            ability_uses: card.ability_uses.clone(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub cards: Vec<CardSnapshot>,
    pub graveyard: Vec<CardSnapshot>,
    pub ready: bool,
    pub health: u32,
    pub mana: u32,
    pub buffs: Vec<TimedBuff>,
}

impl From<&PlayerState> for PlayerSnapshot {
    fn from(player: &PlayerState) -> Self {
        Self {
            cards: player.cards.iter().map(CardSnapshot::from).collect(),
            graveyard: player.graveyard.iter().map(CardSnapshot::from).collect(),
            ready: player.ready,
            health: player.health,
            mana: player.mana,
            buffs: player.buffs.clone(),
        }
    }
}

/// 특정 버전 시점의 매치 전체 상태. 만들어진 뒤에는 바뀌지 않습니다.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub match_id: Uuid,
    pub version: u64,
    pub phase: Phase,
    pub turn_number: u32,
    pub current_player: PlayerSlot,
    pub winner: Option<PlayerSlot>,
    pub termination: Option<Termination>,
    pub pending_ability: Option<PendingAbility>,
    pub players: BTreeMap<PlayerSlot, PlayerSnapshot>,
    /// 이 버전을 만든 무브가 남긴 효과들 (애니메이션용)
    pub active_effects: Vec<EffectRecord>,
}

impl MatchSnapshot {
    /// 권위 상태를 깊은 복사합니다. 클라이언트 쪽에서 원본을 참조로 건드릴 수 없습니다.
    pub fn capture(match_id: Uuid, state: &MatchState) -> Self {
        let players = PlayerSlot::ALL
            .into_iter()
            .map(|slot| (slot, PlayerSnapshot::from(state.player(slot))))
            .collect();

        Self {
            match_id,
            version: state.version,
            phase: state.phase,
            turn_number: state.turn_number,
            current_player: state.current_player,
            winner: state.winner,
            termination: state.termination,
            pending_ability: state.pending,
            players,
            active_effects: state.effects.clone(),
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&PlayerSnapshot> {
        self.players.get(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{moves::Move, rules::RuleSet, MatchEngine};

    #[test]
    fn snapshot_wire_shape() {
        let mut engine = MatchEngine::new(12, RuleSet::default());
        let team = Move::SetPlayerTeam { cards: vec![] };
        engine.apply(PlayerSlot::Zero, 0, &team).unwrap();
        engine.apply(PlayerSlot::One, 1, &team).unwrap();

        let snapshot = MatchSnapshot::capture(Uuid::nil(), engine.state());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["version"], 2);
        assert_eq!(json["phase"], "playing");
        assert_eq!(json["currentPlayer"], "0");
        assert_eq!(json["turnNumber"], 1);
        assert!(json["winner"].is_null());

        let card = &json["players"]["1"]["cards"][0];
        assert_eq!(card["name"], "Alien");
        assert_eq!(card["displayAsset"], "👽");
        assert_eq!(card["currentHealth"], 110);
        assert_eq!(card["frozen"], false);
        assert_eq!(card["frozenTurns"], 0);
        assert_eq!(card["isAlive"], true);
        assert_eq!(card["abilities"][0]["targetType"], "enemy");
    }

    #[test]
    fn snapshot_is_detached_from_state() {
        let mut engine = MatchEngine::new(12, RuleSet::default());
        let before = MatchSnapshot::capture(Uuid::nil(), engine.state());
        engine
            .apply(PlayerSlot::Zero, 0, &Move::SetPlayerTeam { cards: vec![] })
            .unwrap();
        let after = MatchSnapshot::capture(Uuid::nil(), engine.state());

        assert_eq!(before.version, 0);
        assert!(before.player(PlayerSlot::Zero).unwrap().cards.is_empty());
        assert_eq!(after.version, 1);
        assert_eq!(after.player(PlayerSlot::Zero).unwrap().cards.len(), 4);
    }
}
