use serde::{Deserialize, Serialize};

use crate::card::{
    types::{InstanceId, PlayerSlot},
    Card,
};

use super::{effects::EffectRecord, moves::Termination, phase::Phase};

const STARTING_HEALTH: u32 = 100;
const STARTING_MANA: u32 = 3;

/// 플레이어에게 붙는 시간 제한 버프
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedBuff {
    pub source_id: InstanceId,
    pub ability_name: String,
    pub amount: u32,
    pub remaining_turns: u32,
}

/// 턴 시작 시 무작위로 뽑힌 카드/능력
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAbility {
    pub source_id: InstanceId,
    pub ability_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub cards: Vec<Card>,
    pub graveyard: Vec<Card>,
    pub ready: bool,
    // health / mana 는 예약 필드입니다. 패배 조건으로 쓰이지 않습니다.
    pub health: u32,
    pub mana: u32,
    pub buffs: Vec<TimedBuff>,
    /// 팀 제출 시 확정된 카드 id 목록 (cards/graveyard 분할 검사용)
    pub roster: Vec<InstanceId>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            cards: vec![],
            graveyard: vec![],
            ready: false,
            health: STARTING_HEALTH,
            mana: STARTING_MANA,
            buffs: vec![],
            roster: vec![],
        }
    }

    pub fn alive_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.is_alive())
    }

    pub fn has_alive_card(&self) -> bool {
        self.alive_cards().next().is_some()
    }

    /// 버프로 늘어나는 피해량 합계
    pub fn damage_bonus(&self) -> u32 {
        self.buffs
            .iter()
            .map(|b| b.amount)
            .fold(0, u32::saturating_add)
    }

    pub fn find_card(&self, id: InstanceId) -> Option<&Card> {
        self.cards
            .iter()
            .chain(self.graveyard.iter())
            .find(|c| c.instance_id == id)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

/// 매치의 권위 있는 루트 상태 (`G`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub phase: Phase,
    pub players: [PlayerState; 2],
    pub turn_number: u32,
    pub current_player: PlayerSlot,
    pub winner: Option<PlayerSlot>,
    pub termination: Option<Termination>,
    pub pending: Option<PendingAbility>,
    /// 표현 전용 출력 큐. 엔진은 이 값을 읽어 판단하지 않습니다.
    pub effects: Vec<EffectRecord>,
    pub version: u64,
    pub seed: u64,
}

impl MatchState {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Setup,
            players: [PlayerState::new(), PlayerState::new()],
            turn_number: 0,
            current_player: PlayerSlot::Zero,
            winner: None,
            termination: None,
            pending: None,
            effects: vec![],
            version: 0,
            seed,
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> &PlayerState {
        &self.players[slot.index()]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerState {
        &mut self.players[slot.index()]
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal() || self.termination.is_some()
    }

    /// 양쪽 로스터와 묘지를 모두 뒤져 카드를 찾습니다.
    pub fn find_card(&self, id: InstanceId) -> Option<&Card> {
        self.players.iter().find_map(|p| p.find_card(id))
    }

    /// 살아있는 로스터에서 카드 위치 (좌석, 인덱스)
    pub fn locate_active(&self, id: InstanceId) -> Option<(PlayerSlot, usize)> {
        PlayerSlot::ALL.into_iter().find_map(|slot| {
            self.player(slot)
                .cards
                .iter()
                .position(|c| c.instance_id == id)
                .map(|idx| (slot, idx))
        })
    }

    pub fn active_card_mut(&mut self, id: InstanceId) -> Option<&mut Card> {
        let (slot, idx) = self.locate_active(id)?;
        self.player_mut(slot).cards.get_mut(idx)
    }

    /// 로스터 혹은 묘지에 있는 카드의 가변 참조
    pub fn any_card_mut(&mut self, id: InstanceId) -> Option<&mut Card> {
        self.players
            .iter_mut()
            .flat_map(|p| p.cards.iter_mut().chain(p.graveyard.iter_mut()))
            .find(|c| c.instance_id == id)
    }
}
