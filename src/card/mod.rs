pub mod catalog;
pub mod template;
pub mod types;

use serde::{Deserialize, Serialize};

use types::{InstanceId, PlayerSlot, TargetType};

/// 시전자 측 플레이어에게 붙는 강화 버프 명세입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffSpec {
    /// 버프가 살아있는 동안 해당 플레이어의 모든 피해량에 더해지는 값
    pub amount: u32,
    /// 지속 턴 수 (소유자의 턴이 끝날 때마다 1씩 감소)
    pub turns: u32,
}

/// 카드가 사용할 수 있는 능력. 한 번 정의되면 변하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub heal: u32,
    #[serde(default)]
    pub shield: u32,
    #[serde(default)]
    pub freeze: bool,
    #[serde(default)]
    pub mana_cost: u32,
    pub target_type: TargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buff: Option<BuffSpec>,
}

impl Ability {
    pub fn new(name: &str, target_type: TargetType) -> Self {
        Self {
            name: name.to_string(),
            damage: 0,
            heal: 0,
            shield: 0,
            freeze: false,
            mana_cost: 0,
            target_type,
            buff: None,
        }
    }

    pub fn damage(mut self, amount: u32) -> Self {
        self.damage = amount;
        self
    }

    pub fn heal(mut self, amount: u32) -> Self {
        self.heal = amount;
        self
    }

    pub fn shield(mut self, amount: u32) -> Self {
        self.shield = amount;
        self
    }

    pub fn freeze(mut self) -> Self {
        self.freeze = true;
        self
    }

    pub fn mana(mut self, cost: u32) -> Self {
        self.mana_cost = cost;
        self
    }

    pub fn buff(mut self, amount: u32, turns: u32) -> Self {
        self.buff = Some(BuffSpec { amount, turns });
        self
    }
}

/// 매치 안에서 싸우는 카드 인스턴스입니다.
///
/// `frozen` 은 저장하지 않고 `frozen_turns > 0` 으로 유도합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
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
    pub frozen_turns: u32,
    pub abilities: Vec<Ability>,
    /// 능력별 사용 횟수 (abilities 와 같은 길이)
    pub ability_uses: Vec<u32>,
}

impl Card {
    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_turns > 0
    }

    /// 살아있고 얼어있지 않은 카드만 행동할 수 있습니다.
    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.is_frozen()
    }

    pub fn ability_used(&self, index: usize) -> bool {
        self.ability_uses.get(index).copied().unwrap_or(0) > 0
    }

    pub fn has_unused_ability(&self) -> bool {
        self.ability_uses.iter().any(|uses| *uses == 0)
    }
}
