use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 매치의 두 좌석 중 하나를 나타냅니다. 와이어 포맷에서는 "0" / "1" 로 표현됩니다.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::Zero, PlayerSlot::One];

    pub fn other(self) -> Self {
        match self {
            PlayerSlot::Zero => PlayerSlot::One,
            PlayerSlot::One => PlayerSlot::Zero,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::Zero => 0,
            PlayerSlot::One => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerSlot::Zero => "0",
            PlayerSlot::One => "1",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "0" => Some(PlayerSlot::Zero),
            "1" => Some(PlayerSlot::One),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 매치 내에서 카드 인스턴스를 식별하는 값. 모든 타겟 지정은 이 값으로만 이루어집니다.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for InstanceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<InstanceId> for Uuid {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Enemy,
    Ally,
    #[serde(rename = "self")]
    SelfTarget,
    AllEnemies,
    AllAllies,
}

impl TargetType {
    /// 단일 대상을 요구하는지 여부
    pub fn is_single(self) -> bool {
        matches!(
            self,
            TargetType::Enemy | TargetType::Ally | TargetType::SelfTarget
        )
    }

    /// 시전자 기준으로 어느 좌석의 로스터를 대상으로 삼는지
    pub fn target_side(self, caster: PlayerSlot) -> PlayerSlot {
        match self {
            TargetType::Enemy | TargetType::AllEnemies => caster.other(),
            TargetType::Ally | TargetType::AllAllies | TargetType::SelfTarget => caster,
        }
    }
}
