use serde::{Deserialize, Serialize};

/// 능력 사용 횟수 정책. 매치 전체에 하나의 정책만 일관되게 적용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AbilityUsePolicy {
    /// 사용 횟수는 기록만 하고 시전을 막지 않습니다.
    #[default]
    Unlimited,
    /// 카드 인스턴스마다 각 능력을 한 번만 쓸 수 있습니다.
    OncePerMatch,
}

/// 코어 엔진이 참조하는 규칙 묶음. 설정 파일의 `[battle]` 섹션에서 만들어집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub max_team_size: usize,
    pub ability_use_policy: AbilityUsePolicy,
    /// true 이면 턴 시작 시 뽑힌 카드/능력만 시전할 수 있습니다.
    pub enforce_pending_ability: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            max_team_size: 4,
            ability_use_policy: AbilityUsePolicy::Unlimited,
            enforce_pending_ability: true,
        }
    }
}

impl RuleSet {
    pub fn once_per_match(&self) -> bool {
        self.ability_use_policy == AbilityUsePolicy::OncePerMatch
    }
}
