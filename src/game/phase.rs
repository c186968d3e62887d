use std::fmt;

use serde::{Deserialize, Serialize};

/// 매치의 큰 흐름. setup -> playing -> gameover 순서로만 진행됩니다.
#[derive(Clone, PartialEq, Eq, Copy, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    // 양쪽이 팀을 제출하는 동시 진행 단계
    Setup,
    // 턴제 전투
    Playing,
    // 종료 (winner 가 정해졌거나 무승부)
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Playing => "playing",
            Phase::GameOver => "gameover",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver)
    }

    /// 허용되는 전이인지 확인합니다. playing 을 건너뛰는 전이는 없습니다.
    /// 단, 강제 종료(이탈/시간 초과)는 setup 에서도 곧바로 gameover 로 갈 수 있습니다.
    pub fn can_transition_to(&self, next: Phase, forced: bool) -> bool {
        match (self, next) {
            (Phase::Setup, Phase::Playing) => true,
            (Phase::Playing, Phase::GameOver) => true,
            (Phase::Setup, Phase::GameOver) => forced,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
