use serde::{Deserialize, Serialize};

use crate::card::{
    template::CardTemplate,
    types::{InstanceId, PlayerSlot},
};

/// 상태를 바꾸는 명령. 모든 진입점은 이 타입으로 수렴합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    /// 팀 제출. 빈 목록이면 좌석의 기본 덱을 사용합니다.
    SetPlayerTeam { cards: Vec<CardTemplate> },
    /// playCard / castSpell 공통 진입점
    CastAbility {
        source: InstanceId,
        target: Option<InstanceId>,
        ability_index: usize,
    },
    EndTurn,
    LeaveMatch,
}

impl Move {
    pub fn kind(&self) -> &'static str {
        match self {
            Move::SetPlayerTeam { .. } => "set_player_team",
            Move::CastAbility { .. } => "cast_ability",
            Move::EndTurn => "end_turn",
            Move::LeaveMatch => "leave_match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Normal,
    OpponentLeft,
    OpponentTimeout,
    Stalemate,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Normal => "normal",
            TerminationReason::OpponentLeft => "opponent_left",
            TerminationReason::OpponentTimeout => "opponent_timeout",
            TerminationReason::Stalemate => "stalemate",
        }
    }
}

/// 매치 종료 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    pub winner: Option<PlayerSlot>,
    pub reason: TerminationReason,
}

/// 무브 적용 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// 적용 후의 상태 버전
    pub version: u64,
    pub kind: &'static str,
    /// 이 무브로 매치가 끝났다면 종료 정보
    pub terminated: Option<Termination>,
    /// 이 무브 처리 중 자동으로 건너뛴 턴 수
    pub skipped_turns: u32,
}
