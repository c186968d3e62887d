use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    card::{template::CardTemplate, types::PlayerSlot},
    exception::RejectionCode,
    game::moves::{Move, TerminationReason},
    sync::snapshots::MatchSnapshot,
};

// --- Client to Server Messages ---

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// 팀 제출. `cards` 가 비어 있으면 좌석의 기본 덱을 사용합니다.
    #[serde(rename = "set_player_team")]
    SetPlayerTeam {
        version: u64,
        #[serde(default)]
        cards: Vec<CardTemplate>,
    },

    #[serde(rename = "play_card")]
    PlayCard {
        version: u64,
        source_id: Uuid,
        #[serde(default)]
        target_id: Option<Uuid>,
        #[serde(default)]
        ability_index: usize,
    },

    /// play_card 와 동일하게 처리됩니다.
    #[serde(rename = "cast_spell")]
    CastSpell {
        version: u64,
        source_id: Uuid,
        #[serde(default)]
        target_id: Option<Uuid>,
        #[serde(default)]
        ability_index: usize,
    },

    #[serde(rename = "end_turn")]
    EndTurn { version: u64 },

    #[serde(rename = "leave_match")]
    LeaveMatch { version: u64 },

    /// 현재 스냅샷을 다시 요청합니다.
    #[serde(rename = "sync")]
    Sync,
}

impl ClientMessage {
    /// 무브로 변환합니다. `sync` 처럼 상태를 바꾸지 않는 메시지는 None.
    pub fn into_move(self) -> Option<(u64, Move)> {
        match self {
            ClientMessage::SetPlayerTeam { version, cards } => {
                Some((version, Move::SetPlayerTeam { cards }))
            }
            ClientMessage::PlayCard {
                version,
                source_id,
                target_id,
                ability_index,
            }
            | ClientMessage::CastSpell {
                version,
                source_id,
                target_id,
                ability_index,
            } => Some((
                version,
                Move::CastAbility {
                    source: source_id.into(),
                    target: target_id.map(Into::into),
                    ability_index,
                },
            )),
            ClientMessage::EndTurn { version } => Some((version, Move::EndTurn)),
            ClientMessage::LeaveMatch { version } => Some((version, Move::LeaveMatch)),
            ClientMessage::Sync => None,
        }
    }
}

// --- Server to Client Messages ---

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// 구독이 완료되었음을 알립니다. 관전자는 seat 가 null 입니다.
    #[serde(rename = "subscribed")]
    Subscribed {
        match_id: Uuid,
        seat: Option<PlayerSlot>,
    },

    /// 전체 상태 스냅샷
    #[serde(rename = "state")]
    State { snapshot: Arc<MatchSnapshot> },

    /// 보낸 무브가 적용되었음을 보낸 연결에게만 알립니다.
    #[serde(rename = "move_accepted")]
    MoveAccepted { version: u64 },

    /// 보낸 무브가 거절되었음을 보낸 연결에게만 알립니다.
    #[serde(rename = "move_rejected")]
    MoveRejected { code: RejectionCode, message: String },

    #[serde(rename = "game_over")]
    GameOver {
        winner: Option<PlayerSlot>,
        reason: TerminationReason,
        version: u64,
    },

    #[serde(rename = "match_aborted")]
    MatchAborted { reason: String },

    /// 같은 좌석에 새 연결이 들어와 이 연결이 닫힙니다.
    #[serde(rename = "replaced")]
    Replaced,

    #[serde(rename = "error")]
    Error { code: ErrorCode, message: String },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidMessageFormat,
    NotASeat,
    MatchNotFound,
    MatchAborted,
    InternalError,
}
