use std::sync::Arc;

use actix::{Message, Recipient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    card::types::PlayerSlot,
    exception::GameError,
    game::{
        moves::{Move, MoveOutcome, Termination},
        phase::Phase,
    },
    sync::{messages::SyncEvent, snapshots::MatchSnapshot},
};

/// 좌석 하나가 보낸 무브. `base_version` 은 클라이언트가 보고 있던 스냅샷의 버전입니다.
#[derive(Message)]
#[rtype(result = "Result<MoveOutcome, GameError>")]
pub struct SubmitMove {
    pub slot: PlayerSlot,
    pub base_version: u64,
    pub mv: Move,
}

/// 스냅샷 구독. 같은 좌석의 기존 연결은 대체됩니다.
#[derive(Message)]
#[rtype(result = "Result<Arc<MatchSnapshot>, GameError>")]
pub struct Subscribe {
    pub connection_id: Uuid,
    /// None 이면 관전자
    pub seat: Option<PlayerSlot>,
    pub recipient: Recipient<SyncEvent>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Unsubscribe {
    pub connection_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Arc<MatchSnapshot>")]
pub struct GetSnapshot;

#[derive(Message)]
#[rtype(result = "MatchStatus")]
pub struct GetStatus;

/// 한 좌석이 매치를 포기합니다. 상대에게 opponent_left 승리가 주어집니다.
#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct Abandon {
    pub slot: PlayerSlot,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

#[derive(Serialize, Clone, Debug, actix::MessageResponse)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatus {
    pub match_id: Uuid,
    pub version: u64,
    pub phase: Phase,
    pub turn_number: u32,
    pub current_player: PlayerSlot,
    pub winner: Option<PlayerSlot>,
    pub termination: Option<Termination>,
    pub vs_ai: bool,
    pub seed: u64,
    pub connected_seats: Vec<PlayerSlot>,
    pub subscribers: usize,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
