use std::sync::Arc;

use actix::Message;

use crate::game::moves::Termination;

use super::snapshots::MatchSnapshot;

// ===================================================================
// 매치 액터가 구독자(웹소켓 세션 등)에게 보내는 메시지
// ===================================================================

#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub enum SyncEvent {
    /// 새 버전의 전체 상태
    Snapshot(Arc<MatchSnapshot>),
    /// 매치 종료 (승자 및 사유)
    Terminated {
        version: u64,
        termination: Termination,
    },
    /// 손상으로 인해 매치가 중단됨
    Aborted { reason: String },
    /// 같은 좌석으로 새 연결이 들어와 이 연결이 대체됨
    Replaced,
}
