use actix::{Addr, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{exception::GameError, server::match_actor::MatchActor};

#[derive(Message)]
#[rtype(result = "Result<CreatedMatch, GameError>")]
pub struct CreateMatch {
    pub vs_ai: bool,
    /// 지정하지 않으면 매치 id 에서 만들어집니다.
    pub seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMatch {
    pub match_id: Uuid,
    pub seed: u64,
    pub vs_ai: bool,
}

#[derive(Message)]
#[rtype(result = "Result<Addr<MatchActor>, GameError>")]
pub struct FindMatch {
    pub match_id: Uuid,
}

/// 매치 액터가 멈출 때 레지스트리에 보내는 알림
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct MatchClosed {
    pub match_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Vec<MatchSummary>")]
pub struct ListMatches;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub seed: u64,
    pub vs_ai: bool,
    pub created_at: DateTime<Utc>,
}

/// 살아 있는 모든 매치를 닫습니다. 서버 종료 시 사용합니다.
#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseAll;
