use actix::MailboxError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    card::types::{InstanceId, PlayerSlot},
    game::phase::Phase,
};

// ===================================================================
// 1. 엔티티 생성 에러
// ===================================================================

/// 카드 템플릿을 인스턴스로 만들 수 없을 때 발생합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("invalid card template: {0}")]
    InvalidTemplate(String),
}

// ===================================================================
// 2. 무브 거절 사유 (항상 복구 가능, 상태는 변하지 않음)
// ===================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("move '{action}' is not allowed during phase '{phase}'")]
    WrongPhase { phase: Phase, action: &'static str },

    #[error("it is player {current}'s turn")]
    NotYourTurn { current: PlayerSlot },

    #[error("unknown card instance {0}")]
    UnknownInstanceId(InstanceId),

    #[error("card {0} is not controlled by the acting player")]
    NotYourCard(InstanceId),

    #[error("card {0} is dead or frozen")]
    DeadOrFrozenSource(InstanceId),

    #[error("card {card} has no ability at index {index}")]
    UnknownAbility { card: InstanceId, index: usize },

    #[error("only the pending ability may be cast this turn")]
    NotPendingAbility,

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("ability {index} of card {card} has already been used")]
    AbilityExhausted { card: InstanceId, index: usize },

    #[error("player {0} has already submitted a team")]
    AlreadyReady(PlayerSlot),

    #[error("invalid team: {0}")]
    InvalidTeam(String),

    #[error("stale state version: move based on {submitted}, current is {current}")]
    StaleVersion { submitted: u64, current: u64 },
}

/// 클라이언트와 메트릭 라벨에 노출되는 거절 코드
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCode {
    WrongPhase,
    NotYourTurn,
    UnknownInstanceId,
    NotYourCard,
    DeadOrFrozenSource,
    UnknownAbility,
    NotPendingAbility,
    InvalidTarget,
    AbilityExhausted,
    AlreadyReady,
    InvalidTeam,
    StaleVersion,
}

impl RejectionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongPhase => "wrong_phase",
            Self::NotYourTurn => "not_your_turn",
            Self::UnknownInstanceId => "unknown_instance_id",
            Self::NotYourCard => "not_your_card",
            Self::DeadOrFrozenSource => "dead_or_frozen_source",
            Self::UnknownAbility => "unknown_ability",
            Self::NotPendingAbility => "not_pending_ability",
            Self::InvalidTarget => "invalid_target",
            Self::AbilityExhausted => "ability_exhausted",
            Self::AlreadyReady => "already_ready",
            Self::InvalidTeam => "invalid_team",
            Self::StaleVersion => "stale_version",
        }
    }
}

impl Rejection {
    pub fn code(&self) -> RejectionCode {
        match self {
            Self::WrongPhase { .. } => RejectionCode::WrongPhase,
            Self::NotYourTurn { .. } => RejectionCode::NotYourTurn,
            Self::UnknownInstanceId(_) => RejectionCode::UnknownInstanceId,
            Self::NotYourCard(_) => RejectionCode::NotYourCard,
            Self::DeadOrFrozenSource(_) => RejectionCode::DeadOrFrozenSource,
            Self::UnknownAbility { .. } => RejectionCode::UnknownAbility,
            Self::NotPendingAbility => RejectionCode::NotPendingAbility,
            Self::InvalidTarget(_) => RejectionCode::InvalidTarget,
            Self::AbilityExhausted { .. } => RejectionCode::AbilityExhausted,
            Self::AlreadyReady(_) => RejectionCode::AlreadyReady,
            Self::InvalidTeam(_) => RejectionCode::InvalidTeam,
            Self::StaleVersion { .. } => RejectionCode::StaleVersion,
        }
    }
}

impl From<CardError> for Rejection {
    fn from(e: CardError) -> Self {
        Rejection::InvalidTeam(e.to_string())
    }
}

// ===================================================================
// 3. 매치 손상 (해당 매치에 한해 치명적)
// ===================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchCorruption {
    #[error("card {0} is both in play and in the graveyard")]
    DuplicatedCard(InstanceId),

    #[error("card {0} is neither in play nor in the graveyard")]
    MissingCard(InstanceId),

    #[error("card {0} was never part of the submitted roster")]
    StrayCard(InstanceId),

    #[error("card {id} has health {current} outside [0, {max}]")]
    HealthOutOfBounds { id: InstanceId, current: u32, max: u32 },

    #[error("card {0} has no health left but is still in play")]
    DeadCardInPlay(InstanceId),

    #[error("card {0} is alive but sits in the graveyard")]
    LivingCardInGraveyard(InstanceId),

    #[error("card {id} is listed under player {listed} but owned by player {owner}")]
    OwnerMismatch {
        id: InstanceId,
        listed: PlayerSlot,
        owner: PlayerSlot,
    },

    #[error("a winner is recorded but the phase is '{0}'")]
    WinnerOutsideGameOver(Phase),

    #[error("validated cast of ability {ability_index} on card {card} has no such card or ability")]
    UnresolvablePlan {
        card: InstanceId,
        ability_index: usize,
    },

    #[error("target {0} left the roster before its cast resolved")]
    TargetLeftRoster(InstanceId),

    #[error("turn rotation did not settle after {0} skipped turns")]
    TurnLoopDiverged(u32),

    #[error("match was aborted after an earlier corruption")]
    MatchAborted,
}

/// 엔진이 무브 처리 중 돌려주는 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Corrupted(#[from] MatchCorruption),
}

// ===================================================================
// 4. 서버 레벨 최상위 에러
// ===================================================================

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("match {0} not found")]
    MatchNotFound(Uuid),

    #[error("seat {0} is played by the server AI")]
    SeatReserved(PlayerSlot),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("actor mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<Rejection> for GameError {
    fn from(e: Rejection) -> Self {
        GameError::Move(MoveError::Rejected(e))
    }
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Move(MoveError::Rejected(r)) => r.code().as_str(),
            GameError::Move(MoveError::Corrupted(_)) => "match_corrupted",
            GameError::MatchNotFound(_) => "match_not_found",
            GameError::SeatReserved(_) => "seat_reserved",
            GameError::InvalidPayload(_) => "invalid_payload",
            GameError::Mailbox(_) => "internal_error",
            GameError::Config(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::Move(MoveError::Rejected(Rejection::StaleVersion { .. })) => {
                StatusCode::CONFLICT
            }
            GameError::Move(MoveError::Rejected(Rejection::AlreadyReady(_))) => {
                StatusCode::CONFLICT
            }
            GameError::Move(MoveError::Rejected(_)) => StatusCode::BAD_REQUEST,
            GameError::Move(MoveError::Corrupted(_)) => StatusCode::GONE,
            GameError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            GameError::SeatReserved(_) => StatusCode::CONFLICT,
            GameError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            GameError::Mailbox(_) | GameError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.code(),
            message: self.to_string(),
        })
    }
}
