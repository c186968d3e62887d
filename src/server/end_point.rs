use std::time::Duration;

use actix::Addr;
use actix_web::{delete, get, post, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    card::types::PlayerSlot,
    exception::GameError,
    server::{
        match_actor::{
            messages::{Abandon, GetSnapshot, GetStatus},
            MatchActor,
        },
        registry::messages::{CreateMatch, FindMatch, ListMatches},
        session::GameSession,
    },
    AppState,
};

#[derive(Deserialize, Debug, Default)]
pub struct CreateMatchRequest {
    #[serde(default)]
    pub vs_ai: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct SeatQuery {
    pub slot: Option<PlayerSlot>,
}

async fn find_match(state: &AppState, match_id: Uuid) -> Result<Addr<MatchActor>, GameError> {
    state.registry.send(FindMatch { match_id }).await?
}

#[post("/matches")]
pub async fn create_match(
    state: web::Data<AppState>,
    body: Option<web::Json<CreateMatchRequest>>,
) -> Result<HttpResponse, GameError> {
    let request = body.map(|b| b.into_inner()).unwrap_or_default();
    let created = state
        .registry
        .send(CreateMatch {
            vs_ai: request.vs_ai,
            seed: request.seed,
        })
        .await??;
    Ok(HttpResponse::Created().json(created))
}

#[get("/matches")]
pub async fn list_matches(state: web::Data<AppState>) -> Result<HttpResponse, GameError> {
    let matches = state.registry.send(ListMatches).await?;
    Ok(HttpResponse::Ok().json(matches))
}

#[get("/matches/{match_id}")]
pub async fn match_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, GameError> {
    let addr = find_match(&state, path.into_inner()).await?;
    let status = addr.send(GetStatus).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/matches/{match_id}/snapshot")]
pub async fn match_snapshot(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, GameError> {
    let addr = find_match(&state, path.into_inner()).await?;
    let snapshot = addr.send(GetSnapshot).await?;
    Ok(HttpResponse::Ok().json(snapshot.as_ref()))
}

/// 좌석 하나가 매치를 포기합니다. 상대가 opponent_left 로 승리합니다.
#[delete("/matches/{match_id}")]
pub async fn abandon_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<SeatQuery>,
) -> Result<HttpResponse, GameError> {
    let match_id = path.into_inner();
    let slot = query
        .slot
        .ok_or_else(|| GameError::InvalidPayload("query parameter `slot` is required".into()))?;

    let addr = find_match(&state, match_id).await?;
    addr.send(Abandon { slot }).await??;
    info!("Match {} abandoned by player {}", match_id, slot);

    let status = addr.send(GetStatus).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// 웹소켓 연결. `slot` 이 없으면 관전자로 접속합니다.
#[get("/ws/{match_id}")]
pub async fn match_ws(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<SeatQuery>,
) -> Result<HttpResponse, Error> {
    let match_id = path.into_inner();
    let addr = find_match(&state, match_id).await?;

    let session = GameSession::new(
        match_id,
        query.slot,
        addr,
        Duration::from_secs(state.settings.session.heartbeat_interval_seconds),
        Duration::from_secs(state.settings.session.client_timeout_seconds),
    );
    ws::start(session, &req, stream)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_match)
        .service(list_matches)
        .service(match_snapshot)
        .service(match_status)
        .service(abandon_match)
        .service(match_ws);
}
