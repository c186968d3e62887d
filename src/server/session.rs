use std::time::{Duration, Instant};

use actix::{
    fut, Actor, ActorContext, ActorFutureExt, Addr, AsyncContext, Handler, StreamHandler,
    WrapFuture,
};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    card::types::PlayerSlot,
    exception::{GameError, MoveError},
    metrics::ACTIVE_WS_CONNECTIONS,
    server::{
        match_actor::{
            messages::{GetSnapshot, SubmitMove, Subscribe, Unsubscribe},
            MatchActor,
        },
        protocol::{ClientMessage, ErrorCode, ServerMessage},
    },
    sync::messages::SyncEvent,
};

type Ctx = ws::WebsocketContext<GameSession>;

fn send(ctx: &mut Ctx, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(text) => ctx.text(text),
        Err(e) => warn!("Failed to serialize server message: {}", e),
    }
}

fn send_err(ctx: &mut Ctx, code: ErrorCode, message: &str) {
    send(
        ctx,
        &ServerMessage::Error {
            code,
            message: message.to_string(),
        },
    );
}

/// 무브 적용 실패를 보낸 연결에게만 알립니다.
fn send_move_error(ctx: &mut Ctx, error: GameError) {
    match error {
        GameError::Move(MoveError::Rejected(rejection)) => send(
            ctx,
            &ServerMessage::MoveRejected {
                code: rejection.code(),
                message: rejection.to_string(),
            },
        ),
        GameError::Move(MoveError::Corrupted(corruption)) => {
            send_err(ctx, ErrorCode::MatchAborted, &corruption.to_string())
        }
        GameError::MatchNotFound(_) => send_err(ctx, ErrorCode::MatchNotFound, &error.to_string()),
        GameError::SeatReserved(_) => send_err(ctx, ErrorCode::NotASeat, &error.to_string()),
        other => send_err(ctx, ErrorCode::InternalError, &other.to_string()),
    }
}

/// 매치 하나를 관찰하는 웹소켓 연결. 좌석이 있으면 무브도 보낼 수 있습니다.
pub struct GameSession {
    connection_id: Uuid,
    match_id: Uuid,
    seat: Option<PlayerSlot>,
    match_addr: Addr<MatchActor>,
    hb: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
}

impl GameSession {
    pub fn new(
        match_id: Uuid,
        seat: Option<PlayerSlot>,
        match_addr: Addr<MatchActor>,
        heartbeat_interval: Duration,
        client_timeout: Duration,
    ) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            match_id,
            seat,
            match_addr,
            hb: Instant::now(),
            heartbeat_interval,
            client_timeout,
        }
    }

    fn hb(&self, ctx: &mut Ctx) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.hb) > act.client_timeout {
                info!(
                    "Websocket client {} heartbeat failed, disconnecting!",
                    act.connection_id
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn subscribe(&self, ctx: &mut Ctx) {
        let request = self.match_addr.send(Subscribe {
            connection_id: self.connection_id,
            seat: self.seat,
            recipient: ctx.address().recipient(),
        });

        let subscribed = request
            .into_actor(self)
            .then(|result, act, ctx| {
                match result {
                    Ok(Ok(_)) => send(
                        ctx,
                        &ServerMessage::Subscribed {
                            match_id: act.match_id,
                            seat: act.seat,
                        },
                    ),
                    Ok(Err(e)) => {
                        warn!("Connection {} could not subscribe: {}", act.connection_id, e);
                        send_move_error(ctx, e);
                        ctx.stop();
                    }
                    Err(e) => {
                        warn!("Match {} mailbox error: {}", act.match_id, e);
                        send_err(ctx, ErrorCode::MatchNotFound, "match is no longer running");
                        ctx.stop();
                    }
                }
                fut::ready(())
            });

        // 구독이 끝나기 전에는 클라이언트 메시지를 처리하지 않습니다.
        ctx.wait(subscribed);
    }

    fn handle_client_message(&mut self, text: &str, ctx: &mut Ctx) {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                debug!("Invalid message from {}: {}", self.connection_id, e);
                send_err(ctx, ErrorCode::InvalidMessageFormat, &e.to_string());
                return;
            }
        };

        let Some((base_version, mv)) = message.into_move() else {
            let resync = self
                .match_addr
                .send(GetSnapshot)
                .into_actor(self)
                .then(|result, _act, ctx| {
                    match result {
                        Ok(snapshot) => send(ctx, &ServerMessage::State { snapshot }),
                        Err(_) => send_err(ctx, ErrorCode::MatchNotFound, "match is no longer running"),
                    }
                    fut::ready(())
                });
            ctx.wait(resync);
            return;
        };

        let Some(slot) = self.seat else {
            send_err(ctx, ErrorCode::NotASeat, "spectators cannot submit moves");
            return;
        };

        // 응답을 받을 때까지 다음 무브를 보내지 않아 순서가 유지됩니다.
        let submitted = self
            .match_addr
            .send(SubmitMove {
                slot,
                base_version,
                mv,
            })
            .into_actor(self)
            .then(|result, _act, ctx| {
                match result {
                    Ok(Ok(outcome)) => send(
                        ctx,
                        &ServerMessage::MoveAccepted {
                            version: outcome.version,
                        },
                    ),
                    Ok(Err(e)) => send_move_error(ctx, e),
                    Err(e) => send_move_error(ctx, GameError::Mailbox(e)),
                }
                fut::ready(())
            });
        ctx.wait(submitted);
    }
}

impl Actor for GameSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            "GameSession {} started (match {}, seat {:?})",
            self.connection_id,
            self.match_id,
            self.seat.map(|s| s.as_str())
        );
        ACTIVE_WS_CONNECTIONS.inc();
        self.hb(ctx);
        self.subscribe(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("GameSession {} stopped", self.connection_id);
        ACTIVE_WS_CONNECTIONS.dec();
        self.match_addr.do_send(Unsubscribe {
            connection_id: self.connection_id,
        });
    }
}

impl Handler<SyncEvent> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: SyncEvent, ctx: &mut Self::Context) {
        match msg {
            SyncEvent::Snapshot(snapshot) => send(ctx, &ServerMessage::State { snapshot }),
            SyncEvent::Terminated {
                version,
                termination,
            } => send(
                ctx,
                &ServerMessage::GameOver {
                    winner: termination.winner,
                    reason: termination.reason,
                    version,
                },
            ),
            SyncEvent::Aborted { reason } => {
                send(ctx, &ServerMessage::MatchAborted { reason });
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("match aborted".into()),
                }));
                ctx.stop();
            }
            SyncEvent::Replaced => {
                send(ctx, &ServerMessage::Replaced);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some("replaced by a newer connection".into()),
                }));
                ctx.stop();
            }
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GameSession {
    fn handle(&mut self, item: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match item {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Websocket protocol error on {}: {}", self.connection_id, e);
                ctx.stop();
                return;
            }
        };

        match msg {
            ws::Message::Ping(bytes) => {
                self.hb = Instant::now();
                ctx.pong(&bytes);
            }
            ws::Message::Pong(_) => {
                self.hb = Instant::now();
            }
            ws::Message::Text(text) => {
                self.hb = Instant::now();
                self.handle_client_message(&text, ctx);
            }
            ws::Message::Binary(_) => {
                send_err(
                    ctx,
                    ErrorCode::InvalidMessageFormat,
                    "binary messages are not supported",
                );
            }
            ws::Message::Close(reason) => {
                info!("Connection {} closed by client: {:?}", self.connection_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) | ws::Message::Nop => {}
        }
    }
}
