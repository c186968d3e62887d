use std::{sync::Arc, time::Instant};

use actix::{ActorContext, AsyncContext, Handler};
use tracing::{debug, info};

use super::messages::*;
use super::MatchActor;
use crate::{
    card::types::PlayerSlot,
    exception::{GameError, MoveError},
    game::moves::{MoveOutcome, TerminationReason},
    sync::snapshots::MatchSnapshot,
};

impl Handler<SubmitMove> for MatchActor {
    type Result = Result<MoveOutcome, GameError>;

    fn handle(&mut self, msg: SubmitMove, ctx: &mut Self::Context) -> Self::Result {
        if self.ai_seat == Some(msg.slot) {
            return Err(GameError::SeatReserved(msg.slot));
        }
        debug!(
            "match {}: {} from player {} at version {}",
            self.match_id,
            msg.mv.kind(),
            msg.slot,
            msg.base_version
        );
        self.submit(msg.slot, msg.base_version, msg.mv, ctx)
    }
}

impl Handler<Subscribe> for MatchActor {
    type Result = Result<Arc<MatchSnapshot>, GameError>;

    fn handle(&mut self, msg: Subscribe, ctx: &mut Self::Context) -> Self::Result {
        if let Some(corruption) = self.engine.corruption() {
            return Err(MoveError::Corrupted(corruption.clone()).into());
        }

        if let Some(seat) = msg.seat {
            if self.ai_seat == Some(seat) {
                return Err(GameError::SeatReserved(seat));
            }
            self.hub.evict_seat(seat);
            if let Some(handle) = self.disconnect_timers.remove(&seat) {
                info!(
                    "match {}: seat {} reconnected within the grace period",
                    self.match_id, seat
                );
                ctx.cancel_future(handle);
            }
        }

        self.last_activity = Instant::now();
        Ok(self.hub.subscribe(msg.connection_id, msg.seat, msg.recipient))
    }
}

impl Handler<Unsubscribe> for MatchActor {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, ctx: &mut Self::Context) {
        if let Some(Some(seat)) = self.hub.unsubscribe(msg.connection_id) {
            self.on_seat_disconnected(seat, ctx);
        }
    }
}

impl Handler<GetSnapshot> for MatchActor {
    type Result = Arc<MatchSnapshot>;

    fn handle(&mut self, _msg: GetSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        self.hub.latest()
    }
}

impl Handler<GetStatus> for MatchActor {
    type Result = MatchStatus;

    fn handle(&mut self, _msg: GetStatus, _ctx: &mut Self::Context) -> Self::Result {
        let state = self.engine.state();
        MatchStatus {
            match_id: self.match_id,
            version: state.version,
            phase: state.phase,
            turn_number: state.turn_number,
            current_player: state.current_player,
            winner: state.winner,
            termination: state.termination,
            vs_ai: self.ai_seat.is_some(),
            seed: state.seed,
            connected_seats: PlayerSlot::ALL
                .into_iter()
                .filter(|seat| self.hub.seat_connected(*seat))
                .collect(),
            subscribers: self.hub.subscriber_count(),
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }
}

impl Handler<Abandon> for MatchActor {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: Abandon, ctx: &mut Self::Context) -> Self::Result {
        if let Some(corruption) = self.engine.corruption() {
            return Err(MoveError::Corrupted(corruption.clone()).into());
        }
        if self.ai_seat == Some(msg.slot) {
            return Err(GameError::SeatReserved(msg.slot));
        }
        self.forfeit(msg.slot, TerminationReason::OpponentLeft, ctx);
        Ok(())
    }
}

impl Handler<Shutdown> for MatchActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        info!("match {}: shutdown requested", self.match_id);
        if !self.engine.is_over() {
            self.hub.announce_abort("server shutting down".into());
        }
        ctx.stop();
    }
}
