use actix::{Actor, Addr, AsyncContext, Handler};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::messages::*;
use super::{MatchEntry, MatchRegistry};
use crate::{
    exception::GameError,
    game::determinism,
    metrics::{ACTIVE_MATCHES, MATCHES_CREATED_TOTAL},
    server::match_actor::{messages::Shutdown, MatchActor},
};

impl Handler<CreateMatch> for MatchRegistry {
    type Result = Result<CreatedMatch, GameError>;

    fn handle(&mut self, msg: CreateMatch, ctx: &mut Self::Context) -> Self::Result {
        let match_id = Uuid::new_v4();
        let seed = msg
            .seed
            .unwrap_or_else(|| determinism::seed_from_match_id(match_id));

        let addr = MatchActor::new(
            match_id,
            seed,
            msg.vs_ai,
            self.battle.clone(),
            self.cleanup.clone(),
            Some(ctx.address().recipient()),
        )
        .start();

        self.matches.insert(
            match_id,
            MatchEntry {
                addr,
                seed,
                vs_ai: msg.vs_ai,
                created_at: Utc::now(),
            },
        );
        MATCHES_CREATED_TOTAL.inc();
        ACTIVE_MATCHES.set(self.matches.len() as i64);

        info!(
            "Match {} created (vs_ai: {}, seed: {})",
            match_id, msg.vs_ai, seed
        );
        Ok(CreatedMatch {
            match_id,
            seed,
            vs_ai: msg.vs_ai,
        })
    }
}

impl Handler<FindMatch> for MatchRegistry {
    type Result = Result<Addr<MatchActor>, GameError>;

    fn handle(&mut self, msg: FindMatch, _ctx: &mut Self::Context) -> Self::Result {
        self.matches
            .get(&msg.match_id)
            .filter(|entry| entry.addr.connected())
            .map(|entry| entry.addr.clone())
            .ok_or(GameError::MatchNotFound(msg.match_id))
    }
}

impl Handler<MatchClosed> for MatchRegistry {
    type Result = ();

    fn handle(&mut self, msg: MatchClosed, _ctx: &mut Self::Context) {
        if self.matches.remove(&msg.match_id).is_some() {
            info!("Match {} removed from registry", msg.match_id);
        }
        ACTIVE_MATCHES.set(self.matches.len() as i64);
    }
}

impl Handler<ListMatches> for MatchRegistry {
    type Result = Vec<MatchSummary>;

    fn handle(&mut self, _msg: ListMatches, _ctx: &mut Self::Context) -> Self::Result {
        let mut summaries: Vec<MatchSummary> = self
            .matches
            .iter()
            .map(|(match_id, entry)| MatchSummary {
                match_id: *match_id,
                seed: entry.seed,
                vs_ai: entry.vs_ai,
                created_at: entry.created_at,
            })
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }
}

impl Handler<CloseAll> for MatchRegistry {
    type Result = ();

    fn handle(&mut self, _msg: CloseAll, _ctx: &mut Self::Context) {
        info!("Closing {} matches", self.matches.len());
        for entry in self.matches.values() {
            entry.addr.do_send(Shutdown);
        }
    }
}
