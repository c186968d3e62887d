//! 매치 레지스트리
//!
//! 매치 id 로 매치 액터를 찾아 주고, 멈춘 매치를 목록에서 지웁니다.

use std::{collections::HashMap, time::Duration};

use actix::{Actor, Addr, AsyncContext, Context};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    env::{BattleSettings, CleanupSettings},
    metrics::ACTIVE_MATCHES,
    server::match_actor::MatchActor,
};

pub mod handlers;
pub mod messages;

struct MatchEntry {
    addr: Addr<MatchActor>,
    seed: u64,
    vs_ai: bool,
    created_at: DateTime<Utc>,
}

pub struct MatchRegistry {
    matches: HashMap<Uuid, MatchEntry>,
    battle: BattleSettings,
    cleanup: CleanupSettings,
}

impl MatchRegistry {
    pub fn new(battle: BattleSettings, cleanup: CleanupSettings) -> Self {
        Self {
            matches: HashMap::new(),
            battle,
            cleanup,
        }
    }

    /// 이미 멈췄지만 MatchClosed 가 도착하지 않은 항목을 정리합니다.
    fn prune(&mut self) {
        let before = self.matches.len();
        self.matches.retain(|_, entry| entry.addr.connected());
        let removed = before - self.matches.len();
        if removed > 0 {
            debug!("MatchRegistry pruned {} stopped matches", removed);
        }
        ACTIVE_MATCHES.set(self.matches.len() as i64);
    }
}

impl Actor for MatchRegistry {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("MatchRegistry started");
        ctx.run_interval(
            Duration::from_secs(self.cleanup.interval_seconds),
            |act, _ctx| act.prune(),
        );
    }
}
