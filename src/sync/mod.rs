//! 동기화 계층
//!
//! 상태가 바뀔 때마다 불변 스냅샷을 하나 만들고, 같은 스냅샷을 모든 구독자에게 보냅니다.
//! 늦게 들어온 구독자는 이력 대신 현재 스냅샷을 받습니다.

pub mod messages;
pub mod snapshots;

use std::{collections::HashMap, sync::Arc};

use actix::Recipient;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{card::types::PlayerSlot, game::moves::Termination};

use messages::SyncEvent;
use snapshots::MatchSnapshot;

struct Subscriber {
    /// 좌석 연결이면 Some, 관전자면 None
    seat: Option<PlayerSlot>,
    recipient: Recipient<SyncEvent>,
}

/// 한 매치의 구독자 목록과 마지막으로 공개된 스냅샷
pub struct SyncHub {
    match_id: Uuid,
    subscribers: HashMap<Uuid, Subscriber>,
    latest: Arc<MatchSnapshot>,
}

impl SyncHub {
    pub fn new(initial: MatchSnapshot) -> Self {
        Self {
            match_id: initial.match_id,
            subscribers: HashMap::new(),
            latest: Arc::new(initial),
        }
    }

    /// 구독자를 등록하고 현재 스냅샷을 바로 보냅니다.
    pub fn subscribe(
        &mut self,
        connection_id: Uuid,
        seat: Option<PlayerSlot>,
        recipient: Recipient<SyncEvent>,
    ) -> Arc<MatchSnapshot> {
        info!(
            "match {}: connection {} subscribed (seat {:?}) at version {}",
            self.match_id,
            connection_id,
            seat.map(|s| s.as_str()),
            self.latest.version
        );
        recipient.do_send(SyncEvent::Snapshot(self.latest.clone()));
        self.subscribers
            .insert(connection_id, Subscriber { seat, recipient });
        self.latest.clone()
    }

    /// 구독을 해제하고, 좌석 연결이었다면 그 좌석을 돌려줍니다.
    pub fn unsubscribe(&mut self, connection_id: Uuid) -> Option<Option<PlayerSlot>> {
        let removed = self.subscribers.remove(&connection_id)?;
        debug!(
            "match {}: connection {} unsubscribed",
            self.match_id, connection_id
        );
        Some(removed.seat)
    }

    /// 좌석에 붙어 있던 기존 연결을 떼어 내고 `Replaced` 를 알립니다.
    /// 한 좌석에는 항상 최대 하나의 연결만 남습니다.
    pub fn evict_seat(&mut self, seat: PlayerSlot) -> Vec<Uuid> {
        let evicted: Vec<Uuid> = self
            .subscribers
            .iter()
            .filter(|(_, s)| s.seat == Some(seat))
            .map(|(id, _)| *id)
            .collect();

        for connection_id in &evicted {
            if let Some(old) = self.subscribers.remove(connection_id) {
                info!(
                    "match {}: connection {} replaced on seat {}",
                    self.match_id, connection_id, seat
                );
                old.recipient.do_send(SyncEvent::Replaced);
            }
        }
        evicted
    }

    /// 해당 좌석에 연결된 구독자가 있는지
    pub fn seat_connected(&self, seat: PlayerSlot) -> bool {
        self.subscribers.values().any(|s| s.seat == Some(seat))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn latest(&self) -> Arc<MatchSnapshot> {
        self.latest.clone()
    }

    /// 새 스냅샷을 공개합니다. 이전 버전 이하의 스냅샷은 무시합니다.
    pub fn publish(&mut self, snapshot: MatchSnapshot) -> Arc<MatchSnapshot> {
        if snapshot.version <= self.latest.version {
            warn!(
                "match {}: refusing to publish version {} over {}",
                self.match_id, snapshot.version, self.latest.version
            );
            return self.latest.clone();
        }
        self.latest = Arc::new(snapshot);
        self.broadcast(SyncEvent::Snapshot(self.latest.clone()));
        self.latest.clone()
    }

    pub fn announce_termination(&self, termination: Termination) {
        self.broadcast(SyncEvent::Terminated {
            version: self.latest.version,
            termination,
        });
    }

    pub fn announce_abort(&self, reason: String) {
        self.broadcast(SyncEvent::Aborted { reason });
    }

    fn broadcast(&self, event: SyncEvent) {
        for (connection_id, subscriber) in &self.subscribers {
            if subscriber.recipient.connected() {
                subscriber.recipient.do_send(event.clone());
            } else {
                warn!(
                    "match {}: subscriber {} is gone, skipping",
                    self.match_id, connection_id
                );
            }
        }
    }
}
