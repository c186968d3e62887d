use lazy_static::lazy_static;
use prometheus::{opts, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    // 기본 레지스트리에 자동 등록하지 않고, register_custom_metrics 에서 수동으로 등록합니다.

    /// Total number of matches created.
    pub static ref MATCHES_CREATED_TOTAL: IntCounter =
        IntCounter::with_opts(opts!("matches_created_total", "Total number of matches created")).unwrap();

    /// Matches currently held by the registry.
    pub static ref ACTIVE_MATCHES: IntGauge =
        IntGauge::with_opts(opts!("active_matches", "Number of matches currently alive")).unwrap();

    /// Active websocket connections.
    pub static ref ACTIVE_WS_CONNECTIONS: IntGauge =
        IntGauge::with_opts(opts!("active_ws_connections", "Number of active websocket connections")).unwrap();

    pub static ref MOVES_APPLIED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("moves_applied_total", "Accepted moves by kind"),
        &["kind"],
    )
    .unwrap();

    pub static ref MOVES_REJECTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("moves_rejected_total", "Rejected moves by reason"),
        &["reason"],
    )
    .unwrap();

    pub static ref MATCHES_FINISHED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("matches_finished_total", "Finished matches by termination reason"),
        &["reason"],
    )
    .unwrap();

    /// Matches aborted because of a broken invariant.
    pub static ref MATCHES_CORRUPTED_TOTAL: IntCounter =
        IntCounter::with_opts(opts!("matches_corrupted_total", "Matches aborted after an invariant violation")).unwrap();

    /// Turns skipped automatically (all frozen / exhausted).
    pub static ref TURNS_SKIPPED_TOTAL: IntCounter =
        IntCounter::with_opts(opts!("turns_skipped_total", "Turns skipped because the player could not act")).unwrap();

    pub static ref MATCH_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "match_duration_seconds",
            "Wall-clock time from match creation to termination (seconds)",
        )
        .buckets(vec![10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0, 1800.0]),
    )
    .unwrap();
}

pub fn register_custom_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(MATCHES_CREATED_TOTAL.clone()))?;
    registry.register(Box::new(ACTIVE_MATCHES.clone()))?;
    registry.register(Box::new(ACTIVE_WS_CONNECTIONS.clone()))?;
    registry.register(Box::new(MOVES_APPLIED_TOTAL.clone()))?;
    registry.register(Box::new(MOVES_REJECTED_TOTAL.clone()))?;
    registry.register(Box::new(MATCHES_FINISHED_TOTAL.clone()))?;
    registry.register(Box::new(MATCHES_CORRUPTED_TOTAL.clone()))?;
    registry.register(Box::new(TURNS_SKIPPED_TOTAL.clone()))?;
    registry.register(Box::new(MATCH_DURATION_SECONDS.clone()))?;
    Ok(())
}
