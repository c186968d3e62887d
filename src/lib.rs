use std::io;

use actix::Addr;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{env::Settings, server::registry::MatchRegistry};

pub mod ai;
pub mod card;
pub mod env;
pub mod exception;
pub mod game;
pub mod metrics;
pub mod server;
pub mod sync;

/// 전역 tracing subscriber 의 수명을 붙잡고 있는 핸들.
/// 드롭되면 파일 쓰기 스레드가 남은 로그를 비우고 끝납니다.
pub struct LoggerManager {
    _guard: WorkerGuard,
}

impl LoggerManager {
    /// 콘솔(pretty)과 일 단위 로그 파일에 함께 기록하는 subscriber 를 설치합니다.
    pub fn setup(settings: &Settings) -> Self {
        let logging = &settings.logging;
        let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(
            &logging.directory,
            &logging.filename,
        ));

        let console = fmt::layer()
            .with_writer(io::stdout)
            .with_target(false)
            .with_line_number(true)
            .pretty();
        let file = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(log_filter(&settings.server.log_level))
            .with(console)
            .with(file)
            .init();

        tracing::info!(
            "Logging to console and {}/{} (level {})",
            logging.directory,
            logging.filename,
            settings.server.log_level
        );

        Self { _guard: guard }
    }
}

/// RUST_LOG 가 있으면 그것을, 없으면 설정 파일의 레벨을 씁니다.
fn log_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

// HTTP 핸들러들이 공유하는 상태
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub registry: Addr<MatchRegistry>,
    pub metrics_registry: prometheus::Registry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_falls_back_to_configured_level() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter("warn").to_string(), "warn");
    }
}
