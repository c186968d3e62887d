use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::game::rules::{AbilityUsePolicy, RuleSet};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub battle: BattleSettings,
    #[serde(default)]
    pub cleanup: CleanupSettings,
}

impl Settings {
    /// `RUN_MODE` 환경 변수(기본 development)에 맞는 설정 파일을 읽습니다.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load(&run_mode)
    }

    pub fn load(run_mode: &str) -> Result<Self, ConfigError> {
        println!("Loading configuration for RUN_MODE: {}", run_mode);

        let s = Config::builder()
            // config/development.toml, config/production.toml ...
            .add_source(
                File::with_name(&format!("config/{}", run_mode))
                    .format(FileFormat::Toml)
                    .required(true),
            )
            // 예: APP_SERVER__PORT=8000
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate().map_err(ConfigError::Message)?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.battle.max_team_size == 0 {
            return Err("battle.max_team_size must be at least 1".into());
        }
        if self.session.heartbeat_interval_seconds == 0 {
            return Err("session.heartbeat_interval_seconds must be positive".into());
        }
        if self.session.client_timeout_seconds <= self.session.heartbeat_interval_seconds {
            return Err(format!(
                "session.client_timeout_seconds ({}) must exceed heartbeat_interval_seconds ({})",
                self.session.client_timeout_seconds, self.session.heartbeat_interval_seconds
            ));
        }
        if self.cleanup.interval_seconds == 0 {
            return Err("cleanup.interval_seconds must be positive".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub metrics_auth_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            port: 8080,
            log_level: "info".into(),
            metrics_auth_token: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub directory: String,
    pub filename: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: "logs".into(),
            filename: "toybox_battle.log".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionSettings {
    pub heartbeat_interval_seconds: u64,
    pub client_timeout_seconds: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: 5,
            client_timeout_seconds: 15,
        }
    }
}

/// `[battle]` 섹션. 코어 엔진의 규칙과 매치 액터의 정책 값을 담습니다.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BattleSettings {
    pub max_team_size: usize,
    pub ability_use_policy: AbilityUsePolicy,
    pub enforce_pending_ability: bool,
    /// 0 이면 턴 시간 제한 없음
    pub turn_timeout_seconds: u64,
    /// 0 이면 연결이 끊기는 즉시 패배 처리
    pub disconnect_grace_seconds: u64,
    pub ai_move_delay_ms: u64,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            max_team_size: 4,
            ability_use_policy: AbilityUsePolicy::Unlimited,
            enforce_pending_ability: true,
            turn_timeout_seconds: 0,
            disconnect_grace_seconds: 30,
            ai_move_delay_ms: 800,
        }
    }
}

impl From<&BattleSettings> for RuleSet {
    fn from(battle: &BattleSettings) -> Self {
        RuleSet {
            max_team_size: battle.max_team_size,
            ability_use_policy: battle.ability_use_policy,
            enforce_pending_ability: battle.enforce_pending_ability,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CleanupSettings {
    pub interval_seconds: u64,
    pub finished_match_ttl_seconds: u64,
    pub idle_match_ttl_seconds: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            finished_match_ttl_seconds: 300,
            idle_match_ttl_seconds: 1800,
        }
    }
}
