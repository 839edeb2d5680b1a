//! Runtime configuration loaded from the environment.
//!
//! Every knob has a default so a bare `EngineConfig::from_env()` works
//! against a local broker. Kubernetes-managed deployments override these
//! through pod env vars.
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default pool of display names handed out to players in order.
const DEFAULT_PLAYER_NAMES: &[&str] = &[
    "Gilbert McDonald",
    "Dorothy Bird",
    "Ernest Preston",
    "Vincent Schultz",
    "Joanne Sloan",
    "Lana Moran",
    "Adrienne Fuller",
    "Greg Bennett",
    "Curt Simon",
    "Rachel McMillan",
    "Dustin Eastman",
    "Willard Mendez",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("no kafka brokers configured (KAFKA_BROKERS)")]
    NoBrokers,

    #[error("player name pool must not be empty (PLAYER_NAMES)")]
    EmptyNamePool,

    #[error("{key} must be > 0")]
    NonPositive { key: &'static str },

    #[error("GAME_MAX_PLAYERS must be >= GAME_MIN_PLAYERS")]
    MaxBelowMin,

    #[error("{key} must not be empty")]
    EmptyValue { key: &'static str },

    #[error("unknown AGENT_MODE {0:?} (expected \"mock\" or \"llm\")")]
    UnknownAgentMode(String),
}

/// How agent workers are driven. The engine only records the mode; the
/// orchestrator decides what to spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentMode {
    Mock,
    Llm,
}

impl AgentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentMode::Mock => "mock",
            AgentMode::Llm => "llm",
        }
    }
}

impl FromStr for AgentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mock" => Ok(AgentMode::Mock),
            "llm" => Ok(AgentMode::Llm),
            other => Err(ConfigError::UnknownAgentMode(other.to_string())),
        }
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All runtime knobs for the engine process.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Kafka bootstrap servers. `KAFKA_BROKERS="b1:9092,b2:9092"`
    pub kafka_brokers: Vec<String>,
    /// `KAFKA_CLIENT_ID`
    pub kafka_client_id: String,
    /// `KAFKA_GROUP_ID`
    pub kafka_group_id: String,

    /// Outbound authoritative events. `ENGINE_EVENTS_TOPIC`
    pub engine_events_topic: String,
    /// Inbound player intents. `PLAYER_ACTIONS_TOPIC`
    pub player_actions_topic: String,

    /// `KAFKA_CONSUMER_TIMEOUT_SECS`
    pub consumer_timeout: Duration,
    /// `KAFKA_PRODUCER_TIMEOUT_SECS`
    pub producer_timeout: Duration,
    /// Timeout for outbound HTTP calls (e.g. inference). `HTTP_TIMEOUT_SECS`
    pub http_timeout: Duration,

    /// `GAME_MIN_PLAYERS` / `GAME_MAX_PLAYERS`
    pub min_players: usize,
    pub max_players: usize,
    /// `GAME_ID_PREFIX`
    pub game_id_prefix: String,
    /// `PLAYER_NAMES` (comma-separated)
    pub player_names: Vec<String>,

    /// Phase timeouts. `NIGHT_PHASE_SECS` / `DAY_PHASE_SECS` / `VOTING_PHASE_SECS`
    pub night_duration: Duration,
    pub day_duration: Duration,
    pub voting_duration: Duration,

    /// `AGENT_MODE` ("mock" or "llm")
    pub agent_mode: AgentMode,
    /// `LOG_LEVEL`
    pub log_level: String,
    /// `ENV` (dev/prod label for logs)
    pub env: String,
    /// `ENABLE_ROLE_SECRETS`
    pub enable_role_secrets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kafka_brokers: vec!["localhost:9092".to_string()],
            kafka_client_id: "mafia-engine".to_string(),
            kafka_group_id: "mafia-engine-group".to_string(),
            engine_events_topic: crate::kafka::ENGINE_EVENTS_TOPIC.to_string(),
            player_actions_topic: crate::kafka::PLAYER_ACTIONS_TOPIC.to_string(),
            consumer_timeout: Duration::from_secs(2),
            producer_timeout: Duration::from_secs(2),
            http_timeout: Duration::from_secs(5),
            min_players: 6,
            max_players: 12,
            game_id_prefix: "game".to_string(),
            player_names: DEFAULT_PLAYER_NAMES.iter().map(|s| s.to_string()).collect(),
            night_duration: Duration::from_secs(90),
            day_duration: Duration::from_secs(120),
            voting_duration: Duration::from_secs(60),
            agent_mode: AgentMode::Mock,
            log_level: "info".to_string(),
            env: "dev".to_string(),
            enable_role_secrets: false,
        }
    }
}

impl EngineConfig {
    /// Reads configuration from environment variables, applies defaults, and
    /// validates the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(brokers) = read_env_trimmed("KAFKA_BROKERS") {
            config.kafka_brokers = parse_comma_list(&brokers);
        }
        if let Some(id) = read_env_trimmed("KAFKA_CLIENT_ID") {
            config.kafka_client_id = id;
        }
        if let Some(group) = read_env_trimmed("KAFKA_GROUP_ID") {
            config.kafka_group_id = group;
        }
        if let Some(topic) = read_env_trimmed("ENGINE_EVENTS_TOPIC") {
            config.engine_events_topic = topic;
        }
        if let Some(topic) = read_env_trimmed("PLAYER_ACTIONS_TOPIC") {
            config.player_actions_topic = topic;
        }

        if let Some(secs) = read_env_parsed::<u64>("KAFKA_CONSUMER_TIMEOUT_SECS")? {
            config.consumer_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_parsed::<u64>("KAFKA_PRODUCER_TIMEOUT_SECS")? {
            config.producer_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_parsed::<u64>("HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(min) = read_env_parsed::<usize>("GAME_MIN_PLAYERS")? {
            config.min_players = min;
        }
        if let Some(max) = read_env_parsed::<usize>("GAME_MAX_PLAYERS")? {
            config.max_players = max;
        }
        if let Some(prefix) = read_env_trimmed("GAME_ID_PREFIX") {
            config.game_id_prefix = prefix;
        }
        if let Some(names) = read_env_trimmed("PLAYER_NAMES") {
            config.player_names = parse_comma_list(&names);
        }

        if let Some(secs) = read_env_parsed::<u64>("NIGHT_PHASE_SECS")? {
            config.night_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_parsed::<u64>("DAY_PHASE_SECS")? {
            config.day_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_parsed::<u64>("VOTING_PHASE_SECS")? {
            config.voting_duration = Duration::from_secs(secs);
        }

        if let Some(mode) = read_env_trimmed("AGENT_MODE") {
            config.agent_mode = mode.parse()?;
        }
        if let Some(level) = read_env_trimmed("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(env_label) = read_env_trimmed("ENV") {
            config.env = env_label;
        }
        if let Some(flag) = read_env_trimmed("ENABLE_ROLE_SECRETS") {
            config.enable_role_secrets = flag.parse().map_err(|_| ConfigError::Invalid {
                key: "ENABLE_ROLE_SECRETS",
                value: flag,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks config sanity; called by [`Self::from_env`] and tests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kafka_brokers.is_empty() {
            return Err(ConfigError::NoBrokers);
        }
        if self.engine_events_topic.is_empty() {
            return Err(ConfigError::EmptyValue {
                key: "ENGINE_EVENTS_TOPIC",
            });
        }
        if self.player_actions_topic.is_empty() {
            return Err(ConfigError::EmptyValue {
                key: "PLAYER_ACTIONS_TOPIC",
            });
        }
        if self.consumer_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                key: "KAFKA_CONSUMER_TIMEOUT_SECS",
            });
        }
        if self.producer_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                key: "KAFKA_PRODUCER_TIMEOUT_SECS",
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                key: "HTTP_TIMEOUT_SECS",
            });
        }
        if self.min_players == 0 {
            return Err(ConfigError::NonPositive {
                key: "GAME_MIN_PLAYERS",
            });
        }
        if self.max_players < self.min_players {
            return Err(ConfigError::MaxBelowMin);
        }
        if self.player_names.is_empty() {
            return Err(ConfigError::EmptyNamePool);
        }
        if self.night_duration.is_zero() {
            return Err(ConfigError::NonPositive {
                key: "NIGHT_PHASE_SECS",
            });
        }
        if self.day_duration.is_zero() {
            return Err(ConfigError::NonPositive {
                key: "DAY_PHASE_SECS",
            });
        }
        if self.voting_duration.is_zero() {
            return Err(ConfigError::NonPositive {
                key: "VOTING_PHASE_SECS",
            });
        }
        Ok(())
    }
}

fn read_env_trimmed(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn read_env_parsed<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    match read_env_trimmed(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(None),
    }
}

fn parse_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
