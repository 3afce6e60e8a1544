use std::time::Duration;

use crate::utils::{CircuitBreakerConfig, RetryConfig};

// ============================================================================
// Configuration - environment driven
// ============================================================================
//
// Every setting has a default so a local run needs no environment at all.
// Values that are present but unparseable are errors, not silently ignored.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown repository backend {0:?} (expected postgres, scylla or memory)")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryBackend {
    Postgres,
    Scylla,
    Memory,
}

impl std::str::FromStr for RepositoryBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RepositoryBackend::Postgres),
            "scylla" | "scylladb" => Ok(RepositoryBackend::Scylla),
            "memory" | "in-memory" => Ok(RepositoryBackend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
    pub ssl: bool,
}

// Keeps the password out of logs
impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("has_password", &!self.password.is_empty())
            .field("max_connections", &self.max_connections)
            .field("idle_timeout", &self.idle_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("ssl", &self.ssl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub nodes: Vec<String>,
    pub keyspace: String,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: RepositoryBackend,
    pub postgres: PostgresConfig,
    pub scylla: ScyllaConfig,
    pub http_host: String,
    pub http_port: u16,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend: RepositoryBackend = get("REPOSITORY_BACKEND", "postgres").parse()?;

        let postgres = PostgresConfig {
            host: get("DB_HOST", "localhost"),
            port: parse("DB_PORT", get("DB_PORT", "5432"))?,
            database: get("DB_NAME", "customers_db"),
            user: get("DB_USER", "postgres"),
            password: get("DB_PASSWORD", "password"),
            max_connections: parse("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS", "2"))?,
            idle_timeout: Duration::from_millis(parse(
                "DB_IDLE_TIMEOUT_MS",
                get("DB_IDLE_TIMEOUT_MS", "30000"),
            )?),
            connect_timeout: Duration::from_millis(parse(
                "DB_CONNECT_TIMEOUT_MS",
                get("DB_CONNECT_TIMEOUT_MS", "2000"),
            )?),
            ssl: parse("DB_SSL", get("DB_SSL", "true"))?,
        };

        let scylla = ScyllaConfig {
            nodes: get("SCYLLA_NODES", "127.0.0.1:9042")
                .split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            keyspace: get("SCYLLA_KEYSPACE", "customers_ks"),
            table: get("SCYLLA_TABLE", "customers"),
        };

        let max_attempts: u32 = parse("REPOSITORY_MAX_ATTEMPTS", get("REPOSITORY_MAX_ATTEMPTS", "2"))?;
        let retry = RetryConfig::default().with_max_attempts(max_attempts);

        let circuit_breaker = CircuitBreakerConfig {
            failure_threshold: parse(
                "CIRCUIT_FAILURE_THRESHOLD",
                get("CIRCUIT_FAILURE_THRESHOLD", "5"),
            )?,
            open_timeout: Duration::from_secs(parse(
                "CIRCUIT_TIMEOUT_SECS",
                get("CIRCUIT_TIMEOUT_SECS", "30"),
            )?),
            ..CircuitBreakerConfig::default()
        };

        Ok(Self {
            backend,
            postgres,
            scylla,
            http_host: get("HTTP_HOST", "0.0.0.0"),
            http_port: parse("HTTP_PORT", get("HTTP_PORT", "8080"))?,
            retry,
            circuit_breaker,
        })
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value,
    })
}
