use clap::{Parser, ValueEnum};
use linkhop_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "LINKHOP_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "LINKHOP_STORAGE_BACKEND";
pub const POSTGRES_DSN_ENV: &str = "LINKHOP_POSTGRES_DSN";
pub const POSTGRES_MAX_CONNECTIONS_ENV: &str = "LINKHOP_POSTGRES_MAX_CONNECTIONS";
pub const CACHE_BACKEND_ENV: &str = "LINKHOP_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "LINKHOP_REDIS_URL";
pub const MAX_SHORTEN_ATTEMPTS_ENV: &str = "LINKHOP_MAX_SHORTEN_ATTEMPTS";
pub const ANALYTICS_TIMEOUT_MS_ENV: &str = "LINKHOP_ANALYTICS_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "LINKHOP_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "LINKHOP_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "postgres")]
    Postgres,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::InMemory => write!(f, "in-memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linkhop-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = POSTGRES_DSN_ENV, required_if_eq("storage", "postgres"))]
    pub postgres_dsn: Option<String>,

    #[arg(long, env = POSTGRES_MAX_CONNECTIONS_ENV, default_value_t = 20)]
    pub postgres_max_connections: u32,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::InMemory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    /// Codes tried per shorten request before giving up. Zero counts as one.
    #[arg(
        long,
        env = MAX_SHORTEN_ATTEMPTS_ENV,
        default_value_t = linkhop_shortener::DEFAULT_MAX_ATTEMPTS
    )]
    pub max_shorten_attempts: usize,

    #[arg(long, env = ANALYTICS_TIMEOUT_MS_ENV, default_value_t = 300)]
    pub analytics_timeout_ms: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = CLI::try_parse_from(["linkhop-gateway"]).unwrap();

        assert_eq!(cli.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.cache, CacheBackendArg::InMemory);
        assert_eq!(cli.max_shorten_attempts, 5);
        assert_eq!(cli.analytics_timeout_ms, 300);
        assert_eq!(cli.postgres_max_connections, 20);
        assert!(cli.otlp_endpoint.is_none());
    }

    #[test]
    fn postgres_requires_dsn() {
        assert!(CLI::try_parse_from(["linkhop-gateway", "--storage", "postgres"]).is_err());

        let cli = CLI::try_parse_from([
            "linkhop-gateway",
            "--storage",
            "postgres",
            "--postgres-dsn",
            "postgres://linkhop@localhost/linkhop",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageBackendArg::Postgres);
    }

    #[test]
    fn parses_backends_and_log_format() {
        let cli = CLI::try_parse_from([
            "linkhop-gateway",
            "--cache",
            "redis",
            "--redis-url",
            "redis://cache:6379",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.cache, CacheBackendArg::Redis);
        assert_eq!(cli.redis_url, "redis://cache:6379");
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
    }
}
