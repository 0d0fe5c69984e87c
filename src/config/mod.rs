//! Configuration management for policy_tracker
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments. A running crawl never reads [`Config`]
//! directly: it works on a [`CrawlJob`] snapshot taken when the crawl is triggered.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::crawler::source::{SourceKind, TableSpec};
use crate::utils::is_sql_identifier;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which site to crawl
    pub source: SourceConfig,

    /// Record store connection
    pub database: DatabaseConfig,

    /// HTTP client behaviour
    pub crawler: CrawlerConfig,

    /// Run size and recurrence
    pub schedule: ScheduleConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Source selection and optional overrides of the built-in profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Listing URL template with `{page}` and `{page_size}` placeholders
    pub listing_url: Option<String>,

    /// Base URL for relative detail links
    pub base_url: Option<String>,

    /// Entries requested per listing page
    pub page_size: Option<u32>,
}

/// Store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Postgres,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => anyhow::bail!("unknown database backend '{other}'"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,

    /// PostgreSQL server host
    pub host: String,

    /// PostgreSQL server port
    pub port: u16,

    pub user: String,

    pub password: String,

    /// PostgreSQL database name
    pub name: String,

    /// SQLite database path
    pub sqlite_path: PathBuf,

    /// Create the target table when opening a SQLite store
    pub create_schema: bool,

    /// Maximum PostgreSQL pool size
    pub pool_size: usize,

    /// Override of the source's table name
    pub table: Option<String>,

    /// Override of the source's content column
    pub content_column: Option<String>,
}

impl DatabaseConfig {
    /// Destination table: the source's default unless overridden
    pub fn table_spec(&self, default: &TableSpec) -> TableSpec {
        TableSpec {
            name: self.table.clone().unwrap_or_else(|| default.name.clone()),
            content_column: self
                .content_column
                .clone()
                .unwrap_or_else(|| default.content_column.clone()),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            host: String::from("localhost"),
            port: 5432,
            user: String::from("root"),
            password: String::new(),
            name: String::from("policy_tracker"),
            sqlite_path: PathBuf::from("data/policy_tracker.db"),
            create_schema: true,
            pool_size: 4,
            table: None,
            content_column: None,
        }
    }
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Rate limit (requests per second)
    pub rate_limit: f64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Extra attempts for recoverable detail-page failures
    pub detail_retries: u32,

    /// Base backoff delay between detail retries
    pub retry_base_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            rate_limit: 2.0,
            request_timeout_secs: 30,
            user_agent: format!("policy-tracker/{}", env!("CARGO_PKG_VERSION")),
            detail_retries: 0,
            retry_base_delay_ms: 1000,
        }
    }
}

/// Run size and recurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Days between scheduled runs
    pub interval_days: u32,

    /// Listing pages scanned per run
    pub page_count: u32,

    /// How often the scheduler checks whether a run is due
    pub check_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_days: 3,
            page_count: 5,
            check_interval_secs: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Immutable per-run snapshot of the settings a crawl depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub database: DatabaseConfig,
    pub page_count: u32,
    pub interval_days: u32,
}

impl CrawlJob {
    /// Time between scheduled runs
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_days) * 24 * 60 * 60)
    }
}

fn env_or(name: &str, default: impl Into<String>) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value for {name} ('{value}'): {e}")),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_NAME` and `CRAWL_INTERVAL_DAYS`
    /// keep their historical names; everything else uses the `PT_` prefix.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let source = SourceConfig {
            kind: env_parse::<SourceKind>("PT_SOURCE")?.unwrap_or_default(),
            listing_url: std::env::var("PT_LISTING_URL").ok(),
            base_url: std::env::var("PT_BASE_URL").ok(),
            page_size: env_parse("PT_PAGE_SIZE")?,
        };

        let database = DatabaseConfig {
            backend: env_parse("PT_DB_BACKEND")?.unwrap_or(defaults.database.backend),
            host: env_or("DB_HOST", defaults.database.host),
            port: env_parse("PT_DB_PORT")?.unwrap_or(defaults.database.port),
            user: env_or("DB_USER", defaults.database.user),
            password: env_or("DB_PASSWORD", defaults.database.password),
            name: env_or("DB_NAME", defaults.database.name),
            sqlite_path: std::env::var("PT_SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database.sqlite_path),
            create_schema: env_parse("PT_DB_CREATE_SCHEMA")?
                .unwrap_or(defaults.database.create_schema),
            pool_size: env_parse("PT_DB_POOL_SIZE")?.unwrap_or(defaults.database.pool_size),
            table: std::env::var("PT_DB_TABLE").ok(),
            content_column: std::env::var("PT_DB_CONTENT_COLUMN").ok(),
        };

        let crawler = CrawlerConfig {
            rate_limit: env_parse("PT_RATE_LIMIT")?.unwrap_or(defaults.crawler.rate_limit),
            request_timeout_secs: env_parse("PT_REQUEST_TIMEOUT")?
                .unwrap_or(defaults.crawler.request_timeout_secs),
            user_agent: env_or("PT_USER_AGENT", defaults.crawler.user_agent),
            detail_retries: env_parse("PT_DETAIL_RETRIES")?
                .unwrap_or(defaults.crawler.detail_retries),
            retry_base_delay_ms: defaults.crawler.retry_base_delay_ms,
        };

        let schedule = ScheduleConfig {
            interval_days: env_parse("CRAWL_INTERVAL_DAYS")?
                .unwrap_or(defaults.schedule.interval_days),
            page_count: env_parse("PT_PAGE_COUNT")?.unwrap_or(defaults.schedule.page_count),
            check_interval_secs: defaults.schedule.check_interval_secs,
        };

        let logging = LoggingConfig {
            level: env_or("PT_LOG_LEVEL", defaults.logging.level),
            format: env_or("PT_LOG_FORMAT", defaults.logging.format),
        };

        Ok(Self {
            source,
            database,
            crawler,
            schedule,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.schedule.page_count == 0 {
            anyhow::bail!("page_count must be greater than 0");
        }

        if self.schedule.interval_days == 0 {
            anyhow::bail!("interval_days must be greater than 0");
        }

        if self.schedule.check_interval_secs == 0 {
            anyhow::bail!("check_interval_secs must be greater than 0");
        }

        if self.crawler.rate_limit <= 0.0 || !self.crawler.rate_limit.is_finite() {
            anyhow::bail!("rate_limit must be positive");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.source.page_size == Some(0) {
            anyhow::bail!("page_size must be greater than 0");
        }

        if self.database.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        for (field, value) in [
            ("table", &self.database.table),
            ("content_column", &self.database.content_column),
        ] {
            if let Some(name) = value {
                if !is_sql_identifier(name) {
                    anyhow::bail!("database.{field} '{name}' is not a plain SQL identifier");
                }
            }
        }

        Ok(())
    }

    /// Snapshot the settings a crawl run depends on
    #[must_use]
    pub fn job(&self) -> CrawlJob {
        CrawlJob {
            database: self.database.clone(),
            page_count: self.schedule.page_count,
            interval_days: self.schedule.interval_days,
        }
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Get the scheduler's due-check period as Duration
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.check_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule.page_count, 5);
        assert_eq!(config.schedule.interval_days, 3);
        assert_eq!(config.database.user, "root");
    }

    #[test]
    fn test_zero_page_count_is_rejected() {
        let mut config = Config::default();
        config.schedule.page_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_table_override_must_be_identifier() {
        let mut config = Config::default();
        config.database.table = Some("reports; DROP TABLE x".to_string());
        assert!(config.validate().is_err());

        config.database.table = Some("reports_2024".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_job_snapshot_is_detached() {
        let mut config = Config::default();
        let job = config.job();
        config.schedule.page_count = 99;
        config.database.name = "other".to_string();

        assert_eq!(job.page_count, 5);
        assert_eq!(job.database.name, "policy_tracker");
        assert_eq!(job.interval(), Duration::from_secs(3 * 86_400));
    }

    #[test]
    fn test_table_spec_overrides() {
        let default = TableSpec::new("control_yuan_reports", "content");
        let mut db = DatabaseConfig::default();
        assert_eq!(db.table_spec(&default), default);

        db.content_column = Some("body".to_string());
        let spec = db.table_spec(&default);
        assert_eq!(spec.name, "control_yuan_reports");
        assert_eq!(spec.content_column, "body");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            kind = "nhrc"

            [schedule]
            page_count = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.source.kind, SourceKind::Nhrc);
        assert_eq!(config.schedule.page_count, 2);
        assert_eq!(config.schedule.interval_days, 3);
        assert_eq!(config.database.backend, Backend::Sqlite);
    }
}
