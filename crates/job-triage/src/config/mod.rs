use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::search::{SearchQuery, SortOrder};
use crate::workflows::triage::{
    DEFAULT_PURGE_THRESHOLD, DEFAULT_RELEVANCE_KEYWORDS, DEFAULT_STORAGE_KEY,
};

const DEFAULT_API_URL: &str = "https://api.adzuna.com/v1/api/jobs/gb/search/1";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub search: SearchConfig,
    pub triage: TriageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let search = SearchConfig {
            api_url: var_or("ADZUNA_API_URL", DEFAULT_API_URL),
            app_id: var_or("ADZUNA_APP_ID", ""),
            app_key: var_or("ADZUNA_APP_KEY", ""),
            what: var_or("SEARCH_WHAT", "Frontend Developer"),
            location: var_or("SEARCH_WHERE", "London"),
            results_per_page: parse_number("SEARCH_RESULTS_PER_PAGE", 100)?,
        };

        let relevance_keywords = match env::var("TRIAGE_RELEVANCE_KEYWORDS") {
            Ok(raw) => split_keywords(&raw),
            Err(_) => DEFAULT_RELEVANCE_KEYWORDS
                .iter()
                .map(|keyword| keyword.to_string())
                .collect(),
        };

        let triage = TriageConfig {
            relevance_keywords,
            purge_threshold: parse_number("TRIAGE_PURGE_THRESHOLD", DEFAULT_PURGE_THRESHOLD)?,
            storage_key: var_or("TRIAGE_STORAGE_KEY", DEFAULT_STORAGE_KEY),
            data_dir: PathBuf::from(var_or("TRIAGE_DATA_DIR", ".job-triage")),
            refresh_interval: Duration::from_secs(parse_number(
                "TRIAGE_REFRESH_INTERVAL_SECS",
                3600,
            )?),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            search,
            triage,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Upstream job search endpoint and query.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_url: String,
    pub app_id: String,
    pub app_key: String,
    pub what: String,
    pub location: String,
    pub results_per_page: u32,
}

impl SearchConfig {
    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            what: self.what.clone(),
            location: self.location.clone(),
            results_per_page: self.results_per_page,
            sort_by: SortOrder::Date,
        }
    }
}

/// Classification, persistence and refresh settings.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub relevance_keywords: Vec<String>,
    pub purge_threshold: usize,
    pub storage_key: String,
    pub data_dir: PathBuf,
    pub refresh_interval: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{name} must be a non-negative integer (got '{value}')")]
    InvalidNumber { name: &'static str, value: String },
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_number<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}
