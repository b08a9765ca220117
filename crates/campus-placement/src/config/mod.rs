use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::placement::{PlacementPolicy, TransitionPolicy, DEFAULT_NOTIFICATION_THRESHOLD};

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
    pub placement: PlacementPolicy,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let notification_threshold = match env::var("PLACEMENT_NOTIFY_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => DEFAULT_NOTIFICATION_THRESHOLD,
        };
        let transition_policy = match env::var("PLACEMENT_STATUS_POLICY") {
            Ok(raw) => {
                TransitionPolicy::parse(&raw).ok_or(ConfigError::InvalidStatusPolicy(raw))?
            }
            Err(_) => TransitionPolicy::default(),
        };

        let from_address =
            env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            placement: PlacementPolicy::new(notification_threshold, transition_policy),
            mail: MailConfig { from_address },
        })
    }
}

fn parse_threshold(raw: &str) -> Result<f32, ConfigError> {
    let value = raw
        .trim()
        .parse::<f32>()
        .map_err(|_| ConfigError::InvalidThreshold(raw.to_string()))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold(raw.to_string()));
    }
    Ok(value)
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub const DEFAULT_MAIL_FROM: &str = "placements@campus.local";

/// Outbound mail identity used by the notification worker.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_address: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidThreshold(String),
    InvalidStatusPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{value}'")
            }
            ConfigError::InvalidThreshold(value) => write!(
                f,
                "PLACEMENT_NOTIFY_THRESHOLD must be a number between 0 and 1, got '{value}'"
            ),
            ConfigError::InvalidStatusPolicy(value) => write!(
                f,
                "PLACEMENT_STATUS_POLICY must be 'permissive' or 'forward_only', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidThreshold(_)
            | ConfigError::InvalidStatusPolicy(_) => None,
        }
    }
}
