use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::allocation::scoring::{ScoringConfig, ScoringConfigError, ScoringWeights};
use crate::allocation::service::DEFAULT_ROUTE_TIMEOUT;

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
    pub allocation: AllocationSettings,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            allocation: AllocationSettings::from_env()?,
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
}

/// Scoring rubric, collaborator timeout and directory source.
#[derive(Debug, Clone)]
pub struct AllocationSettings {
    pub scoring: ScoringConfig,
    pub route_timeout: Duration,
    pub facility_csv: Option<PathBuf>,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            route_timeout: DEFAULT_ROUTE_TIMEOUT,
            facility_csv: None,
        }
    }
}

impl AllocationSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = ScoringConfig::default();
        let weights = ScoringWeights {
            distance: float_var("UPAE_WEIGHT_DISTANCE", defaults.weights.distance)?,
            wait: float_var("UPAE_WEIGHT_WAIT", defaults.weights.wait)?,
            cost: float_var("UPAE_WEIGHT_COST", defaults.weights.cost)?,
            transport: float_var("UPAE_WEIGHT_TRANSPORT", defaults.weights.transport)?,
        };
        let scoring = ScoringConfig {
            weights,
            max_distance_km: float_var("UPAE_MAX_DISTANCE_KM", defaults.max_distance_km)?,
            max_wait_days: float_var("UPAE_MAX_WAIT_DAYS", defaults.max_wait_days)?,
        };
        scoring.validate().map_err(ConfigError::Scoring)?;

        let route_timeout = match env::var("UPAE_ROUTE_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "UPAE_ROUTE_TIMEOUT_MS",
                    value: raw,
                })?,
            Err(_) => DEFAULT_ROUTE_TIMEOUT,
        };

        let facility_csv = env::var("UPAE_FACILITY_CSV")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            scoring,
            route_timeout,
            facility_csv,
        })
    }
}

fn float_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    Scoring(ScoringConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{} must be numeric, got '{}'", name, value)
            }
            ConfigError::Scoring(err) => write!(f, "invalid scoring configuration: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Scoring(err) => Some(err),
        }
    }
}
