use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub data: DataConfig,
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

        let scores_path = env::var("ATLAS_SCORES_PATH")
            .unwrap_or_else(|_| DataConfig::DEFAULT_SCORES_PATH.to_string());
        let boundaries_path = env::var("ATLAS_BOUNDARIES_PATH")
            .unwrap_or_else(|_| DataConfig::DEFAULT_BOUNDARIES_PATH.to_string());
        let delimiter = match env::var("ATLAS_DELIMITER") {
            Ok(raw) => parse_delimiter(&raw)?,
            Err(_) => b',',
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data: DataConfig {
                scores_path: PathBuf::from(scores_path),
                boundaries_path: PathBuf::from(boundaries_path),
                delimiter,
            },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the score table and boundary GeoJSON are read from.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub scores_path: PathBuf,
    pub boundaries_path: PathBuf,
    pub delimiter: u8,
}

impl DataConfig {
    pub const DEFAULT_SCORES_PATH: &'static str = "data/scores.csv";
    pub const DEFAULT_BOUNDARIES_PATH: &'static str = "data/counties.geojson";
}

/// `\t` and `tab` are accepted for tab-separated exports.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ConfigError::InvalidDelimiter(raw.to_string())),
        },
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDelimiter(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDelimiter(value) => write!(
                f,
                "ATLAS_DELIMITER must be a single ASCII character, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidDelimiter(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ATLAS_SCORES_PATH");
        env::remove_var("ATLAS_BOUNDARIES_PATH");
        env::remove_var("ATLAS_DELIMITER");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.data.scores_path, PathBuf::from("data/scores.csv"));
        assert_eq!(
            config.data.boundaries_path,
            PathBuf::from("data/counties.geojson")
        );
        assert_eq!(config.data.delimiter, b',');
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_dataset_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATLAS_SCORES_PATH", "/srv/atlas/scores.tsv");
        env::set_var("ATLAS_DELIMITER", "tab");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.data.scores_path, PathBuf::from("/srv/atlas/scores.tsv"));
        assert_eq!(config.data.delimiter, b'\t');
        reset_env();
    }

    #[test]
    fn rejects_multi_character_delimiters() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATLAS_DELIMITER", ";;");
        let error = AppConfig::load().expect_err("delimiter rejected");
        assert!(matches!(error, ConfigError::InvalidDelimiter(_)));
        reset_env();
    }

    #[test]
    fn parses_delimiter_spellings() {
        assert_eq!(parse_delimiter(";").expect("semicolon"), b';');
        assert_eq!(parse_delimiter("\\t").expect("escaped tab"), b'\t');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}
