use crate::eligibility::EligibilityPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub eligibility: EligibilityPolicy,
    /// Load demo users and employees into the in-memory store at startup.
    pub seed_demo: bool,
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

        let defaults = EligibilityPolicy::default();
        let minimum_months = months_var("APP_ELIGIBILITY_MIN_MONTHS", defaults.minimum_months)?;
        let maximum_months = months_var("APP_ELIGIBILITY_MAX_MONTHS", defaults.maximum_months)?;
        if minimum_months > maximum_months {
            return Err(ConfigError::InvalidEligibilityWindow {
                minimum_months,
                maximum_months,
            });
        }

        let seed_demo = env::var("APP_SEED_DEMO")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            eligibility: EligibilityPolicy {
                minimum_months,
                maximum_months,
            },
            seed_demo,
        })
    }
}

fn months_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidMonths { name }),
        Err(_) => Ok(default),
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMonths { name: &'static str },
    InvalidEligibilityWindow { minimum_months: u32, maximum_months: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMonths { name } => {
                write!(f, "{name} must be a whole number of months")
            }
            ConfigError::InvalidEligibilityWindow {
                minimum_months,
                maximum_months,
            } => write!(
                f,
                "eligibility window is empty: minimum {minimum_months} months exceeds maximum {maximum_months} months"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMonths { .. }
            | ConfigError::InvalidEligibilityWindow { .. } => None,
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
        env::remove_var("APP_ELIGIBILITY_MIN_MONTHS");
        env::remove_var("APP_ELIGIBILITY_MAX_MONTHS");
        env::remove_var("APP_SEED_DEMO");
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
        assert_eq!(config.eligibility, EligibilityPolicy::default());
        assert!(!config.seed_demo);
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
    fn reads_eligibility_window_and_seed_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ELIGIBILITY_MIN_MONTHS", "3");
        env::set_var("APP_ELIGIBILITY_MAX_MONTHS", "60");
        env::set_var("APP_SEED_DEMO", "true");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.eligibility.minimum_months, 3);
        assert_eq!(config.eligibility.maximum_months, 60);
        assert!(config.seed_demo);
        reset_env();
    }

    #[test]
    fn rejects_inverted_eligibility_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ELIGIBILITY_MIN_MONTHS", "24");
        env::set_var("APP_ELIGIBILITY_MAX_MONTHS", "12");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidEligibilityWindow { .. })
        ));

        env::set_var("APP_ELIGIBILITY_MIN_MONTHS", "six");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidMonths {
                name: "APP_ELIGIBILITY_MIN_MONTHS"
            })
        ));
        reset_env();
    }
}
