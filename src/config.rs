use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Telemetry backend
    pub backend_base_url: String,
    pub backend_timeout_seconds: Option<u64>,

    // Display
    pub display_timezone: String,
    pub default_from_day: Option<NaiveDate>,

    // Polling
    pub live_poll_interval_ms: u64,
    pub status_poll_interval_ms: u64,
    pub lamp_confirm_attempts: u32,
    pub lamp_confirm_delay_ms: u64,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_control_per_second: u64,
    pub rate_limit_control_burst: u32,

    // Application metadata
    pub log_format: LogFormat,
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_string(),
            backend_timeout_seconds: None,
            display_timezone: "Europe/Copenhagen".to_string(),
            default_from_day: None,
            live_poll_interval_ms: 3000,
            status_poll_interval_ms: 2000,
            lamp_confirm_attempts: 5,
            lamp_confirm_delay_ms: 500,
            api_host: "0.0.0.0".to_string(),
            api_port: 3000,
            disable_rate_limiting: false,
            rate_limit_control_per_second: 1,
            rate_limit_control_burst: 20,
            log_format: LogFormat::Text,
            deployment: Deployment::Local,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables take the defaults from [`Config::default`]. Values that
    /// fail to parse fall back to the default as well.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the backend URL, the default day or a
    /// polling parameter is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            // Telemetry backend
            backend_base_url: env::var("BACKEND_BASE_URL")
                .unwrap_or(defaults.backend_base_url)
                .trim_end_matches('/')
                .to_string(),
            backend_timeout_seconds: env::var("BACKEND_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok()),

            // Display
            display_timezone: env::var("DISPLAY_TIMEZONE").unwrap_or(defaults.display_timezone),
            default_from_day: match env::var("DEFAULT_FROM_DAY") {
                Ok(day) if !day.trim().is_empty() => Some(
                    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
                        .map_err(|_| ConfigError::Invalid("DEFAULT_FROM_DAY"))?,
                ),
                _ => None,
            },

            // Polling
            live_poll_interval_ms: parse_or("LIVE_POLL_INTERVAL_MS", defaults.live_poll_interval_ms),
            status_poll_interval_ms: parse_or(
                "STATUS_POLL_INTERVAL_MS",
                defaults.status_poll_interval_ms,
            ),
            lamp_confirm_attempts: parse_or("LAMP_CONFIRM_ATTEMPTS", defaults.lamp_confirm_attempts),
            lamp_confirm_delay_ms: parse_or("LAMP_CONFIRM_DELAY_MS", defaults.lamp_confirm_delay_ms),

            // API settings
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_or("API_PORT", defaults.api_port),

            // Rate limiting
            disable_rate_limiting: parse_or("DISABLE_RATE_LIMITING", defaults.disable_rate_limiting),
            rate_limit_control_per_second: parse_or(
                "RATE_LIMIT_CONTROL_PER_SECOND",
                defaults.rate_limit_control_per_second,
            ),
            rate_limit_control_burst: parse_or(
                "RATE_LIMIT_CONTROL_BURST",
                defaults.rate_limit_control_burst,
            ),

            // Application metadata
            log_format: match env::var("LOG_FORMAT") {
                Ok(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that would leave the dashboard unable to run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if reqwest::Url::parse(&self.backend_base_url).is_err() {
            return Err(ConfigError::Invalid("BACKEND_BASE_URL"));
        }
        if self.live_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("LIVE_POLL_INTERVAL_MS"));
        }
        if self.status_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("STATUS_POLL_INTERVAL_MS"));
        }
        if self.lamp_confirm_attempts == 0 {
            return Err(ConfigError::Invalid("LAMP_CONFIRM_ATTEMPTS"));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn live_poll_interval(&self) -> Duration {
        Duration::from_millis(self.live_poll_interval_ms)
    }

    #[must_use]
    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    #[must_use]
    pub fn lamp_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.lamp_confirm_delay_ms)
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
