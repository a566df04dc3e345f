//! Client configuration from the environment.

use std::time::Duration;
use thiserror::Error;
use uno_core::Timings;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/api/games";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { var: &'static str, value: String },

    #[error("UNO_SERVICE_URL must not be empty")]
    EmptyServiceUrl,

    #[error("UNO_PACING_MIN_MS ({min_ms}) exceeds UNO_PACING_MAX_MS ({max_ms})")]
    InvertedPacing { min_ms: u128, max_ms: u128 },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the game service, without trailing slash
    pub service_url: String,
    pub http_timeout: Duration,
    /// Periodic state poll; `None` disables polling
    pub poll_interval: Option<Duration>,
    pub timings: Timings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            http_timeout: Duration::from_millis(5000),
            poll_interval: None,
            timings: Timings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup; unset variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("UNO_SERVICE_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(ConfigError::EmptyServiceUrl);
            }
            config.service_url = url.to_string();
        }

        let millis = |var: &'static str| -> Result<Option<Duration>, ConfigError> {
            match lookup(var) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(|ms| Some(Duration::from_millis(ms)))
                    .map_err(|_| ConfigError::InvalidMillis { var, value }),
            }
        };

        if let Some(d) = millis("UNO_PACING_MIN_MS")? {
            config.timings.pacing_min = d;
        }
        if let Some(d) = millis("UNO_PACING_MAX_MS")? {
            config.timings.pacing_max = d;
        }
        if config.timings.pacing_min > config.timings.pacing_max {
            return Err(ConfigError::InvertedPacing {
                min_ms: config.timings.pacing_min.as_millis(),
                max_ms: config.timings.pacing_max.as_millis(),
            });
        }
        if let Some(d) = millis("UNO_DECLARATION_MS")? {
            config.timings.declaration = d;
        }
        if let Some(d) = millis("UNO_HTTP_TIMEOUT_MS")? {
            config.http_timeout = d;
        }
        if let Some(d) = millis("UNO_POLL_MS")? {
            config.poll_interval = (!d.is_zero()).then_some(d);
        }

        Ok(config)
    }
}
