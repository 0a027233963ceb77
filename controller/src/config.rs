//! Client configuration loaded from the environment
//!
//! Values come from process environment variables (after an optional `.env`
//! file has been loaded) and can be overridden by command line flags.

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{ControllerError, ControllerResult};

pub const SERVER_URL_VAR: &str = "ANYMAPS_SERVER_URL";
pub const TIMEOUT_VAR: &str = "ANYMAPS_TIMEOUT_SECS";
pub const OUTPUT_DIR_VAR: &str = "ANYMAPS_OUTPUT_DIR";
pub const LOG_LEVEL_VAR: &str = "ANYMAPS_LOG_LEVEL";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "./maps";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: Url,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
    pub log_level: String,
}

impl ClientConfig {
    /// Built-in defaults, before the environment is consulted
    pub fn defaults() -> ControllerResult<Self> {
        Ok(Self {
            server_url: parse_server_url(DEFAULT_SERVER_URL)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        })
    }

    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> ControllerResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ControllerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::defaults()?;

        if let Some(raw) = non_empty(lookup(SERVER_URL_VAR)) {
            config.server_url = parse_server_url(&raw)?;
        }

        if let Some(raw) = non_empty(lookup(TIMEOUT_VAR)) {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ControllerError::config(format!("{TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'")))?;
            if secs == 0 {
                return Err(ControllerError::config(format!("{TIMEOUT_VAR} must be greater than zero")));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = non_empty(lookup(OUTPUT_DIR_VAR)) {
            config.output_dir = PathBuf::from(raw);
        }

        if let Some(raw) = non_empty(lookup(LOG_LEVEL_VAR)) {
            config.log_level = raw;
        }

        Ok(config)
    }

    pub fn with_server_url(mut self, raw: &str) -> ControllerResult<Self> {
        self.server_url = parse_server_url(raw)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse and validate a server base URL
pub fn parse_server_url(raw: &str) -> ControllerResult<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ControllerError::config(format!(
            "server URL must use http or https, got '{other}'"
        ))),
    }
}
