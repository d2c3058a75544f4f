//! Runtime configuration, read from environment variables with defaults.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CREDENTIAL_FILE: &str = ".taskdash/credential";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the dashboard backend.
    pub api_url: String,
    /// Path of the persistent credential slot.
    pub credential_file: PathBuf,
    /// Client-wide request timeout. Requests exceeding it surface as
    /// `NetworkFailure`.
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credential_file: PathBuf::from(DEFAULT_CREDENTIAL_FILE),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read TASKDASH_API_URL, TASKDASH_CREDENTIAL_FILE and
    /// TASKDASH_HTTP_TIMEOUT_SECS, falling back to the defaults. A timeout
    /// that does not parse falls back rather than failing startup.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        if let Ok(url) = std::env::var("TASKDASH_API_URL") {
            if !url.is_empty() {
                cfg.api_url = url;
            }
        }
        if let Ok(path) = std::env::var("TASKDASH_CREDENTIAL_FILE") {
            if !path.is_empty() {
                cfg.credential_file = PathBuf::from(path);
            }
        }
        if let Ok(raw) = std::env::var("TASKDASH_HTTP_TIMEOUT_SECS") {
            cfg.http_timeout = parse_timeout_secs(&raw)
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        }
        cfg
    }
}

fn parse_timeout_secs(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}
