// Runtime configuration loaded from the environment.
// Credentials are required; TTLs, thresholds, and addresses carry defaults.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::status::StatusThresholds;

/// Default activity upstream: the WakaTime "status bar today" endpoint.
pub const DEFAULT_ACTIVITY_URL: &str =
    "https://wakatime.com/api/v1/users/current/status_bar/today";

const DEFAULT_PROJECTS_TTL_SECS: u64 = 300;
const DEFAULT_ACTIVITY_TTL_SECS: u64 = 120;
const DEFAULT_AWAY_AFTER_MINS: u64 = 15;
const DEFAULT_BUSY_AFTER_MINS: u64 = 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Service configuration, assembled once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the GitHub GraphQL API.
    pub github_token: String,
    /// GitHub login whose repositories are listed.
    pub github_login: String,
    /// Basic-auth key for the activity upstream.
    pub activity_api_key: String,
    /// Activity upstream URL.
    pub activity_url: String,
    /// Freshness window for the cached project snapshot.
    pub projects_ttl: Duration,
    /// Freshness window for the cached activity sample.
    pub activity_ttl: Duration,
    /// Away/busy classification thresholds.
    pub thresholds: StatusThresholds,
    /// Per-request timeout applied to both upstream clients.
    pub http_timeout: Duration,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| SyncError::InvalidConfig {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            github_token: required(&lookup, "GITHUB_TOKEN")?,
            github_login: required(&lookup, "GITHUB_LOGIN")?,
            activity_api_key: required(&lookup, "ACTIVITY_API_KEY")?,
            activity_url: lookup("ACTIVITY_URL")
                .unwrap_or_else(|| DEFAULT_ACTIVITY_URL.to_string()),
            projects_ttl: duration_secs(&lookup, "PROJECTS_TTL_SECS", DEFAULT_PROJECTS_TTL_SECS)?,
            activity_ttl: duration_secs(&lookup, "ACTIVITY_TTL_SECS", DEFAULT_ACTIVITY_TTL_SECS)?,
            thresholds: StatusThresholds {
                away_after: duration_mins(&lookup, "AWAY_AFTER_MINS", DEFAULT_AWAY_AFTER_MINS)?,
                busy_after: duration_mins(&lookup, "BUSY_AFTER_MINS", DEFAULT_BUSY_AFTER_MINS)?,
            },
            http_timeout: duration_secs(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            bind_addr,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<String> {
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SyncError::MissingConfig(key)),
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|_| SyncError::InvalidConfig {
            name: key,
            value: raw,
        }),
        None => Ok(default),
    }
}

fn duration_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration> {
    Ok(Duration::from_secs(parse_u64(lookup, key, default)?))
}

fn duration_mins(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration> {
    Ok(Duration::from_secs(parse_u64(lookup, key, default)? * 60))
}
