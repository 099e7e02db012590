// Error types for the sync service.
// Covers upstream API failures, decoding problems, and configuration issues.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{source_id} upstream returned HTTP {status}")]
    UpstreamStatus {
        source_id: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{source_id} request failed: {source}")]
    Transport {
        source_id: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{source_id} rejected the configured credentials")]
    Unauthorized { source_id: &'static str },

    #[error("GitHub GraphQL error: {0}")]
    GraphQl(String),

    #[error("GitHub user {0} not found")]
    UnknownLogin(String),

    #[error("failed to decode {source_id} response: {source}")]
    Decode {
        source_id: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;
