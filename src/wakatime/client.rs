// Activity upstream client.
// Single GET endpoint, keyed with basic auth.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{Result, SyncError};

use super::types::ActivitySample;

const SOURCE_ID: &str = "wakatime";

/// Seam for fetching the current activity sample.
pub trait FetchSample: Send + Sync {
    fn fetch_sample(&self) -> impl Future<Output = Result<ActivitySample>> + Send;
}

/// Client for the activity-tracking upstream.
pub struct ActivityClient {
    client: Client,
    url: String,
    api_key: String,
}

impl ActivityClient {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport {
                source_id: SOURCE_ID,
                source: e,
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl FetchSample for ActivityClient {
    async fn fetch_sample(&self) -> Result<ActivitySample> {
        let response = self
            .client
            .get(&self.url)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await
            .map_err(|e| SyncError::Transport {
                source_id: SOURCE_ID,
                source: e,
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SyncError::Unauthorized {
                    source_id: SOURCE_ID,
                });
            }
            status => {
                return Err(SyncError::UpstreamStatus {
                    source_id: SOURCE_ID,
                    status,
                });
            }
        }

        let bytes = response.bytes().await.map_err(|e| SyncError::Transport {
            source_id: SOURCE_ID,
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode {
            source_id: SOURCE_ID,
            source: e,
        })
    }
}
