// GitHub GraphQL API client.
// Handles authentication and maps transport/status failures to SyncError.

use std::time::Duration;

use reqwest::{
    Client, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::json;

use crate::error::{Result, SyncError};

use super::types::{GraphQlEnvelope, RepoPage};

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const SOURCE_ID: &str = "github";

/// Repository listing query; one page per request, pinned set on every page.
const REPOSITORIES_QUERY: &str = r#"
query PortfolioRepositories($login: String!, $cursor: String) {
  user(login: $login) {
    pinnedItems(first: 6, types: [REPOSITORY]) {
      edges {
        node {
          ... on Repository { ...repoFields }
        }
      }
    }
    repositories(
      first: 50
      after: $cursor
      privacy: PUBLIC
      ownerAffiliations: OWNER
      orderBy: { field: UPDATED_AT, direction: DESC }
    ) {
      nodes { ...repoFields }
      pageInfo { hasNextPage endCursor }
    }
  }
}
fragment repoFields on Repository {
  name
  description
  url
  stargazerCount
  forkCount
  languages(first: 10, orderBy: { field: SIZE, direction: DESC }) {
    nodes { name }
  }
  repositoryTopics(first: 10) {
    nodes { topic { name } }
  }
  createdAt
  updatedAt
  licenseInfo { name }
  isPrivate
}
"#;

/// Seam for fetching one page of the repositories connection.
///
/// The paginator and the update detector only see this trait, so tests can
/// script pages without a network.
pub trait FetchPage: Send + Sync {
    fn fetch_page(
        &self,
        login: &str,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<RepoPage>> + Send;
}

/// GitHub GraphQL client with bearer authentication.
pub struct GithubClient {
    client: Client,
}

impl GithubClient {
    /// Create a new client with the given token and per-request timeout.
    pub fn new(token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                SyncError::InvalidConfig {
                    name: "GITHUB_TOKEN",
                    value: "contains non-header characters".to_string(),
                }
            })?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("folio-sync"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport {
                source_id: SOURCE_ID,
                source: e,
            })?;

        Ok(Self { client })
    }
}

impl FetchPage for GithubClient {
    async fn fetch_page(&self, login: &str, cursor: Option<&str>) -> Result<RepoPage> {
        let body = json!({
            "query": REPOSITORIES_QUERY,
            "variables": { "login": login, "cursor": cursor },
        });

        let response = self
            .client
            .post(GITHUB_GRAPHQL_URL)
            .json(&body)
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
        let envelope: GraphQlEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode {
                source_id: SOURCE_ID,
                source: e,
            })?;

        // GraphQL reports errors with HTTP 200; treat them as failures too.
        if let Some(errors) = envelope.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(SyncError::GraphQl(first.message));
            }
        }

        let user = envelope
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| SyncError::UnknownLogin(login.to_string()))?;

        Ok(user.into())
    }
}
