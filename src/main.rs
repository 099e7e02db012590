// folio-sync: caching proxy behind a personal portfolio site.
// Serves GitHub project listings and coding-activity data from an in-memory,
// process-lifetime cache that refreshes on demand.

mod cache;
mod config;
mod error;
mod github;
mod server;
mod status;
mod sync;
mod wakatime;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::github::client::GithubClient;
use crate::server::AppState;
use crate::sync::{ActivityService, ProjectsService};
use crate::wakatime::client::ActivityClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_sync=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let cache = Arc::new(CacheStore::new());

    let github = GithubClient::new(&config.github_token, config.http_timeout)?;
    let projects = ProjectsService::new(
        github,
        cache.clone(),
        config.github_login.clone(),
        config.projects_ttl,
    );

    let activity_client = ActivityClient::new(
        &config.activity_url,
        &config.activity_api_key,
        config.http_timeout,
    )?;
    let activity = ActivityService::new(
        activity_client,
        cache,
        config.activity_ttl,
        config.thresholds,
    );

    let app = server::router(AppState { projects, activity });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, login = %config.github_login, "folio-sync listening");
    axum::serve(listener, app).await?;

    Ok(())
}
