// Per-source sync orchestration.
// Composes the cache slots, TTL policy, change probing, and stale fallback.
// A refresh only ever happens synchronously inside a read.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::Result;
use crate::github::client::FetchPage;
use crate::github::types::ProjectsPayload;
use crate::github::{detect, paginate};
use crate::status::{Availability, StatusThresholds, classify};
use crate::wakatime::client::FetchSample;
use crate::wakatime::types::ActivitySample;

/// Orchestrator for the project-listing source.
///
/// Reads serve the cached snapshot while it is within its TTL; expired or
/// forced reads probe page 1 for changes and only re-paginate when the
/// upstream actually moved. A failed refresh falls back to the stale
/// snapshot whenever one exists.
pub struct ProjectsService<C> {
    client: C,
    cache: Arc<CacheStore>,
    login: String,
    ttl: Duration,
}

impl<C: FetchPage> ProjectsService<C> {
    pub fn new(client: C, cache: Arc<CacheStore>, login: String, ttl: Duration) -> Self {
        Self {
            client,
            cache,
            login,
            ttl,
        }
    }

    /// Read the project snapshot, refreshing if forced or past the TTL.
    pub async fn read(&self, force: bool, now: DateTime<Utc>) -> Result<ProjectsPayload> {
        let cached = self.cache.projects.get();

        if !force {
            if let Some(entry) = &cached {
                if entry.is_fresh(now, self.ttl) {
                    debug!(login = %self.login, "serving fresh project snapshot");
                    return Ok(entry.payload.clone());
                }
            }
        }

        let cached_data = cached.as_ref().map(|entry| &entry.payload.data);
        if !detect::has_changed(&self.client, &self.login, cached_data).await {
            // Unchanged upstream (or an inconclusive probe): keep the data
            // and restart its freshness window instead of re-paginating.
            if let Some(entry) = cached {
                let payload = ProjectsPayload {
                    data: entry.payload.data,
                    updated_at: now,
                };
                self.cache.projects.put(payload.clone(), now);
                debug!(login = %self.login, "project data unchanged upstream, restamped");
                return Ok(payload);
            }
        }

        match paginate::traverse(&self.client, &self.login).await {
            Ok(data) => {
                let payload = ProjectsPayload {
                    data,
                    updated_at: now,
                };
                self.cache.projects.put(payload.clone(), now);
                info!(login = %self.login, "project snapshot refreshed");
                Ok(payload)
            }
            Err(err) => match cached {
                Some(entry) => {
                    warn!(source_id = "github", error = %err, "refresh failed, serving stale snapshot");
                    Ok(entry.payload)
                }
                None => Err(err),
            },
        }
    }
}

/// Orchestrator for the activity source: TTL-driven, no force override.
pub struct ActivityService<C> {
    client: C,
    cache: Arc<CacheStore>,
    ttl: Duration,
    thresholds: StatusThresholds,
    /// Last time a fetched sample showed non-zero activity.
    last_active: Mutex<Option<DateTime<Utc>>>,
}

impl<C: FetchSample> ActivityService<C> {
    pub fn new(
        client: C,
        cache: Arc<CacheStore>,
        ttl: Duration,
        thresholds: StatusThresholds,
    ) -> Self {
        Self {
            client,
            cache,
            ttl,
            thresholds,
            last_active: Mutex::new(None),
        }
    }

    /// Read the activity sample, refreshing past the TTL.
    pub async fn read(&self, now: DateTime<Utc>) -> Result<ActivitySample> {
        let cached = self.cache.activity.get();

        if let Some(entry) = &cached {
            if entry.is_fresh(now, self.ttl) {
                debug!("serving fresh activity sample");
                return Ok(entry.payload.clone());
            }
        }

        match self.client.fetch_sample().await {
            Ok(sample) => {
                if sample.has_activity() {
                    *self.lock_last_active() = Some(now);
                }
                self.cache.activity.put(sample.clone(), now);
                info!(totals_today = sample.data.totals_today, "activity sample refreshed");
                Ok(sample)
            }
            Err(err) => match cached {
                Some(entry) => {
                    warn!(source_id = "wakatime", error = %err, "refresh failed, serving stale sample");
                    Ok(entry.payload)
                }
                None => Err(err),
            },
        }
    }

    /// Current availability, recomputed from the last non-zero activity.
    pub fn status(&self, now: DateTime<Utc>) -> Availability {
        classify(*self.lock_last_active(), now, &self.thresholds)
    }

    fn lock_last_active(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        self.last_active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::github::paginate::tests::{ScriptedPages, page, upstream_error};
    use crate::github::types::ProjectData;
    use crate::wakatime::types::ActivityData;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + TimeDelta::seconds(secs)
    }

    fn snapshot(names: &[&str], pinned: &[&str], retrieved_at: DateTime<Utc>) -> ProjectsPayload {
        let page = page(names, Some(pinned), None).unwrap();
        ProjectsPayload {
            data: ProjectData::from_page(&page),
            updated_at: retrieved_at,
        }
    }

    fn projects_service(
        script: Vec<crate::error::Result<crate::github::types::RepoPage>>,
        cache: Arc<CacheStore>,
    ) -> ProjectsService<ScriptedPages> {
        ProjectsService::new(ScriptedPages::new(script), cache, "octocat".to_string(), TTL)
    }

    #[tokio::test]
    async fn test_fresh_cache_serves_without_network() {
        let cache = Arc::new(CacheStore::new());
        let s1 = snapshot(&["a", "b", "c"], &["p1"], t0());
        cache.projects.put(s1.clone(), t0());

        let service = projects_service(vec![], cache);
        let payload = service.read(false, at(100)).await.unwrap();

        assert_eq!(payload, s1);
        assert_eq!(service.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_probe_restamps_and_skips_traversal() {
        let cache = Arc::new(CacheStore::new());
        let s1 = snapshot(&["a", "b"], &["p1"], t0());
        cache.projects.put(s1.clone(), t0());

        let service = projects_service(vec![page(&["a", "b"], Some(&["p1"]), None)], cache.clone());
        let payload = service.read(false, at(400)).await.unwrap();

        assert_eq!(payload.data, s1.data);
        assert_eq!(payload.updated_at, at(400));
        assert_eq!(service.client.call_count(), 1);
        assert_eq!(cache.projects.get().unwrap().retrieved_at, at(400));
    }

    #[tokio::test]
    async fn test_changed_probe_triggers_full_traversal() {
        let cache = Arc::new(CacheStore::new());
        cache.projects.put(snapshot(&["a"], &["p1"], t0()), t0());

        let service = projects_service(
            vec![
                // Probe sees new content, then the traversal runs two pages.
                page(&["a", "b"], Some(&["p1"]), Some("c1")),
                page(&["a", "b"], Some(&["p1"]), Some("c1")),
                page(&["c"], Some(&["p1"]), None),
            ],
            cache.clone(),
        );
        let payload = service.read(false, at(400)).await.unwrap();

        let names: Vec<&str> = payload
            .data
            .user
            .repositories
            .nodes
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(service.client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_force_bypasses_ttl() {
        let cache = Arc::new(CacheStore::new());
        cache.projects.put(snapshot(&["a"], &["p1"], t0()), t0());

        let service = projects_service(vec![page(&["a"], Some(&["p1"]), None)], cache);
        service.read(true, at(10)).await.unwrap();

        // Still inside the TTL, but the force flag reached the upstream.
        assert_eq!(service.client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_snapshot() {
        let cache = Arc::new(CacheStore::new());
        let s1 = snapshot(&["a", "b", "c"], &["p1"], t0());
        cache.projects.put(s1.clone(), t0());

        let service = projects_service(
            vec![
                page(&["a", "b", "c", "d"], Some(&["p1"]), None),
                Err(upstream_error()),
            ],
            cache.clone(),
        );
        let payload = service.read(false, at(400)).await.unwrap();

        assert_eq!(payload, s1);
        // The failed traversal must not clobber the cached entry.
        assert_eq!(cache.projects.get().unwrap().payload, s1);
    }

    #[tokio::test]
    async fn test_failed_refresh_without_cache_propagates() {
        let cache = Arc::new(CacheStore::new());
        let service = projects_service(vec![Err(upstream_error())], cache);

        let err = service.read(false, t0()).await.unwrap_err();
        assert!(matches!(err, SyncError::UpstreamStatus { .. }));
        // Absent cache skips the probe and goes straight to the traversal.
        assert_eq!(service.client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_ttl_and_stale_fallback() {
        let cache = Arc::new(CacheStore::new());
        let service = projects_service(
            vec![
                // t=0: cold cache, one-page traversal produces S1.
                page(&["a", "b", "c"], Some(&["p1"]), None),
                // t=310: probe reports a change, traversal fails.
                page(&["a", "b", "c", "d"], Some(&["p1"]), None),
                Err(upstream_error()),
            ],
            cache,
        );

        let s1 = service.read(false, t0()).await.unwrap();
        assert_eq!(s1.data.user.repositories.nodes.len(), 3);
        assert_eq!(s1.data.user.pinned_items.edges.len(), 1);
        assert_eq!(service.client.call_count(), 1);

        let hit = service.read(false, at(100)).await.unwrap();
        assert_eq!(hit, s1);
        assert_eq!(service.client.call_count(), 1);

        let fallback = service.read(false, at(310)).await.unwrap();
        assert_eq!(fallback, s1);
        assert_eq!(service.client.call_count(), 3);
    }

    // --- activity -----------------------------------------------------------

    struct ScriptedSamples {
        script: Mutex<Vec<Result<ActivitySample>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSamples {
        fn new(script: Vec<Result<ActivitySample>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FetchSample for ScriptedSamples {
        async fn fetch_sample(&self) -> Result<ActivitySample> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                panic!("fetch_sample called more times than scripted");
            }
            script.remove(0)
        }
    }

    fn sample(totals_today: f64) -> ActivitySample {
        ActivitySample {
            sampled_at: t0(),
            data: ActivityData {
                range: Value::Null,
                editors: vec![],
                operating_systems: vec![],
                categories: vec![],
                totals_today,
            },
        }
    }

    fn thresholds() -> StatusThresholds {
        StatusThresholds {
            away_after: Duration::from_secs(15 * 60),
            busy_after: Duration::from_secs(60 * 60),
        }
    }

    fn activity_error() -> SyncError {
        SyncError::UpstreamStatus {
            source_id: "wakatime",
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn activity_service(
        script: Vec<Result<ActivitySample>>,
        cache: Arc<CacheStore>,
    ) -> ActivityService<ScriptedSamples> {
        ActivityService::new(ScriptedSamples::new(script), cache, TTL, thresholds())
    }

    #[tokio::test]
    async fn test_fresh_sample_served_without_network() {
        let cache = Arc::new(CacheStore::new());
        cache.activity.put(sample(120.0), t0());

        let service = activity_service(vec![], cache);
        let got = service.read(at(100)).await.unwrap();

        assert_eq!(got, sample(120.0));
        assert_eq!(service.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_nonzero_sample_updates_last_active() {
        let cache = Arc::new(CacheStore::new());
        let service = activity_service(vec![Ok(sample(90.0))], cache);

        service.read(t0()).await.unwrap();

        assert_eq!(service.status(at(10 * 60)), Availability::Available);
        assert_eq!(service.status(at(30 * 60)), Availability::Away);
        assert_eq!(service.status(at(90 * 60)), Availability::Busy);
    }

    #[tokio::test]
    async fn test_zero_sample_leaves_last_active_unset() {
        let cache = Arc::new(CacheStore::new());
        let service = activity_service(vec![Ok(sample(0.0))], cache);

        service.read(t0()).await.unwrap();

        // Never any recorded activity, so every horizon reads available.
        assert_eq!(service.status(at(90 * 60)), Availability::Available);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_touch_last_active() {
        let cache = Arc::new(CacheStore::new());
        cache.activity.put(sample(90.0), t0());
        let service = activity_service(vec![Ok(sample(90.0)), Err(activity_error())], cache);

        service.read(at(400)).await.unwrap();
        let before = service.status(at(30 * 60));

        // Second read refreshes again and fails; the stale sample comes back
        // and the activity clock is untouched.
        let got = service.read(at(800)).await.unwrap();
        assert_eq!(got, sample(90.0));
        assert_eq!(service.status(at(30 * 60)), before);
    }

    #[tokio::test]
    async fn test_failed_fetch_without_cache_propagates() {
        let cache = Arc::new(CacheStore::new());
        let service = activity_service(vec![Err(activity_error())], cache);

        let err = service.read(t0()).await.unwrap_err();
        assert!(matches!(err, SyncError::UpstreamStatus { .. }));
    }
}
