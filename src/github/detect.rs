// Change detection for the cached project snapshot.
// One first-page probe, compared structurally against the cached data.

use tracing::warn;

use super::client::FetchPage;
use super::types::ProjectData;

/// Decide whether the cached project data is out of date.
///
/// An absent cache always counts as changed, without spending a probe.
/// Otherwise a single page-1 request is compared to the cached data
/// substructure with order-sensitive deep equality; any difference in any
/// nested position counts as a change. A failed probe counts as "no change"
/// so a transient error never forces a full re-pagination.
pub async fn has_changed<F: FetchPage>(
    fetcher: &F,
    login: &str,
    cached: Option<&ProjectData>,
) -> bool {
    let Some(cached) = cached else {
        return true;
    };

    match fetcher.fetch_page(login, None).await {
        Ok(page) => ProjectData::from_page(&page) != *cached,
        Err(err) => {
            warn!(login, error = %err, "change probe failed, keeping cached data");
            false
        }
    }
}
