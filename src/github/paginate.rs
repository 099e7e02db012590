// Cursor traversal of the repositories connection.
// Accumulates the general list page by page; the pinned set is replaced by
// whichever page carried it last.

use tracing::debug;

use crate::error::Result;

use super::client::FetchPage;
use super::types::{PageInfo, ProjectData, ProjectNode};

/// Fetch every page for `login` and assemble the full data substructure.
///
/// Any page failure aborts the whole traversal; no partial result escapes.
/// On success the reported page info always says there is no next page.
pub async fn traverse<F: FetchPage>(fetcher: &F, login: &str) -> Result<ProjectData> {
    let mut general: Vec<ProjectNode> = Vec::new();
    let mut pinned: Vec<ProjectNode> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    let end_cursor = loop {
        let page = fetcher.fetch_page(login, cursor.as_deref()).await?;
        pages += 1;

        general.extend(page.nodes);
        if let Some(page_pinned) = page.pinned {
            // Upstream returns the full pinned set on every page.
            pinned = page_pinned;
        }

        if page.page_info.has_next_page && page.page_info.end_cursor.is_some() {
            cursor = page.page_info.end_cursor;
        } else {
            break page.page_info.end_cursor;
        }
    };

    debug!(login, pages, nodes = general.len(), "traversal complete");

    Ok(ProjectData::assemble(
        pinned,
        general,
        PageInfo {
            has_next_page: false,
            end_cursor,
        },
    ))
}
