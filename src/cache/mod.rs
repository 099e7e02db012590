// In-memory cache for upstream data sources.
// Built once at startup and shared by reference with every handler.

#![allow(dead_code)]

pub mod store;

pub use store::{CacheEntry, CacheSlot};

use crate::github::types::ProjectsPayload;
use crate::wakatime::types::ActivitySample;

/// One cache slot per upstream source; process-lifetime only.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Last successful project snapshot.
    pub projects: CacheSlot<ProjectsPayload>,
    /// Last successful activity sample.
    pub activity: CacheSlot<ActivitySample>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}
