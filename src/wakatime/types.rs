// Activity upstream response types.
// Substructures the proxy never inspects are carried as raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One activity sample as fetched, cached, and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySample {
    pub sampled_at: DateTime<Utc>,
    pub data: ActivityData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    pub range: Value,
    pub editors: Vec<Value>,
    pub operating_systems: Vec<Value>,
    pub categories: Vec<CategoryTotal>,
    /// Seconds of recorded activity so far today.
    pub totals_today: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub seconds: f64,
}

impl ActivitySample {
    /// Whether this sample recorded any activity today.
    pub fn has_activity(&self) -> bool {
        self.data.totals_today > 0.0
    }
}
