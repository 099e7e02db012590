// Availability classification from time since last recorded activity.
// A pure function of (last activity, now); nothing is stored or transitioned.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Derived availability, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Away,
    Busy,
}

/// Elapsed-time thresholds separating the three classes.
#[derive(Debug, Clone, Copy)]
pub struct StatusThresholds {
    /// Up to and including this much idle time counts as available.
    pub away_after: Duration,
    /// Up to and including this much idle time counts as away; beyond is busy.
    pub busy_after: Duration,
}

/// Classify availability from the last non-zero activity timestamp.
///
/// A never-recorded timestamp classifies as available.
pub fn classify(
    last_active: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &StatusThresholds,
) -> Availability {
    let Some(last_active) = last_active else {
        return Availability::Available;
    };

    let elapsed = now
        .signed_duration_since(last_active)
        .to_std()
        .unwrap_or(Duration::ZERO);

    if elapsed <= thresholds.away_after {
        Availability::Available
    } else if elapsed <= thresholds.busy_after {
        Availability::Away
    } else {
        Availability::Busy
    }
}
