// In-memory cache slots for upstream payloads.
// One slot per data source; entries are replaced wholesale, never mutated.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// A cached payload together with the time it was retrieved.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached payload.
    pub payload: T,
    /// When the payload was retrieved from upstream.
    pub retrieved_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Age of this entry relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.retrieved_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether this entry is still within its freshness window.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// A mutex-guarded slot holding at most one cache entry.
///
/// The slot starts empty ("never populated") and only ever transitions to a
/// populated state; `put` replaces the whole entry including its timestamp.
#[derive(Debug)]
pub struct CacheSlot<T> {
    inner: Mutex<Option<CacheEntry<T>>>,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl<T: Clone> CacheSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Snapshot the current entry, if any.
    pub fn get(&self) -> Option<CacheEntry<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the slot contents with a new payload retrieved at `now`.
    pub fn put(&self, payload: T, now: DateTime<Utc>) {
        let entry = CacheEntry {
            payload,
            retrieved_at: now,
        };
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(entry);
    }

    /// Age of the cached entry, or `None` if no fetch has ever completed.
    pub fn age_of(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.get().map(|entry| entry.age(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_empty_slot_has_no_age() {
        let slot: CacheSlot<String> = CacheSlot::new();
        assert!(slot.get().is_none());
        assert!(slot.age_of(Utc::now()).is_none());
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let slot = CacheSlot::new();
        let t0 = Utc::now();

        slot.put("payload".to_string(), t0);

        let entry = slot.get().unwrap();
        assert_eq!(entry.payload, "payload");
        assert_eq!(entry.retrieved_at, t0);
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let slot = CacheSlot::new();
        let t0 = Utc::now();
        let t1 = t0 + TimeDelta::seconds(60);

        slot.put("old".to_string(), t0);
        slot.put("new".to_string(), t1);

        let entry = slot.get().unwrap();
        assert_eq!(entry.payload, "new");
        assert_eq!(entry.retrieved_at, t1);
    }

    #[test]
    fn test_age_tracks_elapsed_time() {
        let slot = CacheSlot::new();
        let t0 = Utc::now();

        slot.put(1u32, t0);

        let age = slot.age_of(t0 + TimeDelta::seconds(100)).unwrap();
        assert_eq!(age, Duration::from_secs(100));
    }

    #[test]
    fn test_freshness_boundary() {
        let entry = CacheEntry {
            payload: (),
            retrieved_at: Utc::now(),
        };
        let ttl = Duration::from_secs(300);

        assert!(entry.is_fresh(entry.retrieved_at + TimeDelta::seconds(100), ttl));
        // Exactly at the TTL the entry is no longer fresh.
        assert!(!entry.is_fresh(entry.retrieved_at + TimeDelta::seconds(300), ttl));
    }

    #[test]
    fn test_clock_skew_clamps_to_zero_age() {
        let slot = CacheSlot::new();
        let t0 = Utc::now();

        slot.put(1u32, t0);

        let age = slot.age_of(t0 - TimeDelta::seconds(5)).unwrap();
        assert_eq!(age, Duration::ZERO);
    }
}
