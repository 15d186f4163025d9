use crate::error::PollError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncHealth {
    pub uptime_seconds: u64,
    pub polls_applied: u64,
    pub polls_failed: u64,
    pub polls_discarded: u64,
    pub rows_tracked: usize,
    pub rows_visible: usize,
    /// RFC 3339 time of the last applied snapshot
    pub last_success: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Latest {
    rows_tracked: usize,
    rows_visible: usize,
    last_success: Option<OffsetDateTime>,
    last_error: Option<String>,
}

/// Poll counters, cloned into the HTTP layer.
#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    polls_applied: Arc<AtomicU64>,
    polls_failed: Arc<AtomicU64>,
    polls_discarded: Arc<AtomicU64>,
    latest: Arc<Mutex<Latest>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            polls_applied: Arc::new(AtomicU64::new(0)),
            polls_failed: Arc::new(AtomicU64::new(0)),
            polls_discarded: Arc::new(AtomicU64::new(0)),
            latest: Arc::new(Mutex::new(Latest::default())),
        }
    }

    pub fn record_applied(&self, rows_tracked: usize, rows_visible: usize) {
        self.polls_applied.fetch_add(1, Ordering::Relaxed);
        let mut latest = self.latest.lock();
        latest.rows_tracked = rows_tracked;
        latest.rows_visible = rows_visible;
        latest.last_success = Some(OffsetDateTime::now_utc());
    }

    pub fn record_failure(&self, error: &PollError) {
        self.polls_failed.fetch_add(1, Ordering::Relaxed);
        self.latest.lock().last_error = Some(error.to_string());
    }

    pub fn record_discarded(&self) {
        self.polls_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_health(&self) -> SyncHealth {
        let latest = self.latest.lock();
        SyncHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            polls_applied: self.polls_applied.load(Ordering::Relaxed),
            polls_failed: self.polls_failed.load(Ordering::Relaxed),
            polls_discarded: self.polls_discarded.load(Ordering::Relaxed),
            rows_tracked: latest.rows_tracked,
            rows_visible: latest.rows_visible,
            last_success: latest.last_success.and_then(|t| t.format(&Rfc3339).ok()),
            last_error: latest.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let health = HealthTracker::new();
        let fresh = health.get_health();
        assert_eq!(fresh.polls_applied, 0);
        assert!(fresh.last_success.is_none());

        health.record_applied(3, 2);
        health.record_failure(&PollError::Status(502));
        health.record_discarded();

        let h = health.clone().get_health();
        assert_eq!(h.polls_applied, 1);
        assert_eq!(h.polls_failed, 1);
        assert_eq!(h.polls_discarded, 1);
        assert_eq!(h.rows_tracked, 3);
        assert_eq!(h.rows_visible, 2);
        assert!(h.last_success.is_some());
        assert_eq!(h.last_error.as_deref(), Some("status endpoint answered HTTP 502"));
    }
}
