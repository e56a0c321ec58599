//! # Result Cache
//!
//! TTL-bounded cache of the most recent [`DiagnosisResultReport`] per
//! [`Fingerprint`], plus one mutex per fingerprint so a burst of concurrent
//! submissions for the same target runs the collection pipeline at most
//! once (cache-stampede avoidance).

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use diagnose_shared::models::{DiagnosisResultReport, Fingerprint};
use tokio::sync::Mutex;

struct CachedEntry {
    report: DiagnosisResultReport,
    cached_at: Instant,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: DashMap<Fingerprint, CachedEntry>,
    locks: DashMap<Fingerprint, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for CachedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEntry").field("cached_at", &self.cached_at).finish()
    }
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Returns a fresh cached report for `fingerprint`, if any, without
    /// acquiring its per-fingerprint lock.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<DiagnosisResultReport> {
        let entry = self.entries.get(fingerprint)?;
        if entry.cached_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.report.clone())
    }

    pub fn put(&self, fingerprint: Fingerprint, report: DiagnosisResultReport) {
        self.entries.insert(
            fingerprint,
            CachedEntry {
                report,
                cached_at: Instant::now(),
            },
        );
    }

    /// Returns the mutex serialising orchestration runs for `fingerprint`,
    /// creating it on first use.
    pub fn lock_for(&self, fingerprint: &Fingerprint) -> Arc<Mutex<()>> {
        self.locks
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
