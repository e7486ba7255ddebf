//! In-memory report cache.
//!
//! Uses `DashMap` for lock-free concurrent reads — request handlers mostly
//! read, so this avoids contention. Bounded in practice by the fixed
//! province list; entries are only ever overwritten, never evicted.

use common::Report;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe report cache keyed by province name.
pub type ReportCache = Arc<DashMap<String, Report>>;

/// Create a new empty ReportCache.
pub fn new_report_cache() -> ReportCache {
    Arc::new(DashMap::new())
}
