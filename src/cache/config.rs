//! Cache configuration.

use std::time::Duration;

/// How long an entry nobody subscribes to is kept before it may be pruned.
const DEFAULT_KEEP_UNUSED_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries with no subscribers that were last used longer ago than this
    /// are dropped on the next query.
    pub keep_unused_for: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_unused_for: Duration::from_secs(DEFAULT_KEEP_UNUSED_SECS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            keep_unused_for: settings.keep_unused_for,
        }
    }
}
