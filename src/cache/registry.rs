//! Bidirectional tag registry.
//!
//! Tracks which cache keys provide which tags, so a mutation's invalidation
//! targets can be resolved to the affected entries.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::keys::{QueryKey, Tag};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::registry";

/// Tracks tag → keys and key → tags mappings.
pub struct TagRegistry {
    /// Maps tags to every cache key that provides them
    tag_to_keys: RwLock<HashMap<Tag, HashSet<QueryKey>>>,
    /// Maps cache keys to the tags they provide
    key_to_tags: RwLock<HashMap<QueryKey, HashSet<Tag>>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            tag_to_keys: RwLock::new(HashMap::new()),
            key_to_tags: RwLock::new(HashMap::new()),
        }
    }

    /// Register a cache entry with the tags it provides.
    pub fn register(&self, key: QueryKey, tags: impl IntoIterator<Item = Tag>) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "register.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "register.key_to_tags");

        let tags: HashSet<Tag> = tags.into_iter().collect();
        for tag in &tags {
            t2k.entry(*tag).or_default().insert(key);
        }
        k2t.entry(key).or_default().extend(tags);
    }

    /// Every registered key whose provided tags are covered by any target.
    ///
    /// Pure with respect to the registry contents: nothing is modified.
    pub fn matching(&self, targets: &[Tag]) -> HashSet<QueryKey> {
        let t2k = rw_read(&self.tag_to_keys, SOURCE, "matching");
        t2k.iter()
            .filter(|(provided, _)| targets.iter().any(|target| target.covers(provided)))
            .flat_map(|(_, keys)| keys.iter().copied())
            .collect()
    }

    /// Remove a cache key and clean up tag mappings.
    pub fn unregister(&self, key: &QueryKey) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister.key_to_tags");

        if let Some(tags) = k2t.remove(key) {
            for tag in tags {
                if let Some(keys) = t2k.get_mut(&tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        t2k.remove(&tag);
                    }
                }
            }
        }
    }

    pub fn clear(&self) {
        rw_write(&self.tag_to_keys, SOURCE, "clear.tag_to_keys").clear();
        rw_write(&self.key_to_tags, SOURCE, "clear.key_to_tags").clear();
    }

    pub fn tag_count(&self) -> usize {
        rw_read(&self.tag_to_keys, SOURCE, "tag_count").len()
    }

    pub fn key_count(&self) -> usize {
        rw_read(&self.key_to_tags, SOURCE, "key_count").len()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}
