//! Memoizing store of pairwise document distances
//!
//! Entries are keyed by unordered index pairs: the smaller index is the
//! outer key, the larger one the inner key, so `(a, b)` and `(b, a)`
//! always resolve to the same slot and a self pair is never stored.
//! The map is behind a reader-writer lock and is meant to be shared
//! through `Arc` by every calculator working on the same corpus.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Nested `{index1: {index2: distance}}` mapping, both orderings present
pub type NestedDistances = BTreeMap<String, BTreeMap<String, f64>>;

/// Current on-disk snapshot version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of a cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSnapshot {
    pub version: u32,
    pub distances: NestedDistances,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Symmetric distance cache
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: RwLock<HashMap<String, HashMap<String, f64>>>,
}

fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a cache from a nested mapping such as one produced by [`export`](Self::export)
    ///
    /// Self pairs are dropped. If both orderings carry different values,
    /// whichever is visited last wins.
    pub fn from_nested<I, J, K1, K2>(nested: I) -> Self
    where
        I: IntoIterator<Item = (K1, J)>,
        J: IntoIterator<Item = (K2, f64)>,
        K1: AsRef<str>,
        K2: AsRef<str>,
    {
        let cache = Self::new();
        for (a, inner) in nested {
            for (b, distance) in inner {
                cache.put(a.as_ref(), b.as_ref(), distance);
            }
        }
        cache
    }

    /// Restore a cache from a snapshot
    pub fn from_snapshot(snapshot: DistanceSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(Self::from_nested(snapshot.distances))
    }

    /// Order-independent lookup
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let (lo, hi) = ordered(a, b);
        self.entries.read().get(lo)?.get(hi).copied()
    }

    /// Store a distance for both orderings, replacing any previous value
    ///
    /// The value is not range checked. A self pair is ignored.
    pub fn put(&self, a: &str, b: &str, distance: f64) {
        if a == b {
            return;
        }
        let (lo, hi) = ordered(a, b);
        self.entries
            .write()
            .entry(lo.to_string())
            .or_default()
            .insert(hi.to_string(), distance);
    }

    /// Full mapping with both orderings of every pair
    pub fn export(&self) -> NestedDistances {
        let entries = self.entries.read();
        let mut nested = NestedDistances::new();
        for (a, inner) in entries.iter() {
            for (b, &distance) in inner {
                nested.entry(a.clone()).or_default().insert(b.clone(), distance);
                nested.entry(b.clone()).or_default().insert(a.clone(), distance);
            }
        }
        nested
    }

    /// Versioned copy for persistence between runs
    pub fn snapshot(&self) -> DistanceSnapshot {
        DistanceSnapshot {
            version: SNAPSHOT_VERSION,
            distances: self.export(),
        }
    }

    /// Number of unordered pairs stored
    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_symmetric_get() {
        let cache = DistanceCache::new();
        cache.put("b", "a", 0.4);
        assert_eq!(cache.get("a", "b"), Some(0.4));
        assert_eq!(cache.get("b", "a"), Some(0.4));
        assert_eq!(cache.get("a", "c"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = DistanceCache::new();
        cache.put("a", "b", 0.4);
        cache.put("b", "a", 0.6);
        assert_eq!(cache.get("a", "b"), Some(0.6));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_self_pair_ignored() {
        let cache = DistanceCache::new();
        cache.put("a", "a", 0.0);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a", "a"), None);
    }

    #[test]
    fn test_export_has_both_orderings() {
        let cache = DistanceCache::new();
        cache.put("1", "3", 0.9);
        cache.put("2", "1", 0.1);

        let nested = cache.export();
        assert_eq!(nested["1"]["3"], 0.9);
        assert_eq!(nested["3"]["1"], 0.9);
        assert_eq!(nested["1"]["2"], 0.1);
        assert_eq!(nested["2"]["1"], 0.1);
        assert!(!nested["1"].contains_key("1"));
    }

    #[test]
    fn test_from_nested_drops_self_pairs() {
        let mut nested = NestedDistances::new();
        nested.entry("x".into()).or_default().insert("y".into(), 0.3);
        nested.entry("x".into()).or_default().insert("x".into(), 0.0);

        let cache = DistanceCache::from_nested(nested);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("y", "x"), Some(0.3));
    }

    #[test]
    fn test_snapshot_version_check() {
        let cache = DistanceCache::new();
        cache.put("a", "b", 0.5);

        let restored = DistanceCache::from_snapshot(cache.snapshot()).unwrap();
        assert_eq!(restored.get("a", "b"), Some(0.5));

        let stale = DistanceSnapshot { version: 0, distances: NestedDistances::new() };
        assert_eq!(
            DistanceCache::from_snapshot(stale).unwrap_err(),
            SnapshotError::UnsupportedVersion { found: 0, expected: 1 }
        );
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = Arc::new(DistanceCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let a = i.to_string();
                        let b = (i + 1).to_string();
                        if t % 2 == 0 {
                            cache.put(&a, &b, 0.5);
                        } else {
                            cache.put(&b, &a, 0.5);
                        }
                        assert_eq!(cache.get(&a, &b), Some(0.5));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 100);
    }
}
