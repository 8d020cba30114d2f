//! Shared handle for concurrent callers.
//!
//! The tree itself is single-threaded by design: every mutation runs to
//! completion on the calling thread, and node splits touch several links
//! that must be seen together. When a detector wants concurrent readers, the
//! compatible model is one writer and many readers over the whole tree,
//! which is what this wrapper provides. Whitelist verdicts are additionally
//! memoized in an LRU cache, since the same query names recur heavily
//! within a time window.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::stats::CharStats;
use crate::tree::{DomainId, DomainTree, TreeSummary};

/// Default LRU size for cached whitelist verdicts.
pub const DEFAULT_EXCEPTION_CACHE_SIZE: usize = 1024;

/// Reader-writer guard over a [`DomainTree`] with a whitelist-verdict cache.
pub struct SharedDomainTree {
    tree: RwLock<DomainTree>,
    exception_cache: Mutex<LruCache<String, bool>>,
}

impl Default for SharedDomainTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedDomainTree {
    /// Wrap a fresh tree with the default cache size.
    pub fn new() -> Self {
        Self::with_tree(DomainTree::new(), DEFAULT_EXCEPTION_CACHE_SIZE)
    }

    /// Wrap an existing tree (e.g. one already loaded with a whitelist).
    pub fn with_tree(tree: DomainTree, cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            tree: RwLock::new(tree),
            exception_cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Index one observed name. See [`DomainTree::insert`].
    pub fn insert(&self, name: &str, stats: Option<&CharStats>) -> Result<Option<DomainId>> {
        self.tree.write().insert(name, stats)
    }

    /// Whitelist a name. Invalidates cached verdicts, which may flip from
    /// negative to positive once a new mark lands.
    pub fn mark_exception(&self, name: &str) -> Result<DomainId> {
        let id = self.tree.write().mark_exception(name)?;
        self.exception_cache.lock().clear();
        Ok(id)
    }

    /// Cached exact-name whitelist check. See [`DomainTree::is_exception`].
    pub fn is_exception(&self, name: &str) -> Result<bool> {
        if let Some(&verdict) = self.exception_cache.lock().get(name) {
            return Ok(verdict);
        }
        let verdict = self.tree.read().is_exception(name)?;
        self.exception_cache.lock().put(name.to_string(), verdict);
        Ok(verdict)
    }

    /// See [`DomainTree::most_matched_fraction`].
    pub fn most_matched_fraction(&self, bucket: usize) -> f64 {
        self.tree.read().most_matched_fraction(bucket)
    }

    /// See [`DomainTree::most_descendants_fraction`].
    pub fn most_descendants_fraction(&self, bucket: usize) -> f64 {
        self.tree.read().most_descendants_fraction(bucket)
    }

    /// Counter snapshot for periodic export.
    pub fn summary(&self) -> TreeSummary {
        self.tree.read().summary()
    }

    /// Run a read-only closure against the tree, e.g. for reconstruction or
    /// list walks, without exposing the guard type.
    pub fn read<R>(&self, f: impl FnOnce(&DomainTree) -> R) -> R {
        f(&self.tree.read())
    }
}
