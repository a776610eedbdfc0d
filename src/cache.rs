//! Computed table for ITE memoization.
//!
//! A [HashMap]-backed cache from `(f, g, h)` operand triples to results. The
//! cache never keeps a result alive: a hit is only reported when the cached
//! node is still alive, and [`ComputedTable::purge`] drops entries whose
//! result has been collected. Since node identifiers are never reused, an
//! entry pointing at a collected node can never be confused with a newer one,
//! so eviction is fully deterministic.

use std::collections::HashMap;

use crate::node::NodeId;

/// Operand triple of an ITE call.
pub type IteKey = (NodeId, NodeId, NodeId);

/// Hit/miss counters of a [`ComputedTable`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct ComputedTable {
    map: HashMap<IteKey, NodeId>,
    hits: usize,
    misses: usize,
}

impl ComputedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.map.len(),
        }
    }

    /// Clears all entries from the cache.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Looks up a live result.
    pub fn get(&mut self, key: &IteKey, is_alive: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        match self.map.get(key).copied() {
            Some(node) if is_alive(node) => {
                self.hits += 1;
                Some(node)
            }
            Some(_) => {
                self.map.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: IteKey, value: NodeId) {
        self.map.insert(key, value);
    }

    /// Drop every entry whose result or operands have been collected.
    pub fn purge(&mut self, is_alive: impl Fn(NodeId) -> bool) -> usize {
        let before = self.map.len();
        self.map
            .retain(|&(f, g, h), &mut r| is_alive(r) && is_alive(f) && is_alive(g) && is_alive(h));
        before - self.map.len()
    }
}
