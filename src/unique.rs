//! Per-variable hash-consing table for BDD nodes.
//!
//! This module implements the unique table that guarantees global structural
//! sharing: at most one live node exists for any `(variable, low, high)` shape.
//!
//! # Design
//!
//! The manager keeps nodes in an arena indexed by [`NodeId`], and a bank of
//! subtables for hash-based lookup, one per variable:
//!
//! ```text
//! subtables[0] → Subtable for variable x0
//! subtables[1] → Subtable for variable x1
//! subtables[2] → Subtable for variable x2
//! ...
//! ```
//!
//! Each subtable is an array of buckets holding chained `(low, high) → node`
//! entries. Entries do not own their node: a node is kept alive by its
//! reference count only, and every lookup confirms that the stored node is
//! still alive. A stale entry is therefore harmless, and [`Subtable::remove_dead`]
//! purges them in bulk.
//!
//! # Resizing
//!
//! A subtable doubles its bucket count when the average chain length reaches
//! [`HIGH_WATER`] and halves it when the average drops to [`LOW_WATER`],
//! never going below the bucket count it was created with.
//!
//! Keeping one subtable per variable makes reordering cheap: an adjacent swap
//! only touches the two subtables of the swapped variables.

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::types::Var;

/// Average chain length at which a subtable doubles.
pub const HIGH_WATER: usize = 10;
/// Average chain length at which a subtable halves.
pub const LOW_WATER: usize = 2;

/// Minimum number of subtables allocated up front.
const MIN_BANK: usize = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Entry {
    low: NodeId,
    high: NodeId,
    node: NodeId,
}

impl Entry {
    fn matches(&self, low: NodeId, high: NodeId) -> bool {
        self.low == low && self.high == high
    }
}

#[derive(Debug, Clone, Default)]
struct Bucket {
    chain: Vec<Entry>,
}

impl Bucket {
    fn position(&self, low: NodeId, high: NodeId) -> Option<usize> {
        self.chain.iter().position(|e| e.matches(low, high))
    }

    fn get(&self, low: NodeId, high: NodeId, is_alive: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.chain
            .iter()
            .find(|e| e.matches(low, high))
            .map(|e| e.node)
            .filter(|&node| is_alive(node))
    }

    /// Returns `true` if a new entry was chained.
    fn put(&mut self, variable: Var, low: NodeId, high: NodeId, node: NodeId, is_alive: impl Fn(NodeId) -> bool) -> Result<bool> {
        match self.position(low, high) {
            Some(i) => {
                let existing = self.chain[i].node;
                if existing != node && is_alive(existing) {
                    return Err(Error::ConsingConflict { variable, low, high });
                }
                self.chain[i].node = node;
                Ok(false)
            }
            None => {
                self.chain.push(Entry { low, high, node });
                Ok(true)
            }
        }
    }

    fn delete(&mut self, low: NodeId, high: NodeId) -> Option<NodeId> {
        let i = self.position(low, high)?;
        Some(self.chain.swap_remove(i).node)
    }

    fn remove_dead(&mut self, is_alive: impl Fn(NodeId) -> bool) -> usize {
        let before = self.chain.len();
        self.chain.retain(|e| is_alive(e.node));
        before - self.chain.len()
    }
}

/// A subtable storing the BDD nodes of a single variable.
///
/// Nodes in a subtable all test the same variable. The chains are keyed
/// by the `(low, high)` children since the variable is implicit.
#[derive(Debug, Clone)]
pub struct Subtable {
    /// The variable for all nodes in this subtable.
    pub variable: Var,
    buckets: Vec<Bucket>,
    /// Number of chained entries (live or stale).
    count: usize,
    min_buckets: usize,
}

impl Subtable {
    /// Create a new empty subtable with the given number of buckets.
    pub fn new(variable: Var, buckets: usize) -> Self {
        let buckets = buckets.max(1);
        Self {
            variable,
            buckets: vec![Bucket::default(); buckets],
            count: 0,
            min_buckets: buckets,
        }
    }

    fn bucket_index(&self, low: NodeId, high: NodeId) -> usize {
        let v = self.variable.id() as u64;
        let l = low.get() as u64;
        let h = high.get() as u64;
        let hash = 17u64
            .wrapping_add(v)
            .wrapping_add(23u64.wrapping_mul(l.wrapping_add(23u64.wrapping_mul(h))));
        ((hash & 0x7fff_ffff) % self.buckets.len() as u64) as usize
    }

    /// Look up the live node with these children.
    pub fn get(&self, low: NodeId, high: NodeId, is_alive: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.buckets[self.bucket_index(low, high)].get(low, high, is_alive)
    }

    /// Register `node` under its `(low, high)` key.
    ///
    /// A stale entry at the same key is overwritten; a live one is a
    /// [`Error::ConsingConflict`].
    pub fn put(&mut self, low: NodeId, high: NodeId, node: NodeId, is_alive: impl Fn(NodeId) -> bool) -> Result<()> {
        if self.count >= HIGH_WATER * self.buckets.len() {
            self.resize(2 * self.buckets.len());
        }
        let i = self.bucket_index(low, high);
        if self.buckets[i].put(self.variable, low, high, node, is_alive)? {
            self.count += 1;
        }
        Ok(())
    }

    /// Remove the entry with these children.
    ///
    /// Returns the node that was registered, alive or not.
    pub fn delete(&mut self, low: NodeId, high: NodeId) -> Option<NodeId> {
        let i = self.bucket_index(low, high);
        let removed = self.buckets[i].delete(low, high);
        if removed.is_some() {
            self.count -= 1;
            self.maybe_shrink();
        }
        removed
    }

    /// Purge entries whose node is no longer alive.
    pub fn remove_dead(&mut self, is_alive: impl Fn(NodeId) -> bool) -> usize {
        let removed: usize = self.buckets.iter_mut().map(|b| b.remove_dead(&is_alive)).sum();
        self.count -= removed;
        self.maybe_shrink();
        removed
    }

    fn maybe_shrink(&mut self) {
        let len = self.buckets.len();
        if len > self.min_buckets && self.count <= LOW_WATER * len {
            self.resize((len / 2).max(self.min_buckets));
        }
    }

    fn resize(&mut self, size: usize) {
        log::debug!("resizing subtable for {} from {} to {} buckets", self.variable, self.buckets.len(), size);
        let old = std::mem::replace(&mut self.buckets, vec![Bucket::default(); size]);
        for entry in old.into_iter().flat_map(|b| b.chain) {
            let i = self.bucket_index(entry.low, entry.high);
            self.buckets[i].chain.push(entry);
        }
    }

    /// Get the number of entries in this subtable.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the subtable is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the current number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Iterate over all registered nodes, including stale ones.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.buckets.iter().flat_map(|b| b.chain.iter().map(|e| e.node))
    }
}

/// The bank of per-variable subtables.
#[derive(Debug, Clone)]
pub struct UniqueTable {
    subtables: Vec<Subtable>,
    initial_buckets: usize,
}

impl UniqueTable {
    /// Create a bank able to hold `num_vars` variables without growing.
    pub fn new(num_vars: usize, initial_buckets: usize) -> Self {
        let size = num_vars.max(MIN_BANK);
        Self {
            subtables: (0..size).map(|v| Subtable::new(Var::new(v as u32), initial_buckets)).collect(),
            initial_buckets,
        }
    }

    /// Make room for `var`, doubling the bank as needed.
    pub fn ensure_variable(&mut self, var: Var) {
        let mut size = self.subtables.len();
        while var.index() >= size {
            size *= 2;
        }
        if size > self.subtables.len() {
            log::debug!("growing unique table bank from {} to {} subtables", self.subtables.len(), size);
            let start = self.subtables.len();
            let buckets = self.initial_buckets;
            self.subtables.extend((start..size).map(|v| Subtable::new(Var::new(v as u32), buckets)));
        }
    }

    /// Number of subtables currently allocated.
    pub fn bank_size(&self) -> usize {
        self.subtables.len()
    }

    pub fn subtable(&self, var: Var) -> &Subtable {
        &self.subtables[var.index()]
    }

    pub fn get(&self, var: Var, low: NodeId, high: NodeId, is_alive: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.subtables[var.index()].get(low, high, is_alive)
    }

    pub fn put(&mut self, var: Var, low: NodeId, high: NodeId, node: NodeId, is_alive: impl Fn(NodeId) -> bool) -> Result<()> {
        self.subtables[var.index()].put(low, high, node, is_alive)
    }

    pub fn delete(&mut self, var: Var, low: NodeId, high: NodeId) -> Option<NodeId> {
        self.subtables[var.index()].delete(low, high)
    }

    pub fn remove_dead(&mut self, is_alive: impl Fn(NodeId) -> bool) -> usize {
        self.subtables.iter_mut().map(|st| st.remove_dead(&is_alive)).sum()
    }

    /// Total number of entries over all subtables.
    pub fn len(&self) -> usize {
        self.subtables.iter().map(Subtable::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subtables.iter().all(Subtable::is_empty)
    }
}
