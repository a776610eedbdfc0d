//! Dynamic variable reordering.
//!
//! # Variable ordering
//!
//! The size of a BDD is highly sensitive to the variable order. For
//! `f = x₁x₂ + x₃x₄ + … + x₂ₙ₋₁x₂ₙ` the order `x₁, x₂, …, x₂ₙ` gives a diagram
//! linear in `n`, while `x₁, x₃, …, x₂ₙ₋₁, x₂, x₄, …, x₂ₙ` gives an
//! exponential one. Finding the optimal order is NP-complete, so reordering
//! relies on heuristics built from one primitive: the adjacent swap.
//!
//! # Adjacent swap
//!
//! Swapping `a` with its successor `b` only touches nodes labelled `a` that
//! have at least one child labelled `b`. For such a node `(a, L, H)` with
//! cofactors `f₁₁, f₁₀` of `H` and `f₀₁, f₀₀` of `L` (with respect to `b`):
//!
//! ```text
//!        a                      b
//!      /   \                  /   \
//!     b     b       ==>      a     a
//!    / \   / \              / \   / \
//!  f00 f01 f10 f11        f00 f10 f01 f11
//! ```
//!
//! The node is relabelled in place to `(b, (a, f₀₀, f₁₀), (a, f₀₁, f₁₁))`, so
//! its identifier and function are preserved and no parent needs rewriting.
//! A new child whose two cofactors coincide is replaced by that cofactor.
//!
//! # Sifting
//!
//! Rudell's sifting moves each variable through the order, one adjacent swap
//! at a time, and leaves it where the diagram was smallest:
//!
//! 1. Record the current size as the best seen so far.
//! 2. Move the variable down towards the terminals, measuring after each
//!    swap; stop early once the size exceeds `max_growth` times the best.
//! 3. Move it back up past its starting position, measuring the same way.
//! 4. Replay the swaps needed to land on the best position.
//!
//! Each variable is sifted once, in identifier order.
//!
//! # References
//!
//! - R. Rudell. "Dynamic variable ordering for ordered binary decision diagrams."
//!   ICCAD 1993.
//! - R. Bryant. "Graph-Based Algorithms for Boolean Function Manipulation."
//!   IEEE Trans. Computers, 1986.

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::manager::{alive_in, Manager, State};
use crate::node::NodeId;
use crate::types::{Level, Var};

/// Statistics collected during reordering.
#[derive(Debug, Clone, Default)]
pub struct ReorderStats {
    /// Number of adjacent swaps performed.
    pub swaps: usize,
    /// Size of the diagram before reordering.
    pub initial_size: usize,
    /// Size of the diagram after reordering.
    pub final_size: usize,
    /// Best size seen during reordering.
    pub best_size: usize,
    /// Number of variables sifted.
    pub variables_processed: usize,
}

impl ReorderStats {
    /// Calculate the size reduction ratio.
    pub fn reduction_ratio(&self) -> f64 {
        if self.initial_size == 0 {
            return 0.0;
        }
        1.0 - (self.final_size as f64 / self.initial_size as f64)
    }

    /// Calculate the percentage reduction.
    pub fn reduction_percent(&self) -> f64 {
        self.reduction_ratio() * 100.0
    }
}

/// A child of a relabelled node, before it is materialized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Part {
    Existing(NodeId),
    New(NodeId, NodeId),
}

/// Planned rewrite of one node at the upper level.
struct Rewrite {
    node: NodeId,
    low: NodeId,
    high: NodeId,
    /// Cofactors `(f00, f01, f10, f11)`.
    cofactors: (NodeId, NodeId, NodeId, NodeId),
}

impl State {
    fn split(&self, id: NodeId, var: Var) -> (NodeId, NodeId) {
        if id.is_terminal() {
            return (id, id);
        }
        let node = self.node(id);
        if node.variable == var {
            (node.low, node.high)
        } else {
            (id, id)
        }
    }

    fn plan_part(&self, var: Var, low: NodeId, high: NodeId) -> Part {
        if low == high {
            return Part::Existing(low);
        }
        let nodes = &self.nodes;
        match self.unique.get(var, low, high, |n| alive_in(nodes, n)) {
            Some(id) => Part::Existing(id),
            None => Part::New(low, high),
        }
    }

    fn build_part(&mut self, var: Var, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            low
        } else {
            self.find_or_insert(var, low, high)
        }
    }

    /// Check the relabelled nodes against each other and against live nodes at `b`.
    fn check_rewrites(&self, a: Var, b: Var, rewrites: &[Rewrite]) -> Result<()> {
        let nodes = &self.nodes;
        let mut planned = HashSet::new();

        for rw in rewrites {
            let (f00, f01, f10, f11) = rw.cofactors;
            let low = self.plan_part(a, f00, f10);
            let high = self.plan_part(a, f01, f11);

            let clash = !planned.insert((low, high))
                || match (low, high) {
                    (Part::Existing(l), Part::Existing(h)) => self.unique.get(b, l, h, |n| alive_in(nodes, n)).is_some(),
                    _ => false,
                };
            if clash {
                return Err(Error::ConsingConflict {
                    variable: b,
                    low: rw.low,
                    high: rw.high,
                });
            }
        }

        Ok(())
    }

    /// Swap `a` with its immediate successor `b` in the order.
    pub(crate) fn swap(&mut self, a: Var, b: Var) -> Result<()> {
        for var in [a, b] {
            if !self.is_known(var) {
                return Err(Error::UnknownVariable(var));
            }
        }
        let level = self.var_level(a);
        if level + 1 >= self.num_vars as usize {
            return Err(Error::LastVariable(a));
        }
        if self.order[level + 1] != b {
            return Err(Error::NotAdjacent { first: a, second: b });
        }

        let mut rewrites = Vec::new();
        for id in self.unique.subtable(a).nodes() {
            if !self.is_alive(id) {
                continue;
            }
            let node = self.node(id);
            let (f00, f01) = self.split(node.low, b);
            let (f10, f11) = self.split(node.high, b);
            if (f00, f01) == (node.low, node.low) && (f10, f11) == (node.high, node.high) {
                continue;
            }
            rewrites.push(Rewrite {
                node: id,
                low: node.low,
                high: node.high,
                cofactors: (f00, f01, f10, f11),
            });
        }
        self.check_rewrites(a, b, &rewrites)?;

        for rw in &rewrites {
            self.unique.delete(a, rw.low, rw.high);
        }
        for rw in &rewrites {
            let (f00, f01, f10, f11) = rw.cofactors;
            let new_low = self.build_part(a, f00, f10);
            let new_high = self.build_part(a, f01, f11);
            self.inc_ref(new_low);
            self.inc_ref(new_high);

            let node = self.node_mut(rw.node);
            node.variable = b;
            node.low = new_low;
            node.high = new_high;
            let nodes = &self.nodes;
            self.unique.put(b, new_low, new_high, rw.node, |n| alive_in(nodes, n))?;

            for child in [rw.low, rw.high] {
                if self.dec_ref(child) == 0 && !child.is_terminal() {
                    self.delete_rec(child);
                }
            }
        }

        self.order.swap(level, level + 1);
        self.levels[a.index()] = level + 1;
        self.levels[b.index()] = level;
        debug!("swap({}, {}): {} nodes relabelled", a, b, rewrites.len());
        Ok(())
    }

    fn swap_at(&mut self, level: Level) -> Result<()> {
        let (a, b) = (self.order[level.index()], self.order[level.next().index()]);
        self.swap(a, b)
    }

    fn sift_variable(&mut self, root: NodeId, var: Var, stats: &mut ReorderStats) -> Result<()> {
        let num_levels = self.num_vars as usize;
        let max_growth = self.config.max_growth;
        let start = Level::new(self.var_level(var));
        let mut current = start;
        let mut best = start;
        let mut best_size = self.size(root);
        let exceeds = |size: usize, best_size: usize| size as f64 > max_growth * best_size as f64;

        while current.next().index() < num_levels {
            self.swap_at(current)?;
            current = current.next();
            stats.swaps += 1;
            let size = self.size(root);
            if size < best_size {
                best_size = size;
                best = current;
            } else if exceeds(size, best_size) {
                break;
            }
        }

        while let Some(prev) = current.prev() {
            self.swap_at(prev)?;
            current = prev;
            stats.swaps += 1;
            let size = self.size(root);
            if size < best_size {
                best_size = size;
                best = current;
            } else if current < start && exceeds(size, best_size) {
                break;
            }
        }

        while current < best {
            self.swap_at(current)?;
            current = current.next();
            stats.swaps += 1;
        }
        while let Some(prev) = current.prev().filter(|_| current > best) {
            self.swap_at(prev)?;
            current = prev;
            stats.swaps += 1;
        }

        debug!("sifted {}: {} -> {}, size {}", var, start, best, best_size);
        stats.best_size = stats.best_size.min(best_size);
        Ok(())
    }

    /// Hold every live internal node, so that no node alive before a pass is collected by it.
    fn pin_live(&mut self) -> Vec<NodeId> {
        let pinned: Vec<NodeId> = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| !n.is_terminal())
            .map(|n| n.id)
            .collect();
        for &id in &pinned {
            self.inc_ref(id);
        }
        pinned
    }

    /// Plain decrement of pinned nodes; unreferenced ones stay alive until the next sweep.
    fn unpin(&mut self, pinned: &[NodeId]) {
        for &id in pinned {
            self.dec_ref(id);
        }
    }

    pub(crate) fn sifting(&mut self, root: NodeId) -> Result<(NodeId, ReorderStats)> {
        let mut stats = ReorderStats {
            initial_size: self.size(root),
            ..Default::default()
        };

        let pinned = self.pin_live();
        let reduced = self.reduce(root);
        self.inc_ref(reduced);

        stats.best_size = self.size(reduced);
        let mut result = Ok(());
        for id in 0..self.num_vars {
            result = self.sift_variable(reduced, Var::new(id), &mut stats);
            if result.is_err() {
                break;
            }
            stats.variables_processed += 1;
        }

        if let Err(e) = result {
            // Nodes built by the reduction go away; pinned ones, `root` included, stay.
            if reduced == root {
                self.dec_ref(reduced);
            } else {
                self.release(reduced);
            }
            self.unpin(&pinned);
            debug!("sifting({}) aborted: {}", root, e);
            return Err(e);
        }

        self.unpin(&pinned);
        self.dec_ref(reduced);

        stats.final_size = self.size(reduced);
        info!(
            "sifting: size {} -> {} ({:.1}% reduction), {} swaps, {} variables",
            stats.initial_size,
            stats.final_size,
            stats.reduction_percent(),
            stats.swaps,
            stats.variables_processed
        );
        Ok((reduced, stats))
    }
}

impl Manager {
    /// Swap variable `a` with its immediate successor `b` in the current order.
    ///
    /// Every node of the manager labelled `a` is rewritten in place, so all
    /// handles keep denoting the same function; `root` is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::LastVariable`] if `a` is last in the order, [`Error::NotAdjacent`]
    /// if `b` does not follow `a`, [`Error::UnknownVariable`] for unmanaged
    /// variables, and [`Error::ConsingConflict`] if the rewrite would collide
    /// with an existing node (possible only on unreduced graphs). On error the
    /// graph and the order are left untouched.
    pub fn swap(&self, root: NodeId, a: Var, b: Var) -> Result<NodeId> {
        debug!("swap(root = {}, a = {}, b = {})", root, a, b);
        self.state.write().swap(a, b)?;
        Ok(root)
    }

    /// Reorder variables with Rudell's sifting to shrink the diagram rooted at `root`.
    ///
    /// The root is reduced first and the reduced root is returned. Every node
    /// alive before the call, `root` included, stays alive and keeps its
    /// function; nodes that only served intermediate orders are collected as
    /// the swaps detach them. Unreferenced leftovers of the input are left for
    /// [`Manager::collect_garbage`].
    ///
    /// # Errors
    ///
    /// Propagates a failed [`Manager::swap`]. The variables sifted so far keep
    /// their new positions, and `root` is still alive.
    pub fn sifting(&self, root: NodeId) -> Result<NodeId> {
        self.sifting_with_stats(root).map(|(root, _)| root)
    }

    pub fn sifting_with_stats(&self, root: NodeId) -> Result<(NodeId, ReorderStats)> {
        debug!("sifting(root = {})", root);
        self.state.write().sifting(root)
    }
}
