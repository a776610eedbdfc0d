//! The BDD manager.
//!
//! # Node storage
//!
//! Nodes live in an arena addressed by [`NodeId`]. Slots `0` and `1` hold the
//! two terminals; every other slot holds an internal node or is empty once
//! the node has been collected. Identifiers grow monotonically and are never
//! reused, so a stale handle can only ever observe "not alive".
//!
//! # Reference counting
//!
//! Each node counts its incoming references: one per parent edge, plus one
//! per [`Manager::reference`] call made by the client. A freshly created node
//! starts at zero. An internal node is eligible for collection exactly when
//! its count is zero, either explicitly ([`Manager::delete_node`],
//! [`Manager::release`]) or during a sweep ([`Manager::collect_garbage`]).
//! Collection is recursive: deleting a node releases its children, and any
//! child whose count drops to zero is deleted as well.
//!
//! # Locking
//!
//! All state sits behind one [`RwLock`]. Operations that create, relabel or
//! delete nodes take the write lock for their whole duration, pure traversals
//! take the read lock.

use std::collections::HashSet;
use std::fmt::Debug;

use log::{debug, info};
use parking_lot::RwLock;

use crate::cache::{CacheStats, ComputedTable};
use crate::config::ManagerConfig;
use crate::node::{Node, NodeId};
use crate::types::{Level, Var};
use crate::unique::UniqueTable;

pub(crate) fn alive_in(nodes: &[Option<Node>], id: NodeId) -> bool {
    matches!(nodes.get(id.index()), Some(Some(_)))
}

pub(crate) struct State {
    pub(crate) nodes: Vec<Option<Node>>,
    /// Number of live internal nodes.
    pub(crate) live: usize,
    pub(crate) num_vars: u32,
    /// Level → variable.
    pub(crate) order: Vec<Var>,
    /// Variable → level.
    pub(crate) levels: Vec<usize>,
    pub(crate) unique: UniqueTable,
    pub(crate) cache: ComputedTable,
    pub(crate) config: ManagerConfig,
}

impl State {
    fn new(num_vars: u32, config: ManagerConfig) -> Self {
        let sentinel = Var::new(num_vars);
        let nodes = vec![
            Some(Node::terminal(false, sentinel)),
            Some(Node::terminal(true, sentinel)),
        ];
        let order: Vec<Var> = (0..num_vars).map(Var::new).collect();
        let levels = (0..num_vars as usize).collect();
        Self {
            nodes,
            live: 0,
            num_vars,
            order,
            levels,
            unique: UniqueTable::new(num_vars as usize, config.initial_buckets),
            cache: ComputedTable::new(),
            config,
        }
    }

    pub(crate) fn is_alive(&self, id: NodeId) -> bool {
        alive_in(&self.nodes, id)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("Node {} is not alive", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("Node {} is not alive", id),
        }
    }

    pub(crate) fn is_known(&self, var: Var) -> bool {
        var.id() < self.num_vars
    }

    /// Level of a variable; the terminal sentinel sits below every variable.
    pub(crate) fn var_level(&self, var: Var) -> usize {
        if var.id() >= self.num_vars {
            self.num_vars as usize
        } else {
            self.levels[var.index()]
        }
    }

    /// Level of the variable tested by `id`.
    pub(crate) fn level(&self, id: NodeId) -> usize {
        if id.is_terminal() {
            self.num_vars as usize
        } else {
            self.var_level(self.node(id).variable)
        }
    }

    pub(crate) fn inc_ref(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.ref_count = node.ref_count.saturating_add(1);
    }

    /// Decrement the count of `id`, returning the new count.
    pub(crate) fn dec_ref(&mut self, id: NodeId) -> u32 {
        let node = self.node_mut(id);
        node.ref_count = node.ref_count.saturating_sub(1);
        node.ref_count
    }

    /// Raw consing: the live node of shape `(var, low, high)`, created if absent.
    pub(crate) fn find_or_insert(&mut self, var: Var, low: NodeId, high: NodeId) -> NodeId {
        let nodes = &self.nodes;
        if let Some(id) = self.unique.get(var, low, high, |n| alive_in(nodes, n)) {
            return id;
        }

        assert!(self.nodes.len() < u32::MAX as usize, "Node storage is full");
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Some(Node::internal(id, var, low, high)));
        self.live += 1;
        self.inc_ref(low);
        self.inc_ref(high);

        let nodes = &self.nodes;
        if let Err(e) = self.unique.put(var, low, high, id, |n| alive_in(nodes, n)) {
            panic!("{}", e);
        }
        id
    }

    /// Consing with the elimination rule applied.
    pub(crate) fn mk(&mut self, var: Var, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            return low;
        }
        self.find_or_insert(var, low, high)
    }

    pub(crate) fn create(&mut self, var: Var, low: NodeId, high: NodeId) -> NodeId {
        debug!("create(v = {}, high = {}, low = {})", var, high, low);
        assert!(self.is_known(var), "Unknown variable {}", var);
        let level = self.var_level(var);
        assert!(
            self.level(low) > level && self.level(high) > level,
            "Children of a node at {} must lie below level {}",
            var,
            level
        );
        self.find_or_insert(var, low, high)
    }

    pub(crate) fn create_variable(&mut self) -> Var {
        let var = Var::new(self.num_vars);
        self.num_vars += 1;
        self.order.push(var);
        self.levels.push(self.order.len() - 1);
        self.unique.ensure_variable(var);

        let sentinel = Var::new(self.num_vars);
        self.node_mut(NodeId::ZERO).variable = sentinel;
        self.node_mut(NodeId::ONE).variable = sentinel;

        debug!("create_variable() -> {}", var);
        var
    }

    /// Delete `id` (whose count must be zero) and every descendant that becomes unreferenced.
    pub(crate) fn delete_rec(&mut self, id: NodeId) -> usize {
        let mut deleted = 0;
        let mut stack = vec![id];

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes[id.index()].take() else {
                continue;
            };
            let removed = self.unique.delete(node.variable, node.low, node.high);
            debug_assert_eq!(removed, Some(id), "unique table out of sync for {}", node);
            self.live -= 1;
            deleted += 1;

            for child in [node.low, node.high] {
                if self.dec_ref(child) == 0 && !child.is_terminal() {
                    stack.push(child);
                }
            }
        }

        deleted
    }

    pub(crate) fn delete_node(&mut self, id: NodeId) -> usize {
        if id.is_terminal() || !self.is_alive(id) || self.node(id).ref_count != 0 {
            return 0;
        }
        let deleted = self.delete_rec(id);
        debug!("delete_node({}) removed {} nodes", id, deleted);
        deleted
    }

    pub(crate) fn release(&mut self, id: NodeId) -> usize {
        if self.dec_ref(id) == 0 && !id.is_terminal() {
            self.delete_rec(id)
        } else {
            0
        }
    }

    pub(crate) fn collect_garbage(&mut self) -> usize {
        let candidates: Vec<NodeId> = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| !n.is_terminal() && n.ref_count == 0)
            .map(|n| n.id)
            .collect();

        let mut deleted = 0;
        for id in candidates {
            // Unreferenced nodes have no parents, so no cascade can reach them first.
            if self.is_alive(id) {
                deleted += self.delete_rec(id);
            }
        }

        let nodes = &self.nodes;
        let stale = self.unique.remove_dead(|n| alive_in(nodes, n));
        let purged = self.cache.purge(|n| alive_in(nodes, n));
        info!(
            "collect_garbage: {} nodes removed, {} stale entries, {} cache entries purged, {} live",
            deleted, stale, purged, self.live
        );
        deleted
    }

    /// Number of distinct nodes (terminals included) reachable from `root`.
    pub(crate) fn size(&self, root: NodeId) -> usize {
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if !id.is_terminal() {
                let node = self.node(id);
                stack.push(node.low);
                stack.push(node.high);
            }
        }

        visited.len()
    }
}

/// A manager owning a shared, hash-consed BDD node graph.
///
/// # Examples
///
/// ```
/// use robdd::manager::Manager;
/// use robdd::types::Var;
///
/// let m = Manager::new(2);
/// let x = m.create(Var::new(0), true, false);
/// let y = m.create(Var::new(1), true, false);
/// let f = m.and(x, y);
///
/// assert_eq!(m.index(f), Var::new(0));
/// assert_eq!(m.low(f), m.zero());
/// assert_eq!(m.high(f), y);
/// assert_eq!(m.get_size(f), 4);
/// ```
pub struct Manager {
    pub(crate) state: RwLock<State>,
}

impl Manager {
    /// Create a manager over `num_vars` variables, ordered by identifier.
    pub fn new(num_vars: u32) -> Self {
        Self::with_config(num_vars, ManagerConfig::default())
    }

    pub fn with_config(num_vars: u32, config: ManagerConfig) -> Self {
        debug!("Manager::new(num_vars = {}, config = {:?})", num_vars, config);
        Self {
            state: RwLock::new(State::new(num_vars, config)),
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Manager::new(0)
    }
}

impl Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Manager")
            .field("num_vars", &state.num_vars)
            .field("live", &state.live)
            .field("unique", &state.unique.len())
            .field("cache", &state.cache.len())
            .finish()
    }
}

impl Manager {
    pub fn zero(&self) -> NodeId {
        NodeId::ZERO
    }
    pub fn one(&self) -> NodeId {
        NodeId::ONE
    }

    pub fn num_vars(&self) -> u32 {
        self.state.read().num_vars
    }

    /// The current order, top to bottom.
    pub fn variable_order(&self) -> Vec<Var> {
        self.state.read().order.clone()
    }

    /// The current level of `var`, if the manager knows it.
    pub fn level(&self, var: Var) -> Option<Level> {
        let state = self.state.read();
        state.is_known(var).then(|| Level::new(state.var_level(var)))
    }

    /// Return the canonical node testing `var` with the given children.
    ///
    /// Either child may be a `bool`, standing for the matching terminal.
    /// This is raw hash-consing: a node whose children coincide is still
    /// created, and only [`Manager::reduce`] eliminates it.
    ///
    /// # Panics
    ///
    /// Panics if `var` is unknown or a child does not lie strictly below `var`
    /// in the current order.
    pub fn create(&self, var: Var, high: impl Into<NodeId>, low: impl Into<NodeId>) -> NodeId {
        let (high, low) = (high.into(), low.into());
        self.state.write().create(var, low, high)
    }

    /// Append a fresh variable at the bottom of the order.
    pub fn create_variable(&self) -> Var {
        self.state.write().create_variable()
    }

    pub fn is_zero(&self, node: NodeId) -> bool {
        node == NodeId::ZERO
    }
    pub fn is_one(&self, node: NodeId) -> bool {
        node == NodeId::ONE
    }
    pub fn is_terminal(&self, node: NodeId) -> bool {
        node.is_terminal()
    }

    pub fn is_alive(&self, node: NodeId) -> bool {
        self.state.read().is_alive(node)
    }

    /// Snapshot of a node, or `None` once it has been collected.
    pub fn node(&self, node: NodeId) -> Option<Node> {
        let state = self.state.read();
        state.nodes.get(node.index()).copied().flatten()
    }

    /// The variable tested by `node`; the sentinel `num_vars` for terminals.
    pub fn index(&self, node: NodeId) -> Var {
        self.state.read().node(node).variable
    }
    pub fn low(&self, node: NodeId) -> NodeId {
        self.state.read().node(node).low
    }
    pub fn high(&self, node: NodeId) -> NodeId {
        self.state.read().node(node).high
    }
    pub fn value(&self, node: NodeId) -> Option<bool> {
        self.state.read().node(node).value
    }
    pub fn ref_count(&self, node: NodeId) -> u32 {
        self.state.read().node(node).ref_count
    }

    /// Number of distinct nodes reachable from `root`, terminals included.
    pub fn get_size(&self, root: NodeId) -> usize {
        self.state.read().size(root)
    }

    /// Number of live nodes in the manager, terminals included.
    pub fn live_nodes(&self) -> usize {
        self.state.read().live + 2
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.state.read().cache.stats()
    }

    /// Hold `node` as an external root.
    pub fn reference(&self, node: NodeId) -> NodeId {
        self.state.write().inc_ref(node);
        node
    }

    /// [`Manager::create`] followed by [`Manager::reference`], under one lock.
    ///
    /// Between separate `create` and `reference` calls another thread may
    /// release the last reference to the same shape and collect it.
    pub fn create_referenced(&self, var: Var, high: impl Into<NodeId>, low: impl Into<NodeId>) -> NodeId {
        let (high, low) = (high.into(), low.into());
        let mut state = self.state.write();
        let node = state.create(var, low, high);
        state.inc_ref(node);
        node
    }

    /// Drop an external root, collecting it if nothing else references it.
    ///
    /// Returns the number of collected nodes.
    pub fn release(&self, node: NodeId) -> usize {
        self.state.write().release(node)
    }

    /// Delete an unreferenced node and every descendant it leaves unreferenced.
    ///
    /// No-op on terminals, on collected nodes, and on nodes that are still referenced.
    pub fn delete_node(&self, node: NodeId) -> usize {
        self.state.write().delete_node(node)
    }

    /// Collect every internal node that is not reachable from a referenced node.
    pub fn collect_garbage(&self) -> usize {
        self.state.write().collect_garbage()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn v(id: u32) -> Var {
        Var::new(id)
    }

    #[test]
    fn test_terminals() {
        let m = Manager::new(3);

        assert!(m.is_zero(m.zero()));
        assert!(m.is_one(m.one()));
        assert!(m.is_terminal(m.zero()) && m.is_terminal(m.one()));
        assert_eq!(m.value(m.zero()), Some(false));
        assert_eq!(m.value(m.one()), Some(true));
        assert_eq!(m.index(m.zero()), v(3));
        assert_eq!(m.index(m.one()), v(3));
        assert_eq!(m.live_nodes(), 2);
    }

    #[test]
    fn test_initial_order_is_identity() {
        let m = Manager::new(4);
        assert_eq!(m.variable_order(), vec![v(0), v(1), v(2), v(3)]);
        assert_eq!(m.level(v(2)), Some(Level::new(2)));
        assert_eq!(m.level(v(4)), None);
    }

    #[test]
    fn test_create_is_hash_consed() {
        let m = Manager::new(2);

        let a = m.create(v(1), m.one(), m.zero());
        let b = m.create(v(1), true, false);
        assert_eq!(a, b);

        let c = m.create(v(1), false, true);
        assert_ne!(a, c);

        let f = m.create(v(0), a, c);
        assert_eq!(m.create(v(0), b, c), f);
        assert_eq!(m.ref_count(a), 1);
        assert_eq!(m.ref_count(c), 1);
        assert_eq!(m.ref_count(f), 0);
        assert_eq!(m.live_nodes(), 5);
    }

    #[test]
    fn test_create_keeps_redundant_tests() {
        let m = Manager::new(1);
        let n = m.create(v(0), true, true);
        assert!(!m.is_terminal(n));
        assert_eq!(m.low(n), m.high(n));
        assert_eq!(m.ref_count(m.one()), 2);
    }

    #[test]
    #[should_panic(expected = "must lie below")]
    fn test_create_rejects_unordered_children() {
        let m = Manager::new(2);
        let x1 = m.create(v(1), true, false);
        m.create(v(1), x1, false);
    }

    #[test]
    #[should_panic(expected = "Unknown variable")]
    fn test_create_rejects_unknown_variable() {
        let m = Manager::new(2);
        m.create(v(2), true, false);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let m = Manager::new(1);
        let a = m.create(v(0), true, false);
        assert_eq!(m.delete_node(a), 1);
        assert!(!m.is_alive(a));

        let b = m.create(v(0), true, false);
        assert_ne!(a, b);
        assert!(b.get() > a.get());
        assert!(m.node(a).is_none());
    }

    #[test]
    fn test_create_variable_moves_terminals() {
        let m = Manager::new(0);
        let x0 = m.create_variable();
        let x1 = m.create_variable();

        assert_eq!(x0, v(0));
        assert_eq!(x1, v(1));
        assert_eq!(m.num_vars(), 2);
        assert_eq!(m.variable_order(), vec![x0, x1]);
        assert_eq!(m.index(m.one()), v(2));

        for _ in 0..10 {
            m.create_variable();
        }
        let last = Var::new(m.num_vars() - 1);
        let n = m.create(last, true, false);
        assert_eq!(m.index(n), last);
        assert_eq!(m.index(m.zero()), v(12));
    }

    #[test]
    fn test_delete_node_cascades() {
        let m = Manager::new(3);
        let c = m.create(v(2), true, false);
        let b = m.create(v(1), c, false);
        let a = m.create(v(0), b, c);
        assert_eq!(m.ref_count(c), 2);

        // Still referenced by `a`.
        assert_eq!(m.delete_node(b), 0);
        assert!(m.is_alive(b));

        assert_eq!(m.delete_node(a), 3);
        assert!(!m.is_alive(a));
        assert!(!m.is_alive(b));
        assert!(!m.is_alive(c));
        assert_eq!(m.live_nodes(), 2);

        // Terminals are never destroyed.
        assert_eq!(m.delete_node(m.one()), 0);
        assert!(m.is_alive(m.one()));
    }

    #[test]
    fn test_delete_node_keeps_shared_children() {
        let m = Manager::new(2);
        let c = m.create(v(1), true, false);
        let a = m.create(v(0), c, false);
        let b = m.create(v(0), false, c);

        assert_eq!(m.delete_node(a), 1);
        assert!(m.is_alive(c));
        assert_eq!(m.ref_count(c), 1);
        assert!(m.is_alive(b));
    }

    #[test]
    fn test_reference_and_release() {
        let m = Manager::new(2);
        let c = m.create(v(1), true, false);
        let a = m.reference(m.create(v(0), c, false));
        assert_eq!(m.ref_count(a), 1);

        assert_eq!(m.delete_node(a), 0);
        assert_eq!(m.release(a), 2);
        assert!(!m.is_alive(a));
        assert!(!m.is_alive(c));
    }

    #[test]
    fn test_create_referenced() {
        let m = Manager::new(2);
        let a = m.create_referenced(v(1), true, false);
        assert_eq!(m.ref_count(a), 1);
        assert_eq!(m.create_referenced(v(1), true, false), a);
        assert_eq!(m.ref_count(a), 2);

        assert_eq!(m.release(a), 0);
        assert_eq!(m.release(a), 1);
        assert!(!m.is_alive(a));
    }

    #[test]
    fn test_collect_garbage_keeps_referenced_roots() {
        let m = Manager::new(3);
        let c = m.create(v(2), true, false);
        let kept = m.reference(m.create(v(1), c, false));
        let dropped = m.create(v(0), kept, true);
        let lonely = m.create(v(1), true, c);

        assert_eq!(m.collect_garbage(), 2);
        assert!(m.is_alive(kept));
        assert!(m.is_alive(c));
        assert!(!m.is_alive(dropped));
        assert!(!m.is_alive(lonely));
        assert_eq!(m.live_nodes(), 4);
    }

    #[test]
    fn test_get_size_counts_shared_nodes_once() {
        let m = Manager::new(3);
        let c = m.create(v(2), true, false);
        let a = m.create(v(1), c, false);
        let b = m.create(v(1), true, c);
        let root = m.create(v(0), a, b);

        assert_eq!(m.get_size(m.one()), 1);
        assert_eq!(m.get_size(c), 3);
        assert_eq!(m.get_size(root), 6);
    }

    #[test]
    fn test_manager_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Manager>();
    }
}
