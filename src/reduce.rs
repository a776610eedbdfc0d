//! Bulk canonicalization of raw node graphs.
//!
//! [`Manager::create`] performs plain hash-consing and does not apply the
//! elimination rule, so graphs built node by node may contain redundant tests
//! and, through them, duplicated functions. [`Manager::reduce`] implements
//! Bryant's bottom-up reduction over such a graph:
//!
//! 1. Collect every node reachable from the root and bucket them by level.
//! 2. Walk the levels from the terminals up to the top variable.
//! 3. Within a level, a node whose (already reduced) children coincide takes
//!    the identity of that child.
//! 4. The remaining nodes are sorted by their `(low, high)` key and nodes
//!    sharing a key are merged into one representative.
//!
//! Representatives are consed through the unique table, so the result shares
//! structure with everything else the manager holds.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::manager::{Manager, State};
use crate::node::NodeId;

impl State {
    pub(crate) fn reduce(&mut self, root: NodeId) -> NodeId {
        if root.is_terminal() {
            return root;
        }

        let num_levels = self.num_vars as usize;
        let mut by_level: Vec<Vec<NodeId>> = vec![Vec::new(); num_levels];
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id.is_terminal() || !visited.insert(id) {
                continue;
            }
            let node = self.node(id);
            by_level[self.var_level(node.variable)].push(id);
            stack.push(node.low);
            stack.push(node.high);
        }

        let mut canonical: HashMap<NodeId, NodeId> = HashMap::new();
        canonical.insert(NodeId::ZERO, NodeId::ZERO);
        canonical.insert(NodeId::ONE, NodeId::ONE);

        for level in (0..num_levels).rev() {
            let var = self.order[level];
            let mut keyed = Vec::with_capacity(by_level[level].len());

            for &id in &by_level[level] {
                let node = self.node(id);
                let low = canonical[&node.low];
                let high = canonical[&node.high];
                if low == high {
                    canonical.insert(id, low);
                } else {
                    keyed.push((low, high, id));
                }
            }

            keyed.sort_unstable();
            let mut i = 0;
            while i < keyed.len() {
                let (low, high, _) = keyed[i];
                let representative = self.find_or_insert(var, low, high);
                while i < keyed.len() && (keyed[i].0, keyed[i].1) == (low, high) {
                    canonical.insert(keyed[i].2, representative);
                    i += 1;
                }
            }
        }

        let res = canonical[&root];
        debug!("reduce({}) -> {}: {} nodes visited", root, res, visited.len());
        res
    }
}

impl Manager {
    /// Return the reduced, canonical form of the graph rooted at `root`.
    ///
    /// The input graph is left in place; nodes it no longer needs are
    /// reclaimed by the usual reference counting.
    pub fn reduce(&self, root: NodeId) -> NodeId {
        self.state.write().reduce(root)
    }
}
