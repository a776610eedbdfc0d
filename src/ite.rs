//! Cofactoring and if-then-else synthesis.
//!
//! Every binary connective is expressed through [`Manager::ite`]:
//!
//! | Operation       | ITE form             |
//! |-----------------|----------------------|
//! | `f ∧ g`         | `ite(f, g, 0)`       |
//! | `f ∨ g`         | `ite(f, 1, g)`       |
//! | `f ⊕ g`         | `ite(f, ¬g, g)`      |
//! | `f → g`         | `ite(f, g, 1)`       |
//!
//! Synthesis expands around the variable with the smallest level among the
//! operands, so it stays correct after any reordering. Nodes produced here go
//! through the elimination rule: a node whose children coincide is never built.

use log::debug;

use crate::error::{Error, Result};
use crate::manager::{alive_in, Manager, State};
use crate::node::NodeId;
use crate::types::Var;

impl State {
    /// Cofactor of `node` with `var` fixed to `value`.
    ///
    /// Nodes whose level lies below `var` cannot mention it and are returned as is.
    pub(crate) fn restrict_rec(&mut self, node: NodeId, var: Var, value: bool, memo: &mut Vec<Option<NodeId>>) -> NodeId {
        if node.is_terminal() {
            return node;
        }
        let n = *self.node(node);
        if n.variable == var {
            return if value { n.high } else { n.low };
        }
        if self.var_level(n.variable) > self.var_level(var) {
            return node;
        }
        if let Some(&Some(res)) = memo.get(node.index()) {
            return res;
        }

        let low = self.restrict_rec(n.low, var, value, memo);
        let high = self.restrict_rec(n.high, var, value, memo);
        let res = self.mk(n.variable, low, high);

        if memo.len() <= node.index() {
            memo.resize(node.index() + 1, None);
        }
        memo[node.index()] = Some(res);
        res
    }

    /// Negative and positive cofactors with respect to a top variable.
    fn cofactors(&mut self, node: NodeId, var: Var) -> (NodeId, NodeId) {
        let mut memo = Vec::new();
        let low = self.restrict_rec(node, var, false, &mut memo);
        let high = self.restrict_rec(node, var, true, &mut memo);
        (low, high)
    }

    pub(crate) fn negate_rec(&mut self, node: NodeId) -> NodeId {
        if node == NodeId::ZERO {
            return NodeId::ONE;
        }
        if node == NodeId::ONE {
            return NodeId::ZERO;
        }

        let key = (node, NodeId::ZERO, NodeId::ONE);
        let nodes = &self.nodes;
        if let Some(res) = self.cache.get(&key, |n| alive_in(nodes, n)) {
            return res;
        }

        let n = *self.node(node);
        let low = self.negate_rec(n.low);
        let high = self.negate_rec(n.high);
        let res = self.mk(n.variable, low, high);
        self.cache.insert(key, res);
        res
    }

    pub(crate) fn ite_rec(&mut self, f: NodeId, g: NodeId, h: NodeId) -> NodeId {
        if g == NodeId::ONE && h == NodeId::ZERO {
            return f;
        }
        if g == NodeId::ZERO && h == NodeId::ONE {
            return self.negate_rec(f);
        }
        if f == NodeId::ONE {
            return g;
        }
        if f == NodeId::ZERO {
            return h;
        }
        if g == h {
            return g;
        }

        let key = (f, g, h);
        let nodes = &self.nodes;
        if let Some(res) = self.cache.get(&key, |n| alive_in(nodes, n)) {
            debug!("cache: ite({}, {}, {}) -> {}", f, g, h, res);
            return res;
        }

        let top = self.level(f).min(self.level(g)).min(self.level(h));
        let var = self.order[top];

        let (f0, f1) = self.cofactors(f, var);
        let (g0, g1) = self.cofactors(g, var);
        let (h0, h1) = self.cofactors(h, var);

        let high = self.ite_rec(f1, g1, h1);
        let low = self.ite_rec(f0, g0, h0);
        let res = self.mk(var, low, high);

        debug!("computed: ite({}, {}, {}) -> {}", f, g, h, res);
        self.cache.insert(key, res);
        res
    }
}

impl Manager {
    /// Restrict `node` by forcing at most one variable.
    ///
    /// `positive` fixes its variable to true, `negative` to false; passing
    /// neither returns `node` unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictingRestriction`] when both sides are given,
    /// [`Error::UnknownVariable`] when the variable is not managed.
    pub fn restrict(&self, node: NodeId, positive: Option<Var>, negative: Option<Var>) -> Result<NodeId> {
        debug!("restrict(node = {}, positive = {:?}, negative = {:?})", node, positive, negative);
        let (var, value) = match (positive, negative) {
            (Some(positive), Some(negative)) => return Err(Error::ConflictingRestriction { positive, negative }),
            (Some(var), None) => (var, true),
            (None, Some(var)) => (var, false),
            (None, None) => return Ok(node),
        };

        let mut state = self.state.write();
        if !state.is_known(var) {
            return Err(Error::UnknownVariable(var));
        }
        let mut memo = vec![None; state.nodes.len()];
        Ok(state.restrict_rec(node, var, value, &mut memo))
    }

    /// If-then-else: `(f ∧ g) ∨ (¬f ∧ h)`.
    pub fn ite(&self, f: NodeId, g: NodeId, h: NodeId) -> NodeId {
        debug!("ite(f = {}, g = {}, h = {})", f, g, h);
        self.state.write().ite_rec(f, g, h)
    }

    pub fn and(&self, f: NodeId, g: NodeId) -> NodeId {
        self.ite(f, g, NodeId::ZERO)
    }

    pub fn or(&self, f: NodeId, g: NodeId) -> NodeId {
        self.ite(f, NodeId::ONE, g)
    }

    pub fn xor(&self, f: NodeId, g: NodeId) -> NodeId {
        let mut state = self.state.write();
        let not_g = state.negate_rec(g);
        state.ite_rec(f, not_g, g)
    }

    pub fn implies(&self, f: NodeId, g: NodeId) -> NodeId {
        self.ite(f, g, NodeId::ONE)
    }

    pub fn negate(&self, f: NodeId) -> NodeId {
        debug!("negate(f = {})", f);
        self.state.write().negate_rec(f)
    }
}
