use std::fmt::{Display, Formatter};

use crate::types::Var;

/// Handle to a node owned by a [`Manager`][crate::manager::Manager].
///
/// Identifiers are assigned monotonically and never reused, so a handle to a
/// collected node can never alias a newer one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The constant-false terminal.
    pub const ZERO: NodeId = NodeId(0);
    /// The constant-true terminal.
    pub const ONE: NodeId = NodeId(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the internal representation of the handle.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Return the arena slot of the handle.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_terminal(self) -> bool {
        self.0 <= 1
    }
}

impl From<bool> for NodeId {
    fn from(value: bool) -> Self {
        if value {
            NodeId::ONE
        } else {
            NodeId::ZERO
        }
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Snapshot of a node.
///
/// Terminals carry a `value` and are their own children; internal nodes have
/// `value == None`. For terminals `variable` is the sentinel equal to the
/// manager's variable count.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub variable: Var,
    pub value: Option<bool>,
    pub low: NodeId,
    pub high: NodeId,
    pub ref_count: u32,
}

impl Node {
    pub(crate) fn terminal(value: bool, sentinel: Var) -> Self {
        let id = NodeId::from(value);
        Self {
            id,
            variable: sentinel,
            value: Some(value),
            low: id,
            high: id,
            ref_count: 0,
        }
    }

    pub(crate) fn internal(id: NodeId, variable: Var, low: NodeId, high: NodeId) -> Self {
        Self {
            id,
            variable,
            value: None,
            low,
            high,
            ref_count: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.value == Some(false)
    }

    pub fn is_one(&self) -> bool {
        self.value == Some(true)
    }

    /// The `(low, high)` shape key under which the node is hash-consed.
    pub fn key(&self) -> (NodeId, NodeId) {
        (self.low, self.high)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(value) => write!(f, "{}:{}", self.id, value as u8),
            None => write!(
                f,
                "{}:({}, low = {}, high = {}, rc = {})",
                self.id, self.variable, self.low, self.high, self.ref_count
            ),
        }
    }
}
