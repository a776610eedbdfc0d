//! Errors reported by manager operations.
//!
//! All failures are deterministic structural errors: the operation is rejected
//! and the manager is left untouched, so the fix is on the caller's side.

use crate::node::NodeId;
use crate::types::Var;

/// Error type for manager operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Swap requested on the last variable of the order.
    LastVariable(Var),
    /// Swap requested on two variables that are not adjacent.
    NotAdjacent { first: Var, second: Var },
    /// A variable the manager does not know.
    UnknownVariable(Var),
    /// A live node already occupies the shape key.
    ConsingConflict { variable: Var, low: NodeId, high: NodeId },
    /// Restrict was asked to force two variables at once.
    ConflictingRestriction { positive: Var, negative: Var },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LastVariable(var) => {
                write!(f, "'{}' is the last variable in the variable order", var)
            }
            Error::NotAdjacent { first, second } => {
                write!(f, "cannot swap variables that are not adjacent: {} and {}", first, second)
            }
            Error::UnknownVariable(var) => write!(f, "unknown variable {}", var),
            Error::ConsingConflict { variable, low, high } => write!(
                f,
                "trying to replace a live node at ({}, low = {}, high = {})",
                variable, low, high
            ),
            Error::ConflictingRestriction { positive, negative } => write!(
                f,
                "only one variable may be restricted at a time (positive {}, negative {})",
                positive, negative
            ),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
