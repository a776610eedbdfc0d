//! Type-safe wrappers for BDD variables and levels.
//!
//! This module provides newtype wrappers that enforce compile-time distinction
//! between variable identifiers and level indices. The two coincide only until
//! the first reordering, after which mixing them up silently corrupts results.
use std::fmt;

/// A variable identifier (0-indexed).
///
/// Variables represent Boolean decision points in a BDD. Unlike levels,
/// variable IDs are stable across reordering operations: a node keeps the
/// identifier of the variable it tests even when that variable moves.
///
/// The identifier equal to the variable count is the terminal sentinel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    pub const fn new(id: u32) -> Self {
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the raw variable ID as a `usize`, for indexing.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

impl From<u32> for Var {
    fn from(id: u32) -> Self {
        Var(id)
    }
}

/// A level in the variable ordering (0-indexed).
///
/// Levels represent the position of a variable in the current ordering.
/// Unlike variable IDs, levels change when variables are reordered.
///
/// # Invariants
///
/// - Level 0 is the topmost level (closest to root)
/// - Levels increase downward toward terminals
/// - Terminals live at the level equal to the variable count
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Level(usize);

impl Level {
    /// Creates a new level with the given index.
    pub const fn new(index: usize) -> Self {
        Level(index)
    }

    /// Returns the raw level index as a `usize`.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the next level down (index + 1).
    pub fn next(self) -> Self {
        Level(self.0 + 1)
    }

    /// Returns the previous level up (index - 1), or None if at level 0.
    pub fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(Level(self.0 - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v0 = Var::new(0);
        let v1 = Var::new(1);
        assert_eq!(v0.id(), 0);
        assert_eq!(v1.index(), 1);
        assert!(v0 < v1);
        assert_eq!(Var::from(7), Var::new(7));
        assert_eq!(v1.to_string(), "x1");
    }

    #[test]
    fn test_level_navigation() {
        let l0 = Level::new(0);
        let l1 = l0.next();
        let _l2 = l1.next();

        assert_eq!(l1.prev(), Some(l0));
        assert_eq!(l0.prev(), None);
        assert!(l0 < l1);
        assert_eq!(l1.to_string(), "L1");
    }
}
