//! # robdd: Reduced Ordered Binary Decision Diagrams
//!
//! **`robdd`** is a manager-centric engine for Reduced Ordered Binary Decision
//! Diagrams with hash-consing, reference-counted garbage collection and dynamic
//! variable reordering.
//!
//! ## What is a ROBDD?
//!
//! A Binary Decision Diagram represents a boolean function as a directed
//! acyclic graph whose internal nodes test one variable each. Under a fixed
//! variable order, and with redundant tests removed and isomorphic subgraphs
//! shared, the diagram is **canonical**: every function has exactly one
//! representation, so equivalence checking is a handle comparison.
//!
//! ## Key Features
//!
//! - **Manager-centric**: all nodes belong to a [`Manager`][crate::manager::Manager]
//!   and are addressed through stable [`NodeId`][crate::node::NodeId] handles that are never reused.
//! - **Hash-consing**: a per-variable [unique table][crate::unique] guarantees that one
//!   `(variable, low, high)` shape maps to one live node.
//! - **ITE synthesis** with a [computed table][crate::cache], plus `and`, `or`, `xor`, `implies`, `negate`.
//! - **Reordering**: in-place adjacent swaps and Rudell's sifting ([`reorder`]).
//! - **Bulk canonicalization** of node-by-node built graphs ([`Manager::reduce`][crate::manager::Manager::reduce]).
//! - **Thread safety**: the manager is `Send + Sync`, guarded by a single read-write lock.
//!
//! ## Basic Usage
//!
//! ```rust
//! use robdd::manager::Manager;
//! use robdd::types::Var;
//!
//! let m = Manager::new(3);
//! let x = m.create(Var::new(0), true, false);
//! let y = m.create(Var::new(1), true, false);
//! let z = m.create(Var::new(2), true, false);
//!
//! // f = (x ∧ y) ∨ ¬z
//! let f = m.or(m.and(x, y), m.negate(z));
//! assert!(m.evaluate(f, &[true, true, true]));
//! assert!(!m.evaluate(f, &[true, false, true]));
//! assert_eq!(m.sat_count(f), num_bigint::BigUint::from(5u32));
//!
//! // Hold `f` across reordering and collection.
//! let f = m.reference(f);
//! let f = m.sifting(f).unwrap();
//! m.collect_garbage();
//! assert!(m.is_alive(f));
//! ```
//!
//! ## Core Components
//!
//! - **[`manager`]**: the [`Manager`][crate::manager::Manager], node creation, accessors and collection.
//! - **[`ite`]**: cofactoring and if-then-else synthesis.
//! - **[`reduce`]**: Bryant's reduction of raw graphs.
//! - **[`reorder`]**: adjacent swaps and sifting.
//! - **[`sat`]** and **[`eval`]**: model counting and evaluation.

pub mod cache;
pub mod config;
pub mod error;
pub mod eval;
pub mod ite;
pub mod manager;
pub mod node;
pub mod reduce;
pub mod reorder;
pub mod sat;
pub mod types;
pub mod unique;
