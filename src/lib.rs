//! Data structures and routines for two-dimensional dominance queries.
//!
//! We maintain a multiset of integer pairs `(A, B)` and want to answer, for a
//! query `(a, b)`, whether some stored pair dominates it (`A >= a` and
//! `B >= b`), and which dominating pair has the least product `A * B`.
//!
//! The building block is `RbTree`, a red-black tree of keys with
//! multiplicities that can find the smallest key at least a given one and
//! knows its greatest key without searching. A `PrimaryTree` is a tree of such
//! trees: pairs grouped by one coordinate, each group ordered by the other. The
//! `DominanceIndex` keeps two primary trees, one grouped by each coordinate,
//! and probes the smaller one to answer queries.

pub mod error;
pub mod rbtree;
pub mod primary;
pub mod index;
pub mod boxes;

pub use boxes::{BoxFactory, BoxSize};
pub use error::{Error, Result};
pub use index::DominanceIndex;
pub use rbtree::{Compare, Natural, RbTree};
