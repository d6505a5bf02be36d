//! A two-dimensional dominance index over pairs `(a, b)`.
//!
//! The index answers whether some stored pair dominates a query `(a, b)`, that
//! is has `A >= a` and `B >= b`, and which dominating pair has the least volume
//! `A * B`. Pairs form a multiset: inserting a pair twice requires removing it
//! twice.
//!
//! Internally the pairs are held twice, once grouped by `A` and once grouped by
//! `B`. Queries probe whichever copy has fewer groups, which bounds their cost
//! by the smaller of the two. Both copies are only ever changed together, so
//! they always describe the same multiset.

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::primary::{PrimaryTree, TieBreak};

/// Names one of the two coordinates of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dimension {
	/// The first coordinate.
	A,
	/// The second coordinate.
	B,
}

/// A multiset of pairs answering dominance queries.
///
/// Among dominating pairs of equal least volume, `min_volume_dominating`
/// returns the one with the smallest `A`, and then the smallest `B`.
#[derive(Debug, Default)]
pub struct DominanceIndex {
	// pairs `(a, b)` grouped by `a`.
	by_a: PrimaryTree,
	// the same pairs, stored as `(b, a)` and grouped by `b`.
	by_b: PrimaryTree,
}

impl DominanceIndex {

	/// Creates an empty index.
	pub fn new() -> DominanceIndex {
		DominanceIndex { by_a: PrimaryTree::new(), by_b: PrimaryTree::new() }
	}

	/// Reports the number of stored pairs, counted with multiplicity.
	pub fn len(&self) -> usize { self.by_a.pairs() }
	/// True when no pair is stored.
	pub fn is_empty(&self) -> bool { self.by_a.is_empty() }

	/// Reports how many instances of `(a, b)` are stored.
	pub fn count(&self, a: u64, b: u64) -> usize {
		self.by_a.count(a, b)
	}

	/// Inserts one instance of `(a, b)`.
	///
	/// Fails only when memory cannot be allocated, and then the index is left
	/// exactly as it was.
	pub fn insert(&mut self, a: u64, b: u64) -> Result<()> {
		trace!(a, b, "insert");
		self.by_a.insert(a, b)?;
		if let Err(error) = self.by_b.insert(b, a) {
			warn!(a, b, %error, "mirror insert failed, rolling back");
			let undone = self.by_a.remove(a, b);
			assert!(undone, "rollback lost ({}, {})", a, b);
			return Err(error);
		}
		Ok(())
	}

	/// Removes one instance of `(a, b)`, reporting whether it was present.
	pub fn remove(&mut self, a: u64, b: u64) -> bool {
		if !self.by_a.remove(a, b) {
			trace!(a, b, "remove of absent pair");
			return false;
		}
		let mirrored = self.by_b.remove(b, a);
		assert!(mirrored, "({}, {}) was grouped by A but missing when grouped by B", a, b);
		trace!(a, b, "removed");
		true
	}

	/// True if some stored pair `(A, B)` has `A >= a` and `B >= b`.
	pub fn exists_dominating(&self, a: u64, b: u64) -> bool {
		self.exists_dominating_via(self.probe(), a, b)
	}

	/// Finds the stored pair dominating `(a, b)` with the least `A * B`.
	pub fn min_volume_dominating(&self, a: u64, b: u64) -> Option<(u64, u64)> {
		self.min_volume_dominating_via(self.probe(), a, b)
	}

	/// Iterates over `(a, b, multiplicity)` in increasing `(a, b)` order.
	pub fn iter(&self) -> impl Iterator<Item = (u64, u64, usize)> + '_ {
		self.by_a.iter()
	}

	/// Checks that both copies are well formed and hold the same pairs.
	pub fn check_invariants(&self) -> Result<()> {
		self.by_a.check_invariants()?;
		self.by_b.check_invariants()?;
		if self.by_a.pairs() != self.by_b.pairs() {
			return Err(Error::Invariant("mirrored trees hold different pair counts"));
		}
		let mut mirrored: Vec<(u64, u64, usize)> = self.by_b.iter().map(|(b, a, n)| (a, b, n)).collect();
		mirrored.sort();
		if !self.by_a.iter().eq(mirrored) {
			return Err(Error::Invariant("mirrored trees hold different pairs"));
		}
		Ok(())
	}

	// the copy with fewer groups; grouping by `A` wins ties.
	fn probe(&self) -> Dimension {
		if self.by_a.groups() <= self.by_b.groups() { Dimension::A } else { Dimension::B }
	}

	pub(crate) fn exists_dominating_via(&self, probe: Dimension, a: u64, b: u64) -> bool {
		match probe {
			Dimension::A => self.by_a.exists_dominating(a, b),
			Dimension::B => self.by_b.exists_dominating(b, a),
		}
	}

	pub(crate) fn min_volume_dominating_via(&self, probe: Dimension, a: u64, b: u64) -> Option<(u64, u64)> {
		match probe {
			Dimension::A => self.by_a.min_volume_dominating(a, b, TieBreak::Primary),
			Dimension::B => self.by_b.min_volume_dominating(b, a, TieBreak::Secondary).map(|(b, a)| (a, b)),
		}
	}
}
