//! A tree of groups, each group a tree of its own.
//!
//! A `PrimaryTree` stores pairs `(p, q)` grouped by their primary value `p`.
//! Each `Group` owns an `RbTree` of the co-dimension values `q` that occur with
//! its `p`, counted with multiplicity. Groups are ordered by `p` alone, so the
//! outer tree can be searched with a bare probe group whose secondary tree is
//! empty (and therefore unallocated).
//!
//! The queries here work in `(p, q)` space. The dominance index owns two of
//! these trees with the dimensions swapped, and translates back.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Error, Result};
use crate::rbtree::{Compare, Inserted, NodeId, RbTree, Removed};

/// The co-dimension values stored with one primary value.
#[derive(Debug)]
pub struct Group {
	value: u64,
	secondary: RbTree<u64>,
}

impl Group {
	fn new(value: u64) -> Group {
		Group { value, secondary: RbTree::new() }
	}

	// a live group is never empty, so `None` only shows up for probes.
	fn secondary_max(&self) -> Option<u64> {
		self.secondary.max().map(|id| *self.secondary.key(id))
	}

	// the smallest co-dimension value at least `q`.
	fn lowest_reaching(&self, q: u64) -> Option<u64> {
		match self.secondary_max() {
			Some(max) if max >= q => self.secondary.seek(&q).map(|id| *self.secondary.key(id)),
			_ => None,
		}
	}
}

/// Orders groups by their primary value.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByValue;

impl Compare<Group> for ByValue {
	#[inline]
	fn compare(&self, a: &Group, b: &Group) -> Ordering {
		a.value.cmp(&b.value)
	}
}

/// Which coordinate settles a tie between pairs of equal volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TieBreak {
	/// The smaller primary value wins, then the smaller co-dimension value.
	Primary,
	/// The smaller co-dimension value wins, then the smaller primary value.
	Secondary,
}

impl TieBreak {
	fn rank(self, (p, q): (u64, u64)) -> (u128, u64, u64) {
		let volume = u128::from(p) * u128::from(q);
		match self {
			TieBreak::Primary => (volume, p, q),
			TieBreak::Secondary => (volume, q, p),
		}
	}
}

/// Pairs `(p, q)` indexed first by `p`, then by `q`.
#[derive(Debug, Default)]
pub struct PrimaryTree {
	groups: RbTree<Group, ByValue>,
	pairs: usize,
	// makes the next insert fail as if memory ran out.
	#[cfg(test)]
	fail_next: bool,
}

impl PrimaryTree {

	/// Allocates a new empty tree.
	pub fn new() -> PrimaryTree {
		PrimaryTree {
			groups: RbTree::new(),
			pairs: 0,
			#[cfg(test)]
			fail_next: false,
		}
	}

	#[cfg(test)]
	pub(crate) fn fail_next_insert(&mut self) {
		self.fail_next = true;
	}

	/// Reports the number of distinct primary values.
	pub fn groups(&self) -> usize { self.groups.keys() }
	/// Reports the number of stored pairs, counted with multiplicity.
	pub fn pairs(&self) -> usize { self.pairs }
	/// True when no pair is stored.
	pub fn is_empty(&self) -> bool { self.groups.is_empty() }

	/// Inserts one instance of `(p, q)`.
	///
	/// On error the tree is unchanged.
	pub fn insert(&mut self, p: u64, q: u64) -> Result<()> {
		let pairs = self.pairs.checked_add(1).ok_or(Error::MultiplicityOverflow)?;

		#[cfg(test)]
		{
			if std::mem::take(&mut self.fail_next) {
				return Err(Error::MultiplicityOverflow);
			}
		}

		match self.groups.search(&Group::new(p)) {
			Some(id) => {
				self.groups.key_mut(id).secondary.insert(q)?;
			}
			None => {
				// fill the group before linking it, so a failure leaves nothing behind.
				let mut group = Group::new(p);
				group.secondary.insert(q)?;
				match self.groups.insert(group)? {
					Inserted::Fresh(_) => debug!(value = p, "created group"),
					Inserted::Existing(..) => unreachable!("group {} appeared during insertion", p),
				}
			}
		}

		self.pairs = pairs;
		Ok(())
	}

	/// Removes one instance of `(p, q)`, reporting whether it was present.
	///
	/// A group is dropped together with its last pair.
	pub fn remove(&mut self, p: u64, q: u64) -> bool {
		let probe = Group::new(p);
		let id = match self.groups.search(&probe) {
			Some(id) => id,
			None => return false,
		};

		let emptied = {
			let group = self.groups.key_mut(id);
			match group.secondary.remove(&q) {
				None => return false,
				Some(_) => group.secondary.is_empty(),
			}
		};

		if emptied {
			match self.groups.remove(&probe) {
				Some(Removed::Evicted(_)) => debug!(value = p, "dropped group"),
				_ => unreachable!("group {} is stored exactly once", p),
			}
		}

		self.pairs -= 1;
		true
	}

	/// Reports the multiplicity of `(p, q)`.
	pub fn count(&self, p: u64, q: u64) -> usize {
		self.groups.search(&Group::new(p))
			.and_then(|id| {
				let secondary = &self.groups.key(id).secondary;
				secondary.search(&q).map(|node| secondary.count(node))
			})
			.unwrap_or(0)
	}

	/// True if some stored pair has primary value at least `p` and co-dimension
	/// value at least `q`.
	pub fn exists_dominating(&self, p: u64, q: u64) -> bool {
		match self.reaching(self.groups.seek(&Group::new(p)), q) {
			Some(id) => self.groups.key(id).lowest_reaching(q).is_some(),
			None => false,
		}
	}

	/// Finds the dominating pair of least volume `p * q`.
	///
	/// Among pairs of equal least volume, `tie` decides which coordinate is
	/// compared next. The scan stops at the first group whose primary value
	/// times `q` already exceeds the best volume found.
	pub fn min_volume_dominating(&self, p: u64, q: u64, tie: TieBreak) -> Option<(u64, u64)> {

		let first = self.reaching(self.groups.seek(&Group::new(p)), q)?;
		let group = self.groups.key(first);
		let mut best = (group.value, group.lowest_reaching(q)?);
		let mut best_rank = tie.rank(best);

		let mut next = self.groups.successor(first);
		while let Some(id) = next {
			let group = self.groups.key(id);

			// no pair in this or a later group can cost less than this.
			let floor = u128::from(group.value) * u128::from(q);
			if floor > best_rank.0 || (floor == best_rank.0 && tie == TieBreak::Primary) {
				break;
			}

			if let Some(lowest) = group.lowest_reaching(q) {
				let rank = tie.rank((group.value, lowest));
				if rank < best_rank {
					best = (group.value, lowest);
					best_rank = rank;
				}
			}

			next = self.groups.successor(id);
		}

		Some(best)
	}

	/// Iterates over `(p, q, multiplicity)` in increasing `(p, q)` order.
	pub fn iter(&self) -> impl Iterator<Item = (u64, u64, usize)> + '_ {
		self.groups.iter().flat_map(|(group, _)| {
			group.secondary.iter().map(move |(q, count)| (group.value, *q, count))
		})
	}

	/// Checks both levels of the tree.
	pub fn check_invariants(&self) -> Result<()> {
		self.groups.check_invariants()?;
		let mut pairs = 0;
		for (group, count) in &self.groups {
			if count != 1 {
				return Err(Error::Invariant("group stored more than once"));
			}
			if group.secondary.is_empty() {
				return Err(Error::Invariant("empty group left in the tree"));
			}
			group.secondary.check_invariants()?;
			pairs += group.secondary.tuples();
		}
		if pairs != self.pairs {
			return Err(Error::Invariant("pair count drifted"));
		}
		Ok(())
	}

	// the first group from `start` on whose largest co-dimension value reaches `q`.
	fn reaching(&self, start: Option<NodeId>, q: u64) -> Option<NodeId> {
		let mut node = start;
		while let Some(id) = node {
			if self.groups.key(id).secondary_max().map_or(false, |max| max >= q) {
				return Some(id);
			}
			node = self.groups.successor(id);
		}
		None
	}
}
