//! A red-black tree holding a multiset of keys.
//!
//! An `RbTree` keeps one node per distinct key, together with the number of
//! times that key has been inserted and not yet removed. Nodes live in a single
//! arena `Vec` and refer to each other by index; slot zero is the nil sentinel
//! that terminates every branch. Removed slots are threaded onto a free list
//! through their `parent` field, so removal never allocates and insertion only
//! grows the arena when no slot is free.
//!
//! Ordering is supplied by a `Compare` implementation rather than demanded of
//! the key type, which lets a tree order composite keys by one of their fields.
//! The node holding the greatest key is cached, and `max` answers in constant
//! time.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// The nil sentinel's slot in the arena.
const NIL: usize = 0;

/// A total order over keys of type `K`.
pub trait Compare<K: ?Sized> {
	/// Compares two keys.
	fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		a.cmp(b)
	}
}

impl<K: ?Sized, F: Fn(&K, &K) -> Ordering> Compare<K> for F {
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		self(a, b)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
	Red,
	Black,
}

#[derive(Debug)]
struct Node<K> {
	// `None` for the sentinel and for free slots.
	key: Option<K>,
	count: usize,
	color: Color,
	parent: usize,
	left: usize,
	right: usize,
}

impl<K> Node<K> {
	fn nil() -> Self {
		Node { key: None, count: 0, color: Color::Black, parent: NIL, left: NIL, right: NIL }
	}
}

/// Identifies a node of an `RbTree`.
///
/// A `NodeId` stays valid until the key it holds is evicted; after that the
/// slot may be reused for another key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The outcome of `RbTree::insert`.
#[derive(Debug, PartialEq, Eq)]
pub enum Inserted<K> {
	/// The key was new and now lives in a freshly linked node.
	Fresh(NodeId),
	/// An equal key was already stored. Its multiplicity was incremented, and
	/// the argument is handed back to the caller.
	Existing(NodeId, K),
}

impl<K> Inserted<K> {
	/// The node holding the key.
	pub fn node(&self) -> NodeId {
		match *self {
			Inserted::Fresh(id) => id,
			Inserted::Existing(id, _) => id,
		}
	}
	/// True if the key was not previously present.
	pub fn is_fresh(&self) -> bool {
		match *self {
			Inserted::Fresh(_) => true,
			Inserted::Existing(..) => false,
		}
	}
}

/// The outcome of removing a key that was present.
#[derive(Debug, PartialEq, Eq)]
pub enum Removed<K> {
	/// The multiplicity dropped but is still positive; the key stays.
	Retained,
	/// The last instance was removed and the stored key is returned.
	Evicted(K),
}

/// A red-black tree of keys with multiplicities, ordered by `C`.
pub struct RbTree<K, C = Natural> {
	// empty until the first insertion, then `nodes[NIL]` is the sentinel.
	nodes: Vec<Node<K>>,
	// head of the free slot chain, linked through `parent`.
	free: usize,
	root: usize,
	max: usize,
	keys: usize,
	tuples: usize,
	cmp: C,
}

impl<K, C: Compare<K> + Default> RbTree<K, C> {
	/// Allocates a new empty tree.
	///
	/// No memory is reserved until the first insertion.
	pub fn new() -> Self {
		Self::with_comparator(C::default())
	}

	/// Allocates a new empty tree with room for `capacity` distinct keys.
	///
	/// Fails with `Error::Allocation` when the room cannot be reserved.
	pub fn with_capacity(capacity: usize) -> Result<Self> {
		let mut tree = Self::new();
		tree.nodes.try_reserve(capacity.saturating_add(1))?;
		Ok(tree)
	}
}

impl<K, C: Compare<K> + Default> Default for RbTree<K, C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, C: Compare<K>> RbTree<K, C> {
	/// Allocates a new empty tree ordered by `cmp`.
	pub fn with_comparator(cmp: C) -> Self {
		RbTree {
			nodes: Vec::new(),
			free: NIL,
			root: NIL,
			max: NIL,
			keys: 0,
			tuples: 0,
			cmp,
		}
	}

	/// Reports the number of distinct keys.
	pub fn keys(&self) -> usize { self.keys }
	/// Reports the number of keys counted with multiplicity.
	pub fn tuples(&self) -> usize { self.tuples }
	/// True when no key is stored.
	pub fn is_empty(&self) -> bool { self.root == NIL }

	/// Returns the key held by `id`.
	pub fn key(&self, id: NodeId) -> &K {
		self.key_at(id.0)
	}

	/// Returns the key held by `id` for modification.
	///
	/// It is a logic error to change the key in a way that changes how it
	/// compares against the other keys in the tree.
	pub fn key_mut(&mut self, id: NodeId) -> &mut K {
		match self.nodes[id.0].key {
			Some(ref mut key) => key,
			None => unreachable!("node {} holds no key", id.0),
		}
	}

	/// Returns the multiplicity of the key held by `id`.
	pub fn count(&self, id: NodeId) -> usize {
		self.nodes[id.0].count
	}

	/// Inserts one instance of `key`.
	///
	/// If an equal key is already stored its multiplicity is incremented and
	/// `key` comes back in `Inserted::Existing`. Otherwise the key moves into a
	/// new node. On error the tree is unchanged.
	pub fn insert(&mut self, key: K) -> Result<Inserted<K>> {

		let tuples = self.tuples.checked_add(1).ok_or(Error::MultiplicityOverflow)?;

		let mut parent = NIL;
		let mut x = self.root;
		let mut went_left = false;
		let mut rightmost = true;
		while x != NIL {
			match self.cmp.compare(&key, self.key_at(x)) {
				Ordering::Less => {
					parent = x;
					x = self.nodes[x].left;
					went_left = true;
					rightmost = false;
				}
				Ordering::Greater => {
					parent = x;
					x = self.nodes[x].right;
					went_left = false;
				}
				Ordering::Equal => {
					let node = &mut self.nodes[x];
					node.count = node.count.checked_add(1).ok_or(Error::MultiplicityOverflow)?;
					self.tuples = tuples;
					return Ok(Inserted::Existing(NodeId(x), key));
				}
			}
		}

		let z = self.allocate(key, parent)?;
		if parent == NIL {
			self.root = z;
		}
		else if went_left {
			self.nodes[parent].left = z;
		}
		else {
			self.nodes[parent].right = z;
		}

		// a new key is the greatest exactly when its search path never turned left.
		if rightmost {
			self.max = z;
		}

		self.keys += 1;
		self.tuples = tuples;
		self.insert_fixup(z);
		Ok(Inserted::Fresh(NodeId(z)))
	}

	/// Removes one instance of `key`.
	///
	/// Returns `None` if no equal key is stored. When the last instance goes
	/// the node is unlinked and the stored key is returned.
	pub fn remove(&mut self, key: &K) -> Option<Removed<K>> {
		let z = self.search(key)?.0;

		assert!(self.nodes[z].count > 0, "linked node {} has zero multiplicity", z);
		self.nodes[z].count -= 1;
		self.tuples -= 1;
		if self.nodes[z].count > 0 {
			return Some(Removed::Retained);
		}

		if z == self.max {
			self.max = self.predecessor_of(z);
		}
		self.delete(z);
		self.keys -= 1;

		let node = &mut self.nodes[z];
		let key = node.key.take();
		node.parent = self.free;
		node.left = NIL;
		node.right = NIL;
		self.free = z;

		match key {
			Some(key) => Some(Removed::Evicted(key)),
			None => unreachable!("linked node {} held no key", z),
		}
	}

	/// Finds the node holding a key equal to `key`.
	pub fn search(&self, key: &K) -> Option<NodeId> {
		let mut x = self.root;
		while x != NIL {
			match self.cmp.compare(key, self.key_at(x)) {
				Ordering::Less => x = self.nodes[x].left,
				Ordering::Greater => x = self.nodes[x].right,
				Ordering::Equal => return Some(NodeId(x)),
			}
		}
		None
	}

	/// Finds the node holding the smallest key greater or equal to `key`.
	pub fn seek(&self, key: &K) -> Option<NodeId> {
		// the last node we turned left at is the best candidate so far.
		let mut best = NIL;
		let mut x = self.root;
		while x != NIL {
			match self.cmp.compare(key, self.key_at(x)) {
				Ordering::Less => {
					best = x;
					x = self.nodes[x].left;
				}
				Ordering::Greater => x = self.nodes[x].right,
				Ordering::Equal => return Some(NodeId(x)),
			}
		}
		self.to_id(best)
	}

	/// The node holding the next greater key, if any.
	pub fn successor(&self, id: NodeId) -> Option<NodeId> {
		self.to_id(self.successor_of(id.0))
	}

	/// The node holding the next smaller key, if any.
	pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
		self.to_id(self.predecessor_of(id.0))
	}

	/// The node holding the smallest key.
	pub fn min(&self) -> Option<NodeId> {
		if self.root == NIL { None } else { Some(NodeId(self.minimum(self.root))) }
	}

	/// The node holding the greatest key.
	#[inline]
	pub fn max(&self) -> Option<NodeId> {
		self.to_id(self.max)
	}

	/// Iterates over keys and their multiplicities in increasing order.
	pub fn iter(&self) -> Iter<'_, K, C> {
		Iter { tree: self, next: self.min().map_or(NIL, |id| id.0) }
	}

	/// Iterates in increasing order starting at `id`.
	pub fn iter_from(&self, id: NodeId) -> Iter<'_, K, C> {
		Iter { tree: self, next: id.0 }
	}

	/// Checks the red-black and bookkeeping invariants of the tree.
	pub fn check_invariants(&self) -> Result<()> {

		if self.root == NIL {
			if self.keys != 0 || self.tuples != 0 {
				return Err(Error::Invariant("empty tree reports stored keys"));
			}
			if self.max != NIL {
				return Err(Error::Invariant("empty tree caches a maximum"));
			}
			return Ok(());
		}

		if self.nodes[self.root].color != Color::Black {
			return Err(Error::Invariant("root is red"));
		}
		if self.nodes[self.root].parent != NIL {
			return Err(Error::Invariant("root has a parent"));
		}
		if self.nodes[NIL].color != Color::Black || self.nodes[NIL].key.is_some() {
			return Err(Error::Invariant("sentinel is not an empty black leaf"));
		}

		let mut keys = 0;
		let mut tuples = 0;
		self.check_subtree(self.root, &mut keys, &mut tuples)?;
		if keys != self.keys {
			return Err(Error::Invariant("distinct key count drifted"));
		}
		if tuples != self.tuples {
			return Err(Error::Invariant("total multiplicity drifted"));
		}

		let mut previous: Option<&K> = None;
		for (key, _) in self.iter() {
			if let Some(previous) = previous {
				if self.cmp.compare(previous, key) != Ordering::Less {
					return Err(Error::Invariant("keys out of order"));
				}
			}
			previous = Some(key);
		}

		if self.max != self.maximum(self.root) {
			return Err(Error::Invariant("cached maximum is stale"));
		}

		Ok(())
	}

	// returns the black height of the subtree rooted at `x`, counting the sentinel.
	fn check_subtree(&self, x: usize, keys: &mut usize, tuples: &mut usize) -> Result<usize> {
		if x == NIL {
			return Ok(1);
		}

		let node = &self.nodes[x];
		if node.key.is_none() {
			return Err(Error::Invariant("linked node holds no key"));
		}
		if node.count == 0 {
			return Err(Error::Invariant("linked node has zero multiplicity"));
		}
		if node.color == Color::Red
			&& (self.nodes[node.left].color == Color::Red || self.nodes[node.right].color == Color::Red) {
			return Err(Error::Invariant("red node has a red child"));
		}
		for &child in &[node.left, node.right] {
			if child != NIL && self.nodes[child].parent != x {
				return Err(Error::Invariant("child does not link back to its parent"));
			}
		}

		*keys += 1;
		*tuples += node.count;

		let left = self.check_subtree(node.left, keys, tuples)?;
		let right = self.check_subtree(node.right, keys, tuples)?;
		if left != right {
			return Err(Error::Invariant("black heights differ"));
		}
		Ok(left + if node.color == Color::Black { 1 } else { 0 })
	}

	fn key_at(&self, x: usize) -> &K {
		match self.nodes[x].key {
			Some(ref key) => key,
			None => unreachable!("node {} holds no key", x),
		}
	}

	fn to_id(&self, x: usize) -> Option<NodeId> {
		if x == NIL { None } else { Some(NodeId(x)) }
	}

	// places `key` in a free or new slot, creating the sentinel on first use.
	fn allocate(&mut self, key: K, parent: usize) -> Result<usize> {
		if self.nodes.is_empty() {
			self.nodes.try_reserve(2)?;
			self.nodes.push(Node::nil());
		}

		let node = Node { key: Some(key), count: 1, color: Color::Red, parent, left: NIL, right: NIL };
		if self.free != NIL {
			let slot = self.free;
			self.free = self.nodes[slot].parent;
			self.nodes[slot] = node;
			Ok(slot)
		}
		else {
			self.nodes.try_reserve(1)?;
			self.nodes.push(node);
			Ok(self.nodes.len() - 1)
		}
	}

	fn minimum(&self, mut x: usize) -> usize {
		while self.nodes[x].left != NIL {
			x = self.nodes[x].left;
		}
		x
	}

	fn maximum(&self, mut x: usize) -> usize {
		while self.nodes[x].right != NIL {
			x = self.nodes[x].right;
		}
		x
	}

	fn successor_of(&self, mut x: usize) -> usize {
		if self.nodes[x].right != NIL {
			return self.minimum(self.nodes[x].right);
		}
		let mut y = self.nodes[x].parent;
		while y != NIL && x == self.nodes[y].right {
			x = y;
			y = self.nodes[y].parent;
		}
		y
	}

	fn predecessor_of(&self, mut x: usize) -> usize {
		if self.nodes[x].left != NIL {
			return self.maximum(self.nodes[x].left);
		}
		let mut y = self.nodes[x].parent;
		while y != NIL && x == self.nodes[y].left {
			x = y;
			y = self.nodes[y].parent;
		}
		y
	}

	fn rotate_left(&mut self, x: usize) {
		let y = self.nodes[x].right;
		let inner = self.nodes[y].left;
		self.nodes[x].right = inner;
		if inner != NIL {
			self.nodes[inner].parent = x;
		}
		let parent = self.nodes[x].parent;
		self.nodes[y].parent = parent;
		if parent == NIL {
			self.root = y;
		}
		else if x == self.nodes[parent].left {
			self.nodes[parent].left = y;
		}
		else {
			self.nodes[parent].right = y;
		}
		self.nodes[y].left = x;
		self.nodes[x].parent = y;
	}

	fn rotate_right(&mut self, x: usize) {
		let y = self.nodes[x].left;
		let inner = self.nodes[y].right;
		self.nodes[x].left = inner;
		if inner != NIL {
			self.nodes[inner].parent = x;
		}
		let parent = self.nodes[x].parent;
		self.nodes[y].parent = parent;
		if parent == NIL {
			self.root = y;
		}
		else if x == self.nodes[parent].right {
			self.nodes[parent].right = y;
		}
		else {
			self.nodes[parent].left = y;
		}
		self.nodes[y].right = x;
		self.nodes[x].parent = y;
	}

	fn insert_fixup(&mut self, mut z: usize) {
		while self.nodes[self.nodes[z].parent].color == Color::Red {
			let parent = self.nodes[z].parent;
			let grand = self.nodes[parent].parent;
			if parent == self.nodes[grand].left {
				let uncle = self.nodes[grand].right;
				if self.nodes[uncle].color == Color::Red {
					self.nodes[parent].color = Color::Black;
					self.nodes[uncle].color = Color::Black;
					self.nodes[grand].color = Color::Red;
					z = grand;
				}
				else {
					if z == self.nodes[parent].right {
						z = parent;
						self.rotate_left(z);
					}
					let parent = self.nodes[z].parent;
					let grand = self.nodes[parent].parent;
					self.nodes[parent].color = Color::Black;
					self.nodes[grand].color = Color::Red;
					self.rotate_right(grand);
				}
			}
			else {
				let uncle = self.nodes[grand].left;
				if self.nodes[uncle].color == Color::Red {
					self.nodes[parent].color = Color::Black;
					self.nodes[uncle].color = Color::Black;
					self.nodes[grand].color = Color::Red;
					z = grand;
				}
				else {
					if z == self.nodes[parent].left {
						z = parent;
						self.rotate_right(z);
					}
					let parent = self.nodes[z].parent;
					let grand = self.nodes[parent].parent;
					self.nodes[parent].color = Color::Black;
					self.nodes[grand].color = Color::Red;
					self.rotate_left(grand);
				}
			}
		}
		let root = self.root;
		self.nodes[root].color = Color::Black;
	}

	// replaces the subtree at `u` with the one at `v`; writes `v.parent` even for the sentinel.
	fn transplant(&mut self, u: usize, v: usize) {
		let parent = self.nodes[u].parent;
		if parent == NIL {
			self.root = v;
		}
		else if u == self.nodes[parent].left {
			self.nodes[parent].left = v;
		}
		else {
			self.nodes[parent].right = v;
		}
		self.nodes[v].parent = parent;
	}

	// unlinks `z` without moving any other key between nodes, so other `NodeId`s stay valid.
	fn delete(&mut self, z: usize) {
		let left = self.nodes[z].left;
		let right = self.nodes[z].right;

		let x;
		let mut removed_color = self.nodes[z].color;
		if left == NIL {
			x = right;
			self.transplant(z, right);
		}
		else if right == NIL {
			x = left;
			self.transplant(z, left);
		}
		else {
			let y = self.minimum(right);
			removed_color = self.nodes[y].color;
			x = self.nodes[y].right;
			if self.nodes[y].parent == z {
				self.nodes[x].parent = y;
			}
			else {
				self.transplant(y, x);
				self.nodes[y].right = right;
				self.nodes[right].parent = y;
			}
			self.transplant(z, y);
			self.nodes[y].left = left;
			self.nodes[left].parent = y;
			self.nodes[y].color = self.nodes[z].color;
		}

		if removed_color == Color::Black {
			self.delete_fixup(x);
		}

		// the sentinel's parent was scratch space for the fix-up.
		self.nodes[NIL].parent = NIL;
	}

	fn delete_fixup(&mut self, mut x: usize) {
		while x != self.root && self.nodes[x].color == Color::Black {
			let parent = self.nodes[x].parent;
			if x == self.nodes[parent].left {
				let mut w = self.nodes[parent].right;
				if self.nodes[w].color == Color::Red {
					self.nodes[w].color = Color::Black;
					self.nodes[parent].color = Color::Red;
					self.rotate_left(parent);
					w = self.nodes[self.nodes[x].parent].right;
				}
				if self.nodes[self.nodes[w].left].color == Color::Black
					&& self.nodes[self.nodes[w].right].color == Color::Black {
					self.nodes[w].color = Color::Red;
					x = self.nodes[x].parent;
				}
				else {
					if self.nodes[self.nodes[w].right].color == Color::Black {
						let inner = self.nodes[w].left;
						self.nodes[inner].color = Color::Black;
						self.nodes[w].color = Color::Red;
						self.rotate_right(w);
						w = self.nodes[self.nodes[x].parent].right;
					}
					let parent = self.nodes[x].parent;
					self.nodes[w].color = self.nodes[parent].color;
					self.nodes[parent].color = Color::Black;
					let outer = self.nodes[w].right;
					self.nodes[outer].color = Color::Black;
					self.rotate_left(parent);
					x = self.root;
				}
			}
			else {
				let mut w = self.nodes[parent].left;
				if self.nodes[w].color == Color::Red {
					self.nodes[w].color = Color::Black;
					self.nodes[parent].color = Color::Red;
					self.rotate_right(parent);
					w = self.nodes[self.nodes[x].parent].left;
				}
				if self.nodes[self.nodes[w].left].color == Color::Black
					&& self.nodes[self.nodes[w].right].color == Color::Black {
					self.nodes[w].color = Color::Red;
					x = self.nodes[x].parent;
				}
				else {
					if self.nodes[self.nodes[w].left].color == Color::Black {
						let inner = self.nodes[w].right;
						self.nodes[inner].color = Color::Black;
						self.nodes[w].color = Color::Red;
						self.rotate_left(w);
						w = self.nodes[self.nodes[x].parent].left;
					}
					let parent = self.nodes[x].parent;
					self.nodes[w].color = self.nodes[parent].color;
					self.nodes[parent].color = Color::Black;
					let outer = self.nodes[w].left;
					self.nodes[outer].color = Color::Black;
					self.rotate_right(parent);
					x = self.root;
				}
			}
		}
		self.nodes[x].color = Color::Black;
	}
}

impl<K: fmt::Debug, C: Compare<K>> fmt::Debug for RbTree<K, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

/// An in-order iterator over `(key, multiplicity)`.
pub struct Iter<'a, K, C> {
	tree: &'a RbTree<K, C>,
	next: usize,
}

impl<'a, K, C: Compare<K>> Iterator for Iter<'a, K, C> {
	type Item = (&'a K, usize);
	fn next(&mut self) -> Option<Self::Item> {
		if self.next == NIL {
			return None;
		}
		let current = self.next;
		self.next = self.tree.successor_of(current);
		Some((self.tree.key_at(current), self.tree.nodes[current].count))
	}
}

impl<'a, K, C: Compare<K>> IntoIterator for &'a RbTree<K, C> {
	type Item = (&'a K, usize);
	type IntoIter = Iter<'a, K, C>;
	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use rand::rngs::StdRng;
	use rand::{Rng, SeedableRng};

	fn keys_of(tree: &RbTree<u32>) -> Vec<(u32, usize)> {
		tree.iter().map(|(k, c)| (*k, c)).collect()
	}

	#[test]
	fn empty_tree_answers_nothing() {
		let tree = RbTree::<u32>::new();
		assert!(tree.is_empty());
		assert_eq!(tree.search(&3), None);
		assert_eq!(tree.seek(&0), None);
		assert_eq!(tree.min(), None);
		assert_eq!(tree.max(), None);
		assert_eq!(tree.iter().count(), 0);
		tree.check_invariants().unwrap();
	}

	#[test]
	fn duplicate_insert_hands_key_back() {
		let mut tree = RbTree::<String>::new();
		let first = tree.insert("two".to_string()).unwrap();
		assert!(first.is_fresh());
		match tree.insert("two".to_string()).unwrap() {
			Inserted::Existing(id, key) => {
				assert_eq!(id, first.node());
				assert_eq!(key, "two");
				assert_eq!(tree.count(id), 2);
			}
			other => panic!("expected an existing key, got {:?}", other),
		}
		assert_eq!(tree.keys(), 1);
		assert_eq!(tree.tuples(), 2);
	}

	#[test]
	fn multiplicity_counts_down_before_eviction() {
		let mut tree = RbTree::<u32>::new();
		for &key in &[2, 1, 3, 1, 3, 3] {
			tree.insert(key).unwrap();
		}
		assert_eq!(keys_of(&tree), vec![(1, 2), (2, 1), (3, 3)]);

		assert_eq!(tree.remove(&1), Some(Removed::Retained));
		assert_eq!(tree.remove(&1), Some(Removed::Evicted(1)));
		assert_eq!(tree.remove(&1), None);
		assert_eq!(tree.remove(&2), Some(Removed::Evicted(2)));
		assert_eq!(tree.remove(&3), Some(Removed::Retained));
		assert_eq!(tree.remove(&3), Some(Removed::Retained));
		assert_eq!(keys_of(&tree), vec![(3, 1)]);
		assert_eq!(tree.remove(&3), Some(Removed::Evicted(3)));
		assert!(tree.is_empty());
		tree.check_invariants().unwrap();
	}

	#[test]
	fn seek_finds_lower_bound() {
		let mut tree = RbTree::<u32>::new();
		for key in (10..100).step_by(10) {
			tree.insert(key).unwrap();
		}
		let found = |x| tree.seek(&x).map(|id| *tree.key(id));
		assert_eq!(found(0), Some(10));
		assert_eq!(found(10), Some(10));
		assert_eq!(found(11), Some(20));
		assert_eq!(found(55), Some(60));
		assert_eq!(found(90), Some(90));
		assert_eq!(found(91), None);
	}

	#[test]
	fn successor_walks_in_order() {
		let mut tree = RbTree::<u32>::new();
		for &key in &[50, 30, 70, 60, 10, 80, 20] {
			tree.insert(key).unwrap();
		}
		let mut walk = Vec::new();
		let mut node = tree.min();
		while let Some(id) = node {
			walk.push(*tree.key(id));
			node = tree.successor(id);
		}
		assert_eq!(walk, vec![10, 20, 30, 50, 60, 70, 80]);

		let from = tree.seek(&55).unwrap();
		assert_eq!(tree.iter_from(from).map(|(k, _)| *k).collect::<Vec<_>>(), vec![60, 70, 80]);

		let last = tree.max().unwrap();
		assert_eq!(*tree.key(last), 80);
		assert_eq!(tree.predecessor(last).map(|id| *tree.key(id)), Some(70));
		assert_eq!(tree.predecessor(tree.min().unwrap()), None);
	}

	#[test]
	fn comparator_orders_keys() {
		let mut tree: RbTree<u32, _> = RbTree::with_comparator(|a: &u32, b: &u32| b.cmp(a));
		for &key in &[1, 5, 3] {
			tree.insert(key).unwrap();
		}
		assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![5, 3, 1]);
		assert_eq!(*tree.key(tree.max().unwrap()), 1);
		// "at least" follows the comparator, so 4 is first reached by 3.
		assert_eq!(tree.seek(&4).map(|id| *tree.key(id)), Some(3));
		tree.check_invariants().unwrap();
	}

	#[test]
	fn max_follows_removals() {
		let mut tree = RbTree::<u32>::new();
		for key in 0..32 {
			tree.insert(key).unwrap();
		}
		for key in (0..32).rev() {
			assert_eq!(tree.max().map(|id| *tree.key(id)), Some(key));
			tree.remove(&key);
			tree.check_invariants().unwrap();
		}
		assert_eq!(tree.max(), None);
	}

	#[test]
	fn free_slots_are_reused() {
		let mut tree = RbTree::<u32>::with_capacity(8).unwrap();
		assert!(tree.nodes.capacity() >= 9);
		for key in 0..8 {
			tree.insert(key).unwrap();
		}
		let slots = tree.nodes.len();
		for key in 0..8 {
			tree.remove(&key);
		}
		for key in 8..16 {
			tree.insert(key).unwrap();
		}
		assert_eq!(tree.nodes.len(), slots);
		tree.check_invariants().unwrap();
	}

	#[test]
	fn unreservable_capacity_is_an_error() {
		assert!(matches!(RbTree::<u32>::with_capacity(usize::MAX), Err(Error::Allocation(_))));
	}

	#[test]
	fn overflowing_insert_leaves_tree_untouched() {
		let mut tree = RbTree::<u32>::new();
		tree.insert(1).unwrap();
		tree.insert(5).unwrap();
		let before: Vec<_> = tree.iter().map(|(k, n)| (*k, n)).collect();

		// a full multiplicity on one key.
		let id = tree.search(&5).unwrap();
		tree.nodes[id.0].count = usize::MAX;
		tree.tuples = 1;
		assert!(matches!(tree.insert(5), Err(Error::MultiplicityOverflow)));
		assert_eq!(tree.count(id), usize::MAX);
		assert_eq!(tree.tuples(), 1);
		tree.nodes[id.0].count = 1;

		// a full tuple count, for fresh and stored keys alike.
		tree.tuples = usize::MAX;
		assert!(matches!(tree.insert(3), Err(Error::MultiplicityOverflow)));
		assert!(matches!(tree.insert(1), Err(Error::MultiplicityOverflow)));
		tree.tuples = 2;

		assert_eq!(tree.iter().map(|(k, n)| (*k, n)).collect::<Vec<_>>(), before);
		assert_eq!(tree.keys(), 2);
		assert_eq!(tree.search(&3), None);
		tree.check_invariants().unwrap();
	}

	#[test]
	fn random_operations_keep_invariants() {
		let mut rng = StdRng::seed_from_u64(0x5eed);
		let mut tree = RbTree::<u32>::new();
		let mut shadow = ::std::collections::BTreeMap::new();

		for _ in 0 .. 4000 {
			let key = rng.gen_range(0..200);
			if rng.gen_bool(0.55) {
				tree.insert(key).unwrap();
				*shadow.entry(key).or_insert(0) += 1;
			}
			else {
				let expected = match shadow.get(&key).cloned() {
					None => None,
					Some(count) if count > 1 => {
						shadow.insert(key, count - 1);
						Some(Removed::Retained)
					}
					Some(_) => {
						shadow.remove(&key);
						Some(Removed::Evicted(key))
					}
				};
				assert_eq!(tree.remove(&key), expected);
			}
			tree.check_invariants().unwrap();
		}

		let expected: Vec<(u32, usize)> = shadow.into_iter().collect();
		assert_eq!(keys_of(&tree), expected);
	}
}
