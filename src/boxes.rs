//! Boxes with a square base, matched to requests by the dominance index.
//!
//! A box has a square base of side `side` and a height. It fits a request when
//! both its side and its height are at least those requested, and the best fit
//! is the fitting box of least volume `side * side * height`. Boxes are stored
//! as pairs `(side * side, height)`, so that dominance on the pair is fitting
//! and the pair's volume is the box's volume.

use std::fmt;

use crate::error::{Error, Result};
use crate::index::DominanceIndex;

/// The dimensions of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoxSize {
	pub side: u64,
	pub height: u64,
}

impl BoxSize {
	/// The box's volume.
	pub fn volume(&self) -> u128 {
		u128::from(self.side) * u128::from(self.side) * u128::from(self.height)
	}
}

impl fmt::Display for BoxSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "side={} height={}", self.side, self.height)
	}
}

/// A store of boxes.
#[derive(Debug, Default)]
pub struct BoxFactory {
	index: DominanceIndex,
}

impl BoxFactory {

	/// Creates an empty factory.
	pub fn new() -> BoxFactory {
		BoxFactory { index: DominanceIndex::new() }
	}

	/// Reports the number of boxes held.
	pub fn len(&self) -> usize { self.index.len() }
	/// True when no box is held.
	pub fn is_empty(&self) -> bool { self.index.is_empty() }

	/// Adds a box.
	pub fn insert(&mut self, side: u64, height: u64) -> Result<()> {
		let square = side.checked_mul(side).ok_or(Error::SideTooLarge(side))?;
		self.index.insert(square, height)
	}

	/// Removes a box, reporting whether one of that size was held.
	pub fn remove(&mut self, side: u64, height: u64) -> bool {
		match side.checked_mul(side) {
			Some(square) => self.index.remove(square, height),
			None => false,
		}
	}

	/// True if some held box fits the request.
	pub fn check_box(&self, side: u64, height: u64) -> bool {
		// a side whose square overflows is larger than any side we could hold.
		match side.checked_mul(side) {
			Some(square) => self.index.exists_dominating(square, height),
			None => false,
		}
	}

	/// Finds the smallest held box that fits the request.
	pub fn get_box(&self, side: u64, height: u64) -> Option<BoxSize> {
		let square = side.checked_mul(side)?;
		self.index.min_volume_dominating(square, height)
			.map(|(square, height)| BoxSize { side: square_root(square), height })
	}
}

// the largest `root` with `root * root <= square`.
fn square_root(square: u64) -> u64 {
	let mut root = (square as f64).sqrt() as u64;
	while root.checked_mul(root).map_or(true, |s| s > square) {
		root -= 1;
	}
	while (root + 1).checked_mul(root + 1).map_or(false, |s| s <= square) {
		root += 1;
	}
	root
}
