//! Error types for the dominance index.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by tree and index mutations.
///
/// Absent keys and pairs are not errors: lookups report them through `Option`
/// and `bool`. A mutation that returns an error has left every tree untouched.
#[derive(Error, Debug)]
pub enum Error {
	/// Growing a node arena failed.
	#[error("allocation failed: {0}")]
	Allocation(#[from] TryReserveError),

	/// A key was inserted more often than a multiplicity can count.
	#[error("multiplicity overflow")]
	MultiplicityOverflow,

	/// A box side whose square does not fit in a `u64`.
	#[error("box side {0} is too large")]
	SideTooLarge(u64),

	/// Reported by `check_invariants` only.
	#[error("invariant violated: {0}")]
	Invariant(&'static str),
}
