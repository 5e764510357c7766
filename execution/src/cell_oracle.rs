//! Deterministic mapping from a game seed to safe/unsafe cells.
//!
//! Each cell's verdict is an independent draw: hash the seed with the
//! coordinates, reduce the digest modulo 10,000, and compare against the mine
//! probability. The threshold is passed in by the caller and read **at
//! evaluation time**, so a governance change applies to cells of in-flight
//! games that have not been revealed yet. Completed reveals are recorded on
//! the game record and are never re-derived.

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use commonware_utils::modulo;
use minefield_types::{constants::BASIS_POINTS, VALUE_LEN};

/// The cell's roll in `[0, 10_000)`, derived from the seed and coordinates.
///
/// The digest is interpreted as a big-endian unsigned integer for the
/// reduction.
pub fn cell_roll(seed: &[u8; VALUE_LEN], x: u8, y: u8) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(&[x, y]);
    hasher.update(b"cell"); // Domain separator
    modulo(&hasher.finalize().0, BASIS_POINTS)
}

/// Whether the cell at `(x, y)` is a mine under the given threshold.
///
/// Pure in its arguments: identical inputs always produce the identical
/// verdict. Coordinates must already be validated against the grid.
pub fn is_unsafe(seed: &[u8; VALUE_LEN], x: u8, y: u8, mine_probability_bps: u64) -> bool {
    cell_roll(seed, x, y) < mine_probability_bps
}
