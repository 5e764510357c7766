/// Grid dimension; the board is `GRID_DIM` x `GRID_DIM`.
pub const GRID_DIM: u8 = 10;

/// Total number of cells on the board.
pub const CELL_COUNT: u16 = (GRID_DIM as u16) * (GRID_DIM as u16);

/// Length of secrets, commitments, random values, and seeds in bytes.
pub const VALUE_LEN: usize = 32;

/// Denominator for all basis-point quantities.
pub const BASIS_POINTS: u64 = 10_000;

/// Default probability that a cell is a mine (basis points).
pub const DEFAULT_MINE_PROBABILITY_BPS: u64 = 2_000;

/// Governance bounds for the mine probability (basis points).
pub const MINE_PROBABILITY_MIN_BPS: u64 = 100;
pub const MINE_PROBABILITY_MAX_BPS: u64 = 5_000;

/// Default pot multiplier applied per safe reveal (basis points).
pub const DEFAULT_REWARD_MULTIPLIER_BPS: u64 = 12_000;

/// Governance bounds for the reward multiplier (basis points).
pub const REWARD_MULTIPLIER_MIN_BPS: u64 = 10_000;
pub const REWARD_MULTIPLIER_MAX_BPS: u64 = 20_000;

/// Mandatory delay between proposing and applying a parameter change.
pub const PARAMETER_TIMELOCK_SECS: u64 = 24 * 60 * 60;
