use thiserror::Error as ThisError;

use crate::GameParameter;

/// Failure kinds for engine operations.
///
/// Every precondition violation aborts the whole operation with no partial
/// effect, so a caller observing an error can assume nothing happened. Kinds
/// are comparable so callers can decide whether a retry makes sense (e.g.
/// [`Error::RandomnessNotReady`]) or never will (e.g. [`Error::CommitMismatch`]).
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
pub enum Error {
    #[error("payment {supplied} does not cover the randomness fee {fee}")]
    InsufficientPayment { supplied: u64, fee: u64 },
    #[error("net wager is zero after the randomness fee")]
    ZeroWager,
    #[error("game id {0} already exists")]
    DuplicateId(u64),
    #[error("game {0} not found")]
    GameNotFound(u64),
    #[error("game {0} is already finished")]
    GameFinished(u64),
    #[error("randomness for game {0} has not been fulfilled")]
    RandomnessNotReady(u64),
    #[error("revealed secret does not match the commitment")]
    CommitMismatch,
    #[error("secret for game {0} was already revealed")]
    AlreadyRevealed(u64),
    #[error("seed for game {0} is not derived yet")]
    SeedNotReady(u64),
    #[error("coordinate ({x},{y}) is outside the grid")]
    InvalidCoordinate { x: u8, y: u8 },
    #[error("cell ({x},{y}) was already revealed")]
    CellAlreadyRevealed { x: u8, y: u8 },
    #[error("game {0} is already lost")]
    AlreadyLost(u64),
    #[error("caller is not authorized for this game")]
    Unauthorized,
    #[error("delegate is not registered to the caller")]
    NotYourDelegate,
    #[error("an actor cannot delegate to itself")]
    SelfDelegation,
    #[error("the zero actor cannot be a delegate")]
    ZeroDelegate,
    #[error("payout transfer of {amount} failed")]
    TransferFailed { amount: u64 },
    #[error("no pending change for {0:?}")]
    NoPendingChange(GameParameter),
    #[error("timelock for {parameter:?} elapses at {effective_at}, now {now}")]
    TimelockNotElapsed {
        parameter: GameParameter,
        effective_at: u64,
        now: u64,
    },
    #[error("value {value} for {parameter:?} is outside [{min}, {max}]")]
    OutOfRange {
        parameter: GameParameter,
        value: u64,
        min: u64,
        max: u64,
    },
}
