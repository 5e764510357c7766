//! Minefield execution engine.
//!
//! This crate contains the deterministic game logic: the commit-reveal
//! binder, the cell oracle, the game state machine, delegated-session
//! authorization, and timelocked parameter governance. The hosting
//! environment executes each operation as a single serialized unit; nothing
//! here spawns, blocks, or reads a clock.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside the engine; governance operations
//!   take `now` from the caller.
//! - Do not use ambient randomness; the only randomness enters through
//!   [`Engine::fulfill_randomness`] and the player's committed secret.
//! - Registries are ordered maps so iteration order never influences
//!   outputs.
//!
//! ## Atomicity
//! Every operation validates all preconditions before mutating anything, and
//! the one external side effect (the cash-out transfer) runs before the game
//! record is written. An error therefore always means "nothing happened".
//!
//! The primary entrypoint is [`Engine`].

pub mod cell_oracle;
pub mod commit_reveal;

mod custody;
mod engine;
mod gateway;
mod governor;
mod session;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


pub use cell_oracle::{cell_roll, is_unsafe};
pub use commit_reveal::{compute_commitment, derive_seed, verify_commitment};
pub use custody::{FundsCustody, TransferFailure};
pub use engine::Engine;
pub use gateway::RandomnessSource;
pub use governor::{ParameterGovernor, PendingChange};
pub use session::SessionAuthority;
