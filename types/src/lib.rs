//! Common types used throughout minefield.
//!
//! Defines the actor identity, per-game state, governed parameters, observer
//! events, the error taxonomy, and the wire codec shared by the execution
//! engine and clients.

mod actor;
pub mod codec;
pub mod constants;
mod error;
mod event;
mod game;
mod params;

pub use actor::ActorId;
pub use constants::*;
pub use error::Error;
pub use event::Event;
pub use game::{cell_index, in_bounds, CellStatus, Game, GameStatus, GameSummary};
pub use params::GameParameter;
