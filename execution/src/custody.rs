//! Collaborator contract for the funds-custody layer.

use minefield_types::ActorId;

/// Marker for a failed outbound transfer. The engine maps it to
/// [`minefield_types::Error::TransferFailed`] and aborts the triggering
/// operation with no state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferFailure;

/// Outbound payments to actors.
///
/// The engine makes at most one transfer call per operation (on cash-out),
/// always targeting the game's principal. A failure must leave the custody
/// layer unchanged as well, so the whole operation is all-or-nothing and the
/// caller may retry.
pub trait FundsCustody {
    fn transfer(&mut self, to: &ActorId, amount: u64) -> Result<(), TransferFailure>;
}
