//! Collaborator contract for the external unpredictability source.

use minefield_types::Error;

/// An external source of unpredictable values, consumed for a fee.
///
/// `request` is the synchronous half of a two-phase protocol: it accepts
/// payment and returns the request id that will key the game. The value
/// itself arrives later, out of band, when the hosting environment invokes
/// [`crate::Engine::fulfill_randomness`] with the same id. The delay between
/// the two phases is arbitrary and nothing that depends on the value may be
/// treated as ready before it lands.
pub trait RandomnessSource {
    /// Current fee for one request.
    fn fee(&self) -> u64;

    /// Submit a paid request. Fails with [`Error::InsufficientPayment`] if
    /// `payment` does not cover the current fee; otherwise returns a fresh
    /// request id.
    fn request(&mut self, payment: u64) -> Result<u64, Error>;
}
