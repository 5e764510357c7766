//! Commit-reveal binding for provably fair seeds.
//!
//! ## Flow
//!
//! 1. **Commit** - The player publishes `commitment = hash(secret)` when the
//!    wager is placed, before anyone knows the external random value.
//! 2. **Fulfill** - The external source later delivers its random value.
//! 3. **Reveal** - The player discloses the secret on the first move; the
//!    engine checks it against the commitment.
//! 4. **Bind** - The seed is derived from the external value, the secret, and
//!    the principal's identity.
//!
//! Binding the principal into the seed means a third party who learns the
//! external value (and even the secret) ahead of time cannot transplant the
//! game onto another identity: a different principal yields a different
//! board.
//!
//! ## Determinism
//!
//! All three functions are pure. Any party holding the inputs can re-derive
//! the seed and audit every outcome after the game ends.

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use minefield_types::{ActorId, VALUE_LEN};

/// Compute the commitment for a secret.
///
/// Uses SHA256: `commitment = hash(secret)`.
pub fn compute_commitment(secret: &[u8; VALUE_LEN]) -> [u8; VALUE_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(b"commit"); // Domain separator
    hasher.finalize().0
}

/// Verify that a commitment matches a secret.
///
/// Returns `true` if `commitment == hash(secret)`.
pub fn verify_commitment(commitment: &[u8; VALUE_LEN], secret: &[u8; VALUE_LEN]) -> bool {
    compute_commitment(secret) == *commitment
}

/// Derive the game seed from the external random value, the revealed secret,
/// and the owning principal.
///
/// Uses SHA256: `seed = hash(external || secret || principal)`.
pub fn derive_seed(
    external: &[u8; VALUE_LEN],
    secret: &[u8; VALUE_LEN],
    principal: &ActorId,
) -> [u8; VALUE_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(external);
    hasher.update(secret);
    hasher.update(principal.as_ref());
    hasher.update(b"seed"); // Domain separator
    hasher.finalize().0
}
