//! Deterministic test doubles for the engine's collaborators.

use std::collections::BTreeMap;

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use minefield_types::{ActorId, Error, VALUE_LEN};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::custody::{FundsCustody, TransferFailure};
use crate::engine::Engine;
use crate::gateway::RandomnessSource;

/// Fee charged by [`MockGateway`].
pub const FEE: u64 = 10;

/// Creates a deterministic actor identity for tests.
pub fn create_actor(seed: u64) -> ActorId {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = [0u8; VALUE_LEN];
    rng.fill_bytes(&mut bytes);
    ActorId::new(bytes)
}

/// Creates a deterministic 32-byte secret for tests.
pub fn create_secret(seed: u64) -> [u8; VALUE_LEN] {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(0x5eed));
    let mut bytes = [0u8; VALUE_LEN];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// The value the mock source would deliver for a request id.
pub fn external_value(request_id: u64) -> [u8; VALUE_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(&request_id.to_be_bytes());
    hasher.update(b"external");
    hasher.finalize().0
}

/// Gateway that accepts paid requests and issues sequential ids.
///
/// Fulfillment stays in the test's hands: call
/// [`Engine::fulfill_randomness`] with [`external_value`] (or anything else)
/// whenever the "asynchronous" boundary should resolve.
pub struct MockGateway {
    fee: u64,
    next_id: u64,
    forced_id: Option<u64>,
    issued: Vec<u64>,
}

impl MockGateway {
    pub fn new(fee: u64) -> Self {
        Self {
            fee,
            next_id: 1,
            forced_id: None,
            issued: Vec::new(),
        }
    }

    /// Make the next request return `id` instead of the sequence, to model a
    /// misbehaving source reissuing an id.
    pub fn force_next_id(&mut self, id: u64) {
        self.forced_id = Some(id);
    }

    /// Ids issued so far, in order.
    pub fn issued(&self) -> &[u64] {
        &self.issued
    }
}

impl RandomnessSource for MockGateway {
    fn fee(&self) -> u64 {
        self.fee
    }

    fn request(&mut self, payment: u64) -> Result<u64, Error> {
        if payment < self.fee {
            return Err(Error::InsufficientPayment {
                supplied: payment,
                fee: self.fee,
            });
        }
        let id = self.forced_id.take().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        self.issued.push(id);
        Ok(id)
    }
}

/// In-memory ledger with a one-shot failure switch.
#[derive(Default)]
pub struct MockCustody {
    balances: BTreeMap<ActorId, u64>,
    fail_next: bool,
}

impl MockCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next transfer fail (and only that one).
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    pub fn balance(&self, actor: &ActorId) -> u64 {
        self.balances.get(actor).copied().unwrap_or(0)
    }
}

impl FundsCustody for MockCustody {
    fn transfer(&mut self, to: &ActorId, amount: u64) -> Result<(), TransferFailure> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TransferFailure);
        }
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

/// Engine wired to the mock collaborators.
pub type MockEngine = Engine<MockGateway, MockCustody>;

/// Creates an engine with the mock gateway ([`FEE`]), an empty ledger, and a
/// fixed governing authority ([`create_authority`]).
pub fn create_engine() -> MockEngine {
    Engine::new(MockGateway::new(FEE), MockCustody::new(), create_authority())
}

/// The governing authority used by [`create_engine`].
pub fn create_authority() -> ActorId {
    create_actor(0xA07)
}
