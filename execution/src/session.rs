//! Delegate registry and the authorization predicate.
//!
//! A principal may install a secondary key that plays on its behalf (reveals,
//! cash-outs) without ever becoming a payout target. Each delegate maps to
//! exactly one principal; installing again overwrites, and only the principal
//! recorded in the mapping can revoke it.

use std::collections::BTreeMap;

use minefield_types::{ActorId, Error};

#[derive(Clone, Debug, Default)]
pub struct SessionAuthority {
    delegates: BTreeMap<ActorId, ActorId>,
}

impl SessionAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or overwrite) `delegate` as acting for `caller`.
    pub fn register(&mut self, caller: ActorId, delegate: ActorId) -> Result<(), Error> {
        if delegate.is_zero() {
            return Err(Error::ZeroDelegate);
        }
        if delegate == caller {
            return Err(Error::SelfDelegation);
        }
        self.delegates.insert(delegate, caller);
        Ok(())
    }

    /// Remove `delegate`. The stored principal must equal `caller`; key
    /// presence alone is not enough.
    pub fn revoke(&mut self, caller: ActorId, delegate: ActorId) -> Result<(), Error> {
        match self.delegates.get(&delegate) {
            Some(principal) if *principal == caller => {
                self.delegates.remove(&delegate);
                Ok(())
            }
            _ => Err(Error::NotYourDelegate),
        }
    }

    /// True iff `caller` is `principal` itself or a delegate registered to it.
    pub fn authorized(&self, principal: &ActorId, caller: &ActorId) -> bool {
        caller == principal || self.delegates.get(caller) == Some(principal)
    }

    /// The principal `delegate` acts for, if any.
    pub fn principal_of(&self, delegate: &ActorId) -> Option<&ActorId> {
        self.delegates.get(delegate)
    }
}
