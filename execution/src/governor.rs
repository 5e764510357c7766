//! Timelocked two-phase changes to the economic constants.
//!
//! A change is proposed, waits out a fixed delay, and is then applied in
//! full; a parameter is always either at its old value or completely
//! switched. All three verbs are restricted to the governing authority fixed
//! at construction.

use minefield_types::{
    constants::{DEFAULT_MINE_PROBABILITY_BPS, DEFAULT_REWARD_MULTIPLIER_BPS, PARAMETER_TIMELOCK_SECS},
    ActorId, Error, GameParameter,
};

/// A scheduled change to one parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingChange {
    pub value: u64,
    /// Earliest timestamp at which the change may be executed.
    pub effective_at: u64,
}

#[derive(Clone, Debug)]
pub struct ParameterGovernor {
    authority: ActorId,
    mine_probability_bps: u64,
    reward_multiplier_bps: u64,
    pending_mine_probability: Option<PendingChange>,
    pending_reward_multiplier: Option<PendingChange>,
}

impl ParameterGovernor {
    pub fn new(authority: ActorId) -> Self {
        Self {
            authority,
            mine_probability_bps: DEFAULT_MINE_PROBABILITY_BPS,
            reward_multiplier_bps: DEFAULT_REWARD_MULTIPLIER_BPS,
            pending_mine_probability: None,
            pending_reward_multiplier: None,
        }
    }

    pub fn authority(&self) -> &ActorId {
        &self.authority
    }

    /// Probability that a cell is a mine, in basis points, as currently in
    /// effect.
    pub fn mine_probability_bps(&self) -> u64 {
        self.mine_probability_bps
    }

    /// Pot multiplier per safe reveal, in basis points, as currently in
    /// effect.
    pub fn reward_multiplier_bps(&self) -> u64 {
        self.reward_multiplier_bps
    }

    pub fn current(&self, parameter: GameParameter) -> u64 {
        match parameter {
            GameParameter::MineProbability => self.mine_probability_bps,
            GameParameter::RewardMultiplier => self.reward_multiplier_bps,
        }
    }

    pub fn pending(&self, parameter: GameParameter) -> Option<PendingChange> {
        *self.slot(parameter)
    }

    fn slot(&self, parameter: GameParameter) -> &Option<PendingChange> {
        match parameter {
            GameParameter::MineProbability => &self.pending_mine_probability,
            GameParameter::RewardMultiplier => &self.pending_reward_multiplier,
        }
    }

    fn slot_mut(&mut self, parameter: GameParameter) -> &mut Option<PendingChange> {
        match parameter {
            GameParameter::MineProbability => &mut self.pending_mine_probability,
            GameParameter::RewardMultiplier => &mut self.pending_reward_multiplier,
        }
    }

    fn check_authority(&self, caller: &ActorId) -> Result<(), Error> {
        if *caller != self.authority {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    /// Schedule a change; it becomes executable after the timelock delay.
    /// Overwrites any change already pending for the same parameter.
    pub fn propose(
        &mut self,
        caller: ActorId,
        parameter: GameParameter,
        value: u64,
        now: u64,
    ) -> Result<PendingChange, Error> {
        self.check_authority(&caller)?;
        let (min, max) = parameter.bounds();
        if value < min || value > max {
            return Err(Error::OutOfRange {
                parameter,
                value,
                min,
                max,
            });
        }

        let change = PendingChange {
            value,
            effective_at: now + PARAMETER_TIMELOCK_SECS,
        };
        *self.slot_mut(parameter) = Some(change);
        Ok(change)
    }

    /// Apply a pending change whose timelock has elapsed; clears the slot.
    pub fn execute(
        &mut self,
        caller: ActorId,
        parameter: GameParameter,
        now: u64,
    ) -> Result<u64, Error> {
        self.check_authority(&caller)?;
        let change = self
            .pending(parameter)
            .ok_or(Error::NoPendingChange(parameter))?;
        if now < change.effective_at {
            return Err(Error::TimelockNotElapsed {
                parameter,
                effective_at: change.effective_at,
                now,
            });
        }

        match parameter {
            GameParameter::MineProbability => self.mine_probability_bps = change.value,
            GameParameter::RewardMultiplier => self.reward_multiplier_bps = change.value,
        }
        *self.slot_mut(parameter) = None;
        Ok(change.value)
    }

    /// Drop any pending change for the parameter, elapsed or not.
    pub fn cancel(&mut self, caller: ActorId, parameter: GameParameter) -> Result<(), Error> {
        self.check_authority(&caller)?;
        *self.slot_mut(parameter) = None;
        Ok(())
    }
}
