use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, Write};
use serde::Serialize;

use crate::constants::{
    MINE_PROBABILITY_MAX_BPS, MINE_PROBABILITY_MIN_BPS, REWARD_MULTIPLIER_MAX_BPS,
    REWARD_MULTIPLIER_MIN_BPS,
};

/// The governed economic parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum GameParameter {
    /// Probability that a cell is a mine, in basis points.
    MineProbability = 0,
    /// Pot multiplier applied per safe reveal, in basis points.
    RewardMultiplier = 1,
}

impl GameParameter {
    /// Inclusive governance bounds for this parameter, in basis points.
    pub fn bounds(&self) -> (u64, u64) {
        match self {
            Self::MineProbability => (MINE_PROBABILITY_MIN_BPS, MINE_PROBABILITY_MAX_BPS),
            Self::RewardMultiplier => (REWARD_MULTIPLIER_MIN_BPS, REWARD_MULTIPLIER_MAX_BPS),
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::MineProbability),
            1 => Some(Self::RewardMultiplier),
            _ => None,
        }
    }
}

impl Write for GameParameter {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_u8(*self as u8);
    }
}

impl Read for GameParameter {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < 1 {
            return Err(Error::EndOfBuffer);
        }
        let tag = reader.get_u8();
        Self::from_u8(tag).ok_or(Error::InvalidEnum(tag))
    }
}

impl EncodeSize for GameParameter {
    fn encode_size(&self) -> usize {
        1
    }
}
