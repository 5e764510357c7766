use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use crate::codec::{read_bytes32, write_bytes32};
use crate::constants::VALUE_LEN;
use crate::game::in_bounds;
use crate::{ActorId, GameParameter};

/// Notifications emitted for external observers.
///
/// Every state transition the engine applies is mirrored by exactly one or
/// two of these, in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A wager was placed and unpredictability requested.
    GameRequested {
        game_id: u64,
        principal: ActorId,
        wager: u64,
        commitment: [u8; VALUE_LEN],
    },
    /// The external source delivered the random value for a game.
    RandomnessFulfilled { game_id: u64 },
    /// The player secret was revealed and the seed derived.
    SecretRevealed { game_id: u64 },
    /// A cell was revealed; `pot` is the value after applying the outcome.
    CellRevealed {
        game_id: u64,
        x: u8,
        y: u8,
        mine: bool,
        pot: u64,
    },
    /// The game reached a terminal state.
    GameEnded {
        game_id: u64,
        principal: ActorId,
        won: bool,
        payout: u64,
    },
    DelegateRegistered { principal: ActorId, delegate: ActorId },
    DelegateRevoked { principal: ActorId, delegate: ActorId },
    ParameterChangeProposed {
        parameter: GameParameter,
        value: u64,
        effective_at: u64,
    },
    ParameterChangeApplied { parameter: GameParameter, value: u64 },
    ParameterChangeCancelled { parameter: GameParameter },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::GameRequested {
                game_id,
                principal,
                wager,
                commitment,
            } => {
                1u8.write(writer);
                game_id.write(writer);
                principal.write(writer);
                wager.write(writer);
                write_bytes32(commitment, writer);
            }
            Self::RandomnessFulfilled { game_id } => {
                2u8.write(writer);
                game_id.write(writer);
            }
            Self::SecretRevealed { game_id } => {
                3u8.write(writer);
                game_id.write(writer);
            }
            Self::CellRevealed {
                game_id,
                x,
                y,
                mine,
                pot,
            } => {
                4u8.write(writer);
                game_id.write(writer);
                writer.put_u8(*x);
                writer.put_u8(*y);
                mine.write(writer);
                pot.write(writer);
            }
            Self::GameEnded {
                game_id,
                principal,
                won,
                payout,
            } => {
                5u8.write(writer);
                game_id.write(writer);
                principal.write(writer);
                won.write(writer);
                payout.write(writer);
            }
            Self::DelegateRegistered { principal, delegate } => {
                6u8.write(writer);
                principal.write(writer);
                delegate.write(writer);
            }
            Self::DelegateRevoked { principal, delegate } => {
                7u8.write(writer);
                principal.write(writer);
                delegate.write(writer);
            }
            Self::ParameterChangeProposed {
                parameter,
                value,
                effective_at,
            } => {
                8u8.write(writer);
                parameter.write(writer);
                value.write(writer);
                effective_at.write(writer);
            }
            Self::ParameterChangeApplied { parameter, value } => {
                9u8.write(writer);
                parameter.write(writer);
                value.write(writer);
            }
            Self::ParameterChangeCancelled { parameter } => {
                10u8.write(writer);
                parameter.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < 1 {
            return Err(Error::EndOfBuffer);
        }
        let event = match reader.get_u8() {
            1 => Self::GameRequested {
                game_id: u64::read(reader)?,
                principal: ActorId::read(reader)?,
                wager: u64::read(reader)?,
                commitment: read_bytes32(reader)?,
            },
            2 => Self::RandomnessFulfilled {
                game_id: u64::read(reader)?,
            },
            3 => Self::SecretRevealed {
                game_id: u64::read(reader)?,
            },
            4 => {
                let game_id = u64::read(reader)?;
                if reader.remaining() < 2 {
                    return Err(Error::EndOfBuffer);
                }
                let (x, y) = (reader.get_u8(), reader.get_u8());
                if !in_bounds(x, y) {
                    return Err(Error::Invalid("Event", "cell out of bounds"));
                }
                Self::CellRevealed {
                    game_id,
                    x,
                    y,
                    mine: bool::read(reader)?,
                    pot: u64::read(reader)?,
                }
            }
            5 => Self::GameEnded {
                game_id: u64::read(reader)?,
                principal: ActorId::read(reader)?,
                won: bool::read(reader)?,
                payout: u64::read(reader)?,
            },
            6 => Self::DelegateRegistered {
                principal: ActorId::read(reader)?,
                delegate: ActorId::read(reader)?,
            },
            7 => Self::DelegateRevoked {
                principal: ActorId::read(reader)?,
                delegate: ActorId::read(reader)?,
            },
            8 => Self::ParameterChangeProposed {
                parameter: GameParameter::read(reader)?,
                value: u64::read(reader)?,
                effective_at: u64::read(reader)?,
            },
            9 => Self::ParameterChangeApplied {
                parameter: GameParameter::read(reader)?,
                value: u64::read(reader)?,
            },
            10 => Self::ParameterChangeCancelled {
                parameter: GameParameter::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::GameRequested {
                game_id,
                principal,
                wager,
                ..
            } => game_id.encode_size() + principal.encode_size() + wager.encode_size() + VALUE_LEN,
            Self::RandomnessFulfilled { game_id } | Self::SecretRevealed { game_id } => {
                game_id.encode_size()
            }
            Self::CellRevealed {
                game_id, mine, pot, ..
            } => game_id.encode_size() + 2 + mine.encode_size() + pot.encode_size(),
            Self::GameEnded {
                game_id,
                principal,
                won,
                payout,
            } => {
                game_id.encode_size()
                    + principal.encode_size()
                    + won.encode_size()
                    + payout.encode_size()
            }
            Self::DelegateRegistered { principal, delegate }
            | Self::DelegateRevoked { principal, delegate } => {
                principal.encode_size() + delegate.encode_size()
            }
            Self::ParameterChangeProposed {
                parameter,
                value,
                effective_at,
            } => parameter.encode_size() + value.encode_size() + effective_at.encode_size(),
            Self::ParameterChangeApplied { parameter, value } => {
                parameter.encode_size() + value.encode_size()
            }
            Self::ParameterChangeCancelled { parameter } => parameter.encode_size(),
        }
    }
}
