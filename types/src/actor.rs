use std::fmt;

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, Write};
use commonware_utils::hex;
use serde::{Serialize, Serializer};

use crate::codec::{read_bytes32, write_bytes32};
use crate::constants::VALUE_LEN;

/// Identity of an actor (principal, delegate, or governing authority).
///
/// The all-zero identity is reserved: it never owns a game and can never be
/// registered as a delegate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId([u8; VALUE_LEN]);

impl ActorId {
    /// The reserved null identity.
    pub const ZERO: Self = Self([0u8; VALUE_LEN]);

    pub const fn new(bytes: [u8; VALUE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; VALUE_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for ActorId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; VALUE_LEN]> for ActorId {
    fn from(bytes: [u8; VALUE_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", hex(&self.0))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex(&self.0))
    }
}

impl Serialize for ActorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex(&self.0))
    }
}

impl Write for ActorId {
    fn write(&self, writer: &mut impl BufMut) {
        write_bytes32(&self.0, writer);
    }
}

impl Read for ActorId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(read_bytes32(reader)?))
    }
}

impl EncodeSize for ActorId {
    fn encode_size(&self) -> usize {
        VALUE_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use commonware_codec::ReadExt;

    #[test]
    fn zero_is_zero() {
        assert!(ActorId::ZERO.is_zero());
        assert!(!ActorId::new([1u8; VALUE_LEN]).is_zero());
    }

    #[test]
    fn codec_roundtrip() {
        let actor = ActorId::new([0x42u8; VALUE_LEN]);
        let mut buf = BytesMut::new();
        actor.write(&mut buf);
        assert_eq!(buf.len(), actor.encode_size());

        let mut reader = buf.as_ref();
        assert_eq!(ActorId::read(&mut reader).expect("read"), actor);
    }

    #[test]
    fn display_is_hex() {
        let mut bytes = [0u8; VALUE_LEN];
        bytes[0] = 0xde;
        bytes[1] = 0xad;
        let rendered = ActorId::new(bytes).to_string();
        assert!(rendered.starts_with("dead"));
        assert_eq!(rendered.len(), VALUE_LEN * 2);
    }
}
