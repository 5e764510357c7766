use bytes::{Buf, BufMut};
use commonware_codec::Error;

use crate::constants::VALUE_LEN;

/// Helper to write a fixed 32-byte value.
pub fn write_bytes32(value: &[u8; VALUE_LEN], writer: &mut impl BufMut) {
    writer.put_slice(value);
}

/// Helper to read a fixed 32-byte value.
pub fn read_bytes32(reader: &mut impl Buf) -> Result<[u8; VALUE_LEN], Error> {
    if reader.remaining() < VALUE_LEN {
        return Err(Error::EndOfBuffer);
    }
    let mut value = [0u8; VALUE_LEN];
    reader.copy_to_slice(&mut value);
    Ok(value)
}

/// Helper to write an optional 32-byte value as a presence flag plus bytes.
pub fn write_opt_bytes32(value: &Option<[u8; VALUE_LEN]>, writer: &mut impl BufMut) {
    match value {
        Some(value) => {
            writer.put_u8(1);
            write_bytes32(value, writer);
        }
        None => writer.put_u8(0),
    }
}

/// Helper to read an optional 32-byte value.
pub fn read_opt_bytes32(reader: &mut impl Buf) -> Result<Option<[u8; VALUE_LEN]>, Error> {
    if reader.remaining() < 1 {
        return Err(Error::EndOfBuffer);
    }
    match reader.get_u8() {
        0 => Ok(None),
        1 => Ok(Some(read_bytes32(reader)?)),
        flag => Err(Error::InvalidEnum(flag)),
    }
}

/// Helper to get the encode size of an optional 32-byte value.
pub fn opt_bytes32_encode_size(value: &Option<[u8; VALUE_LEN]>) -> usize {
    1 + if value.is_some() { VALUE_LEN } else { 0 }
}
