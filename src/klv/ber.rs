//! BER length octets.
//!
//! Lengths below [`SHORT_FORM_MAX`] are a single byte. Larger lengths use
//! the long form: one byte carrying [`LONG_FORM_MASK`] plus the count of
//! value bytes, followed by the value in network byte order.

use bytes::BufMut;

use crate::error::{ProtocolError, Result};

/// Largest encoding of a 64-bit length: long-form marker plus eight bytes
pub const MAX_BYTES: usize = 9;
/// Values below this use the single-byte short form
pub const SHORT_FORM_MAX: u64 = 0x80;
/// High bit of the first byte; the low bits carry the value byte count
pub const LONG_FORM_MASK: u8 = 0x80;

fn value_width(x: u64) -> usize {
    (64 - x.leading_zeros() as usize).div_ceil(8)
}

/// Number of bytes [`encode`] writes for `x`
pub fn encoded_len(x: u64) -> usize {
    if x < SHORT_FORM_MAX {
        1
    } else {
        1 + value_width(x)
    }
}

/// Appends the BER encoding of `x` to `buf`, returning the byte count
pub fn encode<B: BufMut>(x: u64, buf: &mut B) -> usize {
    if x < SHORT_FORM_MAX {
        buf.put_u8(x as u8);
        return 1;
    }
    let width = value_width(x);
    buf.put_u8(LONG_FORM_MASK | width as u8);
    for i in (0..width).rev() {
        buf.put_u8((x >> (i * 8)) as u8);
    }
    1 + width
}

/// Reads a BER length from the front of `buf`
///
/// Returns the value and the number of bytes consumed.
pub fn decode(buf: &[u8]) -> Result<(u64, usize)> {
    let first = *buf.first().ok_or(ProtocolError::Truncated)?;
    if first & LONG_FORM_MASK == 0 {
        return Ok((u64::from(first), 1));
    }
    let width = (first & !LONG_FORM_MASK) as usize;
    if width > 8 {
        return Err(ProtocolError::InvalidMapping(format!(
            "BER length of {width} bytes exceeds 64 bits"
        )));
    }
    if buf.len() < 1 + width {
        return Err(ProtocolError::Truncated);
    }
    let mut x = 0u64;
    for byte in &buf[1..1 + width] {
        x = (x << 8) | u64::from(*byte);
    }
    Ok((x, 1 + width))
}
