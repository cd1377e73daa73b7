//! BER-OID tag encoding.
//!
//! Each byte carries seven value bits in network byte order; the
//! most-significant bit is set on every byte except the last. A 64-bit
//! value needs at most [`MAX_BYTES`] bytes, and a ten-byte encoding is
//! representable only when its first byte is `0x81`.

use bytes::BufMut;

use crate::error::{ProtocolError, Result};

/// Largest encoding of a 64-bit value: ten groups of seven bits
pub const MAX_BYTES: usize = 10;
/// Continuation marker on every byte but the last
pub const CONTINUATION: u8 = 0x80;

/// Number of bytes [`encode`] writes for `x`
pub fn encoded_len(x: u64) -> usize {
    let bits = 64 - x.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Appends the BER-OID encoding of `x` to `buf`, returning the byte count
pub fn encode<B: BufMut>(x: u64, buf: &mut B) -> usize {
    let groups = encoded_len(x);
    for i in (0..groups).rev() {
        let mut byte = ((x >> (i * 7)) & 0x7f) as u8;
        if i > 0 {
            byte |= CONTINUATION;
        }
        buf.put_u8(byte);
    }
    groups
}

/// Reads a BER-OID value from the front of `buf`
///
/// Returns the value and the number of bytes consumed.
pub fn decode(buf: &[u8]) -> Result<(u64, usize)> {
    let mut groups = None;
    for (i, byte) in buf.iter().enumerate() {
        if byte & CONTINUATION == 0 {
            groups = Some(i + 1);
            break;
        }
    }
    let groups = groups.ok_or(ProtocolError::Truncated)?;
    // Ten groups span 70 bits; only a leading 0x81 still fits in 64.
    if groups > MAX_BYTES || (groups == MAX_BYTES && buf[0] != (CONTINUATION | 1)) {
        return Err(ProtocolError::InvalidMapping(format!(
            "BER-OID value of {groups} bytes exceeds 64 bits"
        )));
    }
    let mut x = 0u64;
    for byte in &buf[..groups] {
        x = (x << 7) | u64::from(byte & 0x7f);
    }
    Ok((x, groups))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vec(x: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        let n = encode(x, &mut buf);
        assert_eq!(n, buf.len());
        assert_eq!(n, encoded_len(x));
        buf
    }

    #[test]
    fn single_group() {
        assert_eq!(encode_vec(0), vec![0x00]);
        assert_eq!(encode_vec(1), vec![0x01]);
        assert_eq!(encode_vec(127), vec![0x7f]);
    }

    #[test]
    fn multi_group() {
        assert_eq!(encode_vec(0x80), vec![0x81, 0x00]);
        assert_eq!(encode_vec(0x90), vec![0x81, 0x10]);
        assert_eq!(encode_vec(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encode_vec(0x4000), vec![0x81, 0x80, 0x00]);
        assert_eq!(encode_vec(0x001f_ffff), vec![0xff, 0xff, 0x7f]);
        assert_eq!(encode_vec(0x0020_0000), vec![0x81, 0x80, 0x80, 0x00]);
    }

    #[test]
    fn encodes_u64_max_in_ten_bytes() {
        let buf = encode_vec(u64::MAX);
        assert_eq!(buf.len(), MAX_BYTES);
        assert_eq!(buf[0], 0x81);
        assert_eq!(decode(&buf).unwrap(), (u64::MAX, MAX_BYTES));
    }

    #[test]
    fn round_trip() {
        for x in [0u64, 1, 127, 0x80, 0x90, 0x3fff, 0x4000, 0x0020_0000, 1 << 63] {
            let buf = encode_vec(x);
            assert_eq!(decode(&buf).unwrap(), (x, buf.len()));
        }
    }

    #[test]
    fn decode_stops_at_terminator() {
        // trailing bytes after the terminator are left unread
        assert_eq!(decode(&[0x81, 0x10, 0x55, 0x66]).unwrap(), (0x90, 2));
    }

    #[test]
    fn decode_rejects_unterminated_input() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0x81]).is_err());
        assert!(decode(&[0x81, 0x80, 0x80]).is_err());
    }

    #[test]
    fn decode_rejects_values_beyond_64_bits() {
        // ten groups led by anything other than 0x81 do not fit
        let buf = [0x82, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        assert!(decode(&buf).is_err());
        let buf = [
            0x81, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00,
        ];
        assert!(decode(&buf).is_err());
    }
}
