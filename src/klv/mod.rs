//! # KLV
//!
//! This file is part of the Datalink Protocol project.
//!
//! MISB KLV building blocks shared by the local-set packet codec:
//!
//! - [`ber`]: Basic Encoding Rules length octets (ISO/IEC 8825-1 Section
//!   8.1.3.3; MISP Motion Imagery Handbook Section 7.3.1). Short form for
//!   values below 0x80, long form otherwise.
//! - [`beroid`]: BER Object Identifier encoding for item tags (ISO/IEC
//!   8825-1 Section 8.19.2; MISP Motion Imagery Handbook Section 7.3.2).
//!   Seven value bits per byte, network byte order, most-significant bit
//!   flags continuation. BER and BER-OID agree only for values up to 127.
//! - [`imap`]: ST 1201 mapping between floating-point ranges and unsigned
//!   integers of a chosen byte length, including the special-value bit
//!   patterns for infinities and NaNs.

pub mod ber;
pub mod beroid;
pub mod imap;

/// Universal Label key of the UAS Datalink Local Set (ST 0601)
pub const UAS_DATALINK_LS_UL: [u8; 16] = [
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x0b, 0x01, 0x01, 0x0e, 0x01, 0x03, 0x01, 0x01, 0x00, 0x00,
    0x00,
];

/// Running 16-bit checksum over a KLV packet
///
/// Every byte is summed into a 16-bit accumulator, even-indexed bytes
/// (0-based) into the high octet and odd-indexed bytes into the low octet.
/// The packet checksum covers everything from the first UL byte through the
/// checksum item's length octet.
pub fn checksum_16(bytes: &[u8]) -> u16 {
    bytes.iter().enumerate().fold(0u16, |bcc, (i, byte)| {
        let shift = if i % 2 == 0 { 8 } else { 0 };
        bcc.wrapping_add((*byte as u16) << shift)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_alternates_octets() {
        assert_eq!(checksum_16(&[]), 0);
        assert_eq!(checksum_16(&[0x06]), 0x0600);
        assert_eq!(checksum_16(&[0x06, 0x0e]), 0x060e);
        assert_eq!(checksum_16(&[0x06, 0x0e, 0x2b]), 0x310e);
    }

    #[test]
    fn checksum_wraps() {
        assert_eq!(checksum_16(&[0xff, 0x00, 0xff, 0x00]), 0xfe00);
    }
}
