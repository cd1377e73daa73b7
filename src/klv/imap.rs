//! ST 1201 IMAP conversions between floating-point ranges and unsigned
//! integers.
//!
//! IMAP A derives the integer length from a precision; IMAP B takes the
//! length directly. The most significant five bits of an encoded value
//! carry the special-value mask from ST 1201.4 Table 2 (infinities, NaNs,
//! user-defined and reserved ranges).

use crate::error::{ProtocolError, Result};

const SPECIAL_MASK_NBITS: usize = 5;

const SPECIAL_P_INF: u8 = 0b11001;
const SPECIAL_N_INF: u8 = 0b11101;
const SPECIAL_P_QNAN: u8 = 0b11010;
const SPECIAL_N_QNAN: u8 = 0b11110;
const SPECIAL_P_SNAN: u8 = 0b11011;
const SPECIAL_N_SNAN: u8 = 0b11111;
const SPECIAL_USER: u8 = 0b11000;

const FLOAT64_P_INF: u64 = 0x7ff0_0000_0000_0000;
const FLOAT64_N_INF: u64 = 0xfff0_0000_0000_0000;
const FLOAT64_P_QNAN: u64 = 0x7ff8_0000_0000_0000;
const FLOAT64_N_QNAN: u64 = 0xfff8_0000_0000_0000;
const FLOAT64_P_SNAN: u64 = 0x7ff4_0000_0000_0000;
const FLOAT64_N_SNAN: u64 = 0xfff4_0000_0000_0000;

fn boundaries_valid(a: f64, b: f64) -> bool {
    !(a.is_nan() || b.is_nan() || a.is_infinite() || b.is_infinite() || b <= a)
}

fn reserved(mask: u8) -> bool {
    mask == 0b11100 || (mask & 0b11100) == 0b10100
}

// Forward and reverse scale factors for an L-byte mapping of [a, b]
fn constants(a: f64, b: f64, length: usize) -> (f64, f64) {
    let b_pow = (b - a).log2().ceil() as i32;
    let d_pow = (8 * length - 1) as i32;
    let s_f = 2f64.powi(d_pow - b_pow);
    (s_f, s_f.recip())
}

// Shifts a range straddling zero so that 0.0 maps to an exact integer
fn z_offset(a: f64, b: f64, s_f: f64) -> f64 {
    if a < 0.0 && b > 0.0 {
        s_f * a - (s_f * a).floor()
    } else {
        0.0
    }
}

fn special_value(x: f64, length: usize) -> u64 {
    let shift = 8 * length - SPECIAL_MASK_NBITS;
    let mask = match x.to_bits() {
        FLOAT64_P_INF => SPECIAL_P_INF,
        FLOAT64_N_INF => SPECIAL_N_INF,
        FLOAT64_P_SNAN => SPECIAL_P_SNAN,
        FLOAT64_N_SNAN => SPECIAL_N_SNAN,
        FLOAT64_P_QNAN => SPECIAL_P_QNAN,
        FLOAT64_N_QNAN => SPECIAL_N_QNAN,
        _ => return 0,
    };
    u64::from(mask) << shift
}

/// IMAP B mapping: an explicit byte length for the range `[a, b]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImapB {
    a: f64,
    b: f64,
    length: usize,
}

impl ImapB {
    /// Creates a mapping of `[a, b]` onto unsigned integers of `length`
    /// bytes (1 through 8)
    pub fn new(a: f64, b: f64, length: usize) -> Result<Self> {
        if !boundaries_valid(a, b) {
            return Err(ProtocolError::InvalidMapping(format!(
                "invalid IMAP boundaries [{a}, {b}]"
            )));
        }
        if length == 0 || length > 8 {
            return Err(ProtocolError::InvalidMapping(format!(
                "invalid IMAP length of {length} bytes"
            )));
        }
        Ok(Self { a, b, length })
    }

    /// Encoded size in bytes
    pub fn length(&self) -> usize {
        self.length
    }

    /// Maps `x` onto the integer range
    ///
    /// Exact infinities and NaNs become their ST 1201.4 Table 2 bit
    /// patterns; everything else maps linearly.
    pub fn encode(&self, x: f64) -> u64 {
        let y = special_value(x, self.length);
        if y != 0 {
            return y;
        }
        let (s_f, _) = constants(self.a, self.b, self.length);
        let z = z_offset(self.a, self.b, s_f);
        (s_f * (x - self.a) + z).floor() as u64
    }

    /// Maps an integer back onto `[a, b]`
    ///
    /// User-defined and reserved special masks are rejected.
    pub fn decode(&self, y: u64) -> Result<f64> {
        let msbs = (y >> (8 * (self.length - 1) + 3)) as u8;
        if msbs == SPECIAL_USER {
            return Err(ProtocolError::InvalidMapping(format!(
                "user-defined IMAP value {y:#x}"
            )));
        }
        if reserved(msbs) {
            return Err(ProtocolError::InvalidMapping(format!(
                "reserved IMAP value {y:#x}"
            )));
        }
        let msb = 8 * self.length - 1;
        if (y >> msb) & 1 == 1 && (y >> (msb - 1)) & 1 == 1 {
            let bits = match msbs {
                SPECIAL_P_INF => FLOAT64_P_INF,
                SPECIAL_N_INF => FLOAT64_N_INF,
                SPECIAL_P_SNAN => FLOAT64_P_SNAN,
                SPECIAL_N_SNAN => FLOAT64_N_SNAN,
                SPECIAL_P_QNAN => FLOAT64_P_QNAN,
                SPECIAL_N_QNAN => FLOAT64_N_QNAN,
                other => {
                    return Err(ProtocolError::InvalidMapping(format!(
                        "unknown IMAP special mask {other:#07b}"
                    )))
                }
            };
            return Ok(f64::from_bits(bits));
        }
        let (s_f, s_r) = constants(self.a, self.b, self.length);
        let z = z_offset(self.a, self.b, s_f);
        Ok(s_r * (y as f64 - z) + self.a)
    }
}

/// IMAP A mapping: the byte length is derived from a precision `g`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImapA {
    inner: ImapB,
}

impl ImapA {
    /// Creates a mapping of `[a, b]` with at least precision `g`
    pub fn new(a: f64, b: f64, g: f64) -> Result<Self> {
        if !boundaries_valid(a, b) || g <= 0.0 || !g.is_finite() || (b - a) < g {
            return Err(ProtocolError::InvalidMapping(format!(
                "invalid IMAP precision {g} over [{a}, {b}]"
            )));
        }
        let l_bits = (b - a).log2().ceil() - g.log2().floor() + 1.0;
        let length = (l_bits / 8.0).ceil() as usize;
        Ok(Self {
            inner: ImapB::new(a, b, length)?,
        })
    }

    /// Encoded size in bytes
    pub fn length(&self) -> usize {
        self.inner.length()
    }

    /// Maps `x` onto the integer range
    pub fn encode(&self, x: f64) -> u64 {
        self.inner.encode(x)
    }

    /// Maps an integer back onto `[a, b]`
    pub fn decode(&self, y: u64) -> Result<f64> {
        self.inner.decode(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ST 1201.4 Example 3
    fn example_a() -> ImapA {
        ImapA::new(-900.0, 19_000.0, 0.5).unwrap()
    }

    // ST 1201.4 Example 4
    fn example_b() -> ImapB {
        ImapB::new(0.1, 0.9, 2).unwrap()
    }

    #[test]
    fn imap_a_derives_length_from_precision() {
        assert_eq!(example_a().length(), 3);
    }

    #[test]
    fn imap_a_encodes_example_values() {
        let imap = example_a();
        assert_eq!(imap.encode(-900.0), 0x00_0000);
        assert_eq!(imap.encode(0.0), 0x03_8400);
        assert_eq!(imap.encode(10.0), 0x03_8e00);
        assert_eq!(imap.encode(f64::NEG_INFINITY), 0xe8_0000);
    }

    #[test]
    fn imap_a_decodes_example_values() {
        let imap = example_a();
        assert_eq!(imap.decode(0x00_0000).unwrap(), -900.0);
        assert_eq!(imap.decode(0x03_8400).unwrap(), 0.0);
        assert_eq!(imap.decode(0x03_8e00).unwrap(), 10.0);
        assert_eq!(imap.decode(0xe8_0000).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn imap_b_encodes_example_values() {
        let imap = example_b();
        assert_eq!(imap.encode(0.1), 0x0000);
        assert_eq!(imap.encode(0.5), 0x3333);
        assert_eq!(imap.encode(0.9), 0x6666);
        assert_eq!(imap.encode(f64::NEG_INFINITY), 0xe800);
    }

    #[test]
    fn imap_b_decodes_within_reverse_scale() {
        let imap = example_b();
        // one scale step is 2^-15
        let step = 1.0 / 32_768.0;
        assert!((imap.decode(0x0000).unwrap() - 0.1).abs() < step);
        assert!((imap.decode(0x3333).unwrap() - 0.5).abs() < step);
        assert!((imap.decode(0x6666).unwrap() - 0.9).abs() < step);
    }

    #[test]
    fn special_values_round_trip() {
        let imap = example_b();
        assert_eq!(imap.encode(f64::INFINITY), 0xc800);
        assert_eq!(imap.decode(0xc800).unwrap(), f64::INFINITY);
        let qnan = imap.encode(f64::NAN);
        assert_eq!(qnan, 0xd000);
        assert!(imap.decode(qnan).unwrap().is_nan());
    }

    #[test]
    fn user_and_reserved_masks_are_rejected() {
        let imap = example_b();
        assert!(imap.decode(0xc000).is_err());
        assert!(imap.decode(0xe000).is_err());
        assert!(imap.decode(0xa000).is_err());
    }

    #[test]
    fn invalid_boundaries_are_rejected() {
        assert!(ImapB::new(1.0, 1.0, 2).is_err());
        assert!(ImapB::new(2.0, 1.0, 2).is_err());
        assert!(ImapB::new(f64::NAN, 1.0, 2).is_err());
        assert!(ImapB::new(0.0, f64::INFINITY, 2).is_err());
    }

    #[test]
    fn invalid_lengths_are_rejected() {
        assert!(ImapB::new(0.0, 1.0, 0).is_err());
        assert!(ImapB::new(0.0, 1.0, 9).is_err());
    }

    #[test]
    fn invalid_precisions_are_rejected() {
        assert!(ImapA::new(0.0, 1.0, 0.0).is_err());
        assert!(ImapA::new(0.0, 1.0, -0.5).is_err());
        assert!(ImapA::new(0.0, 1.0, 2.0).is_err());
        assert!(ImapA::new(0.0, 1.0, f64::NAN).is_err());
    }
}
