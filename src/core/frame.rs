//! # Frame
//!
//! This file is part of the Datalink Protocol project.
//!
//! It defines the `Frame` structure and handles all related serialization
//! and deserialization logic.
//!
//! A `Frame` is one length-delimited unit of the binary wire encoding,
//! carrying exactly one RPC call or response. On the wire it is a 4-byte
//! big-endian length prefix followed by the message payload.
//!
//! Protocol constants like `MAX_FRAME_SIZE` are defined in the `config`
//! module.
//!
//! ## Responsibilities
//! - Decode frames from raw byte buffers
//! - Encode `Frame` structs into raw bytes
//! - Validate frame length bounds
//!
//! The design is optimized for performance and integration with the rest
//! of the protocol layer.
use crate::config::MAX_FRAME_SIZE;
use crate::error::{ProtocolError, Result};

/// Total size of the fixed-length header
pub const FRAME_HEADER_SIZE: usize = 4;

/// One length-delimited RPC message
pub struct Frame {
    pub payload: Vec<u8>,
}

impl Frame {
    /// Parse a frame from a raw buffer (header + body)
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Err(ProtocolError::InvalidHeader);
        }

        let length = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        if length == 0 {
            return Err(ProtocolError::InvalidHeader);
        }
        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedFrame(length));
        }
        if buf.len() < FRAME_HEADER_SIZE + length {
            return Err(ProtocolError::Truncated);
        }

        let payload = buf[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + length].to_vec();
        Ok(Frame { payload })
    }

    /// Serialize a frame to a byte vector (header + body)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let frame = Frame {
            payload: vec![0x80, 0x01, 0x00, 0x01],
        };
        let bytes = frame.to_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 4]);

        let decoded = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.payload, frame.payload);
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(matches!(
            Frame::from_bytes(&[0, 0, 0]),
            Err(ProtocolError::InvalidHeader)
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            Frame::from_bytes(&[0, 0, 0, 0]),
            Err(ProtocolError::InvalidHeader)
        ));
    }

    #[test]
    fn oversized_declaration_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_FRAME_SIZE as u32 + 1).to_be_bytes());
        buf.push(0);
        assert!(matches!(
            Frame::from_bytes(&buf),
            Err(ProtocolError::OversizedFrame(_))
        ));
    }
}
