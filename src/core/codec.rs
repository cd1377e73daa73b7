//! # Codec
//!
//! This file is part of the Datalink Protocol project.
//!
//! It defines the codec for encoding and decoding wire frames using the
//! [`Frame`] struct.
//!
//! The codec is designed to work with the [`tokio`] framework for
//! asynchronous I/O. Specifically, the `FrameCodec` struct implements the
//! [`Decoder`] and [`Encoder`] traits from [`tokio_util::codec`].
//!
//! ## Responsibilities
//! - Decode frames from a byte stream
//! - Encode frames into a byte stream
//! - Handle the fixed-length header and variable-length payload
//!
//! This module is essential for processing RPC messages in a networked
//! environment, ensuring correct parsing and serialization.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_FRAME_SIZE;
use crate::core::frame::{Frame, FRAME_HEADER_SIZE};
use crate::error::{ProtocolError, Result};

#[derive(Debug)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    /// Creates a codec with a connection-specific frame size cap
    ///
    /// The protocol ceiling `MAX_FRAME_SIZE` always applies; larger values
    /// are clamped to it.
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            max_frame_size: max_frame_size.min(MAX_FRAME_SIZE),
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_FRAME_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    /// Decodes a frame from the byte stream
    ///
    /// Returns `None` if there aren't enough bytes to form a complete frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::OversizedFrame` as soon as the header declares
    /// a length beyond the configured cap, and `ProtocolError::InvalidHeader`
    /// if the frame data is malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if len > self.max_frame_size {
            return Err(ProtocolError::OversizedFrame(len));
        }

        let total_len = FRAME_HEADER_SIZE + len;
        if src.len() < total_len {
            return Ok(None); // Wait for full frame
        }

        let buf = src.split_to(total_len).freeze();
        Frame::from_bytes(&buf).map(Some)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    /// Encodes a frame into the byte stream
    ///
    /// # Errors
    /// This method should never fail under normal conditions
    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        let bytes = frame.to_bytes();
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);

        Ok(())
    }
}
