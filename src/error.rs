//! # Error
//!
//! This file is part of the Datalink Protocol project.
//!
//! It defines the error types used throughout the protocol layer.
//!
//! This module provides a unified error handling mechanism for the datalink
//! service, encapsulating various error scenarios such as I/O errors, framing
//! and decoding issues, and KLV mapping failures.
//!
//! It uses the `thiserror` crate for ergonomic error definition.
//!
//! A custom `Result<T>` alias is provided to simplify signatures across the
//! protocol stack.
//!
//! The `ProtocolError` enum includes variants for:
//! - Invalid frame headers and oversized frames
//! - Unsupported protocol versions
//! - Truncated or malformed messages
//! - Missing required fields and checksum mismatches
//! - I/O and timeout errors
//!
//! # Example Usage
//! ```rust
//! use datalink_protocol::error::{ProtocolError, Result};
//! use std::fs::File;
//! use std::io::Read;
//!
//! fn read_file(path: &str) -> Result<String> {
//!     let mut file = File::open(path).map_err(ProtocolError::Io)?;
//!     let mut contents = String::new();
//!     file.read_to_string(&mut contents).map_err(ProtocolError::Io)?;
//!     Ok(contents)
//! }
//!
//! fn main() {
//!     match read_file("example.txt") {
//!         Ok(contents) => println!("File contents: {}", contents),
//!         Err(e) => eprintln!("Error reading file: {}", e),
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid frame header")]
    InvalidHeader,

    #[error("Unsupported protocol version: {0:#010x}")]
    UnsupportedVersion(u32),

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Truncated message")]
    Truncated,

    #[error("Invalid wire type: {0}")]
    InvalidType(u8),

    #[error("Invalid length: {0}")]
    InvalidLength(i32),

    #[error("Invalid message kind: {0}")]
    InvalidMessageKind(u8),

    #[error("Value nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    #[error("Invalid string payload: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Unexpected message type")]
    UnexpectedMessage,

    #[error("Unrecognized universal label key")]
    UnknownLabel,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Bad sequence id: expected {expected}, got {actual}")]
    BadSequenceId { expected: i32, actual: i32 },

    #[error("Application error ({kind}): {message}")]
    Application { kind: i32, message: String },

    #[error("Checksum mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("Invalid value mapping: {0}")]
    InvalidMapping(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout occurred")]
    Timeout,
}
