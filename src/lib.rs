//! # Datalink Protocol
//! This file is part of the Datalink Protocol project.
//!
//! It provides the main entry point for the protocol layer,
//! including the core components, transport mechanisms,
//! and utility functions.
//!
//! The protocol carries UAS datalink local sets between a client and a
//! daemon over framed TCP, one connection served at a time, with calls
//! answered in arrival order.
//!
//! The main components include:
//! - Core: frame handling, codec, error management
//! - Transport: network communication, remote operations
//! - Protocol: strict binary message encoding, call routing
//! - Datalink: the local set type, its handler and service glue
//! - Klv: key-length-value packet encoding for the local set
//! - Service: client and daemon abstractions
//! - Utils: logging, time, timeout management
pub mod config;
pub mod error;

pub mod core {
    pub mod codec;
    pub mod frame;
}

pub mod transport; // listener + framed connections
pub mod protocol;  // binary encoding + dispatch
pub mod datalink;  // local set type and service
pub mod klv;       // KLV packet encoding
pub mod service;   // client/daemon abstraction
pub mod utils;     // logging/time/timeout

pub use config::*;
pub use error::*;
pub use self::core::codec::FrameCodec;
pub use self::core::frame::Frame;
pub use datalink::{DatalinkHandler, LoggingHandler, UasDatalinkLocalSet};
