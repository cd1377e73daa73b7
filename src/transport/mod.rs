//! # Transport Layer
//!
//! This file is part of the Datalink Protocol project.
//!
//! It defines the transport layer for network communication.
//!
//! The transport layer is responsible for moving framed messages between
//! nodes, ensuring that frames are sent and received correctly.
//!
//! It abstracts the underlying network details, allowing higher-level
//! protocol logic to focus on message decoding and dispatch.
//!
//! ## Responsibilities
//! - Bind listeners and open client connections
//! - Wrap sockets in the length-prefixed frame codec
pub mod remote;
