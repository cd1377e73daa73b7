//! # Service Layer
//!
//! This file is part of the Datalink Protocol project.
//!
//! It provides the client and daemon abstractions built on the framed
//! transport: the daemon accepts connections and feeds decoded calls to a
//! handler, and the client issues `update` calls and awaits their
//! acknowledgements.
pub mod client;
pub mod daemon;
