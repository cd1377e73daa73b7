//! # Datalink
//!
//! This file is part of the Datalink Protocol project.
//!
//! It carries the UAS Datalink Local Set message type, its wire and KLV
//! codecs, and the St060115 update service bound to the generic dispatcher.

pub mod service;
pub mod types;

pub use service::{DatalinkHandler, LoggingHandler};
pub use types::UasDatalinkLocalSet;
