//! # Datalink Protocol Module
//!
//! This file is part of the Datalink Protocol project.
//!
//! It provides the message layer that rides inside frames: a strict
//! big-endian binary encoding for message envelopes and field-tagged
//! struct bodies, and a dispatcher that routes decoded calls to
//! registered method handlers.
//!
//! The main components include:
//! - `binary`: reader and writer for the strict binary wire encoding
//! - `dispatcher`: method registry and call routing
//!
//! This module is essential for processing protocol messages in a
//! networked environment, ensuring correct parsing and serialization.
pub mod binary;
pub mod dispatcher;
