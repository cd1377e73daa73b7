//! # Service
//!
//! This file is part of the Datalink Protocol project.
//!
//! It defines the St060115 update service: the handler trait the daemon
//! drives, the processor that binds it to the dispatcher, and the call and
//! reply encodings shared with the client.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{error, warn};

use crate::error::{ProtocolError, Result};
use crate::protocol::binary::{
    exception, read_application_exception, write_application_exception, BinaryReader,
    BinaryWriter, MessageKind, TType,
};
use crate::protocol::dispatcher::Dispatcher;

use super::types::UasDatalinkLocalSet;

/// Method name of the datalink update call
pub const UPDATE_METHOD: &str = "update";

/// Receives decoded local sets, one call per message, in arrival order
pub trait DatalinkHandler: Send + Sync + 'static {
    fn update(&self, set: UasDatalinkLocalSet) -> Result<()>;
}

/// Prints every received set to stdout
#[derive(Debug, Default, Clone)]
pub struct LoggingHandler;

impl LoggingHandler {
    fn write_update<W: Write>(mut out: W, set: &UasDatalinkLocalSet) -> io::Result<()> {
        writeln!(out, "received message: {set}")
    }
}

impl DatalinkHandler for LoggingHandler {
    fn update(&self, set: UasDatalinkLocalSet) -> Result<()> {
        Self::write_update(io::stdout().lock(), &set)?;
        Ok(())
    }
}

/// Builds a dispatcher with the `update` method bound to `handler`
///
/// Argument decode failures propagate to the caller and abort the
/// connection. Handler failures are answered with an internal-error
/// exception so the connection survives them.
pub fn processor<H: DatalinkHandler>(handler: Arc<H>) -> Dispatcher {
    let dispatcher = Dispatcher::new();
    dispatcher.register(UPDATE_METHOD, move |header, reader| {
        let set = read_update_args(reader)?;
        let result = handler.update(set);
        if header.kind == MessageKind::Oneway {
            if let Err(err) = result {
                warn!(error = %err, "oneway update failed");
            }
            return Ok(None);
        }
        match result {
            Ok(()) => Ok(Some(write_update_reply(header.seq))),
            Err(err) => {
                error!(error = %err, "update handler failed");
                Ok(Some(write_application_exception(
                    UPDATE_METHOD,
                    header.seq,
                    exception::INTERNAL_ERROR,
                    &err.to_string(),
                )))
            }
        }
    });
    dispatcher
}

/// Encodes an `update` call carrying `set`
pub fn write_update_call(set: &UasDatalinkLocalSet, seq: i32, oneway: bool) -> Vec<u8> {
    let kind = if oneway {
        MessageKind::Oneway
    } else {
        MessageKind::Call
    };
    let mut writer = BinaryWriter::new();
    writer.write_message_begin(UPDATE_METHOD, kind, seq);
    writer.write_field_begin(TType::Struct, 1);
    set.write(&mut writer);
    writer.write_field_stop();
    writer.into_payload()
}

// Argument struct of an update call: field 1 carries the local set.
fn read_update_args(reader: &mut BinaryReader<'_>) -> Result<UasDatalinkLocalSet> {
    let mut set = None;
    while let Some((ftype, id)) = reader.read_field_begin()? {
        match (id, ftype) {
            (1, TType::Struct) => set = Some(UasDatalinkLocalSet::read(reader)?),
            (_, other) => reader.skip(other)?,
        }
    }
    set.ok_or(ProtocolError::MissingField("message"))
}

/// Encodes the void reply to an `update` call
pub fn write_update_reply(seq: i32) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write_message_begin(UPDATE_METHOD, MessageKind::Reply, seq);
    writer.write_field_stop();
    writer.into_payload()
}

/// Decodes an `update` reply, surfacing application exceptions
pub fn read_update_reply(payload: &[u8], expected_seq: i32) -> Result<()> {
    let mut reader = BinaryReader::new(payload);
    let header = reader.read_message_begin()?;
    if header.seq != expected_seq {
        return Err(ProtocolError::BadSequenceId {
            expected: expected_seq,
            actual: header.seq,
        });
    }
    match header.kind {
        MessageKind::Reply => {
            // void result: an empty struct body
            while let Some((ftype, _id)) = reader.read_field_begin()? {
                reader.skip(ftype)?;
            }
            Ok(())
        }
        MessageKind::Exception => Err(read_application_exception(&mut reader)?),
        MessageKind::Call | MessageKind::Oneway => Err(ProtocolError::UnexpectedMessage),
    }
}
