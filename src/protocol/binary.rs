//! Strict binary message encoding.
//!
//! One frame payload carries one message: a version word
//! (`BINARY_VERSION_1 | kind`), the method name, a sequence id, and then a
//! field-tagged struct body. All integers are big-endian; doubles travel as
//! their IEEE-754 bit pattern. A reader that encounters a message without the
//! strict version word rejects it.

use bytes::{BufMut, BytesMut};

use crate::config::{BINARY_VERSION_1, VERSION_MASK};
use crate::error::{ProtocolError, Result};

/// Wire type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TType {
    pub fn from_byte(byte: u8) -> Result<Self> {
        Ok(match byte {
            0 => TType::Stop,
            1 => TType::Void,
            2 => TType::Bool,
            3 => TType::Byte,
            4 => TType::Double,
            6 => TType::I16,
            8 => TType::I32,
            10 => TType::I64,
            11 => TType::String,
            12 => TType::Struct,
            13 => TType::Map,
            14 => TType::Set,
            15 => TType::List,
            other => return Err(ProtocolError::InvalidType(other)),
        })
    }
}

/// Message kinds carried in the low byte of the version word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl MessageKind {
    pub fn from_byte(byte: u8) -> Result<Self> {
        Ok(match byte {
            1 => MessageKind::Call,
            2 => MessageKind::Reply,
            3 => MessageKind::Exception,
            4 => MessageKind::Oneway,
            other => return Err(ProtocolError::InvalidMessageKind(other)),
        })
    }
}

/// Decoded message envelope: method name, kind and sequence id
#[derive(Debug, Clone)]
pub struct MessageHeader {
    pub name: String,
    pub kind: MessageKind,
    pub seq: i32,
}

/// Nesting levels [`BinaryReader::skip`] follows before refusing a value
pub const MAX_SKIP_DEPTH: usize = 64;

/// Type codes of the standard application-exception struct
pub mod exception {
    pub const UNKNOWN: i32 = 0;
    pub const UNKNOWN_METHOD: i32 = 1;
    pub const INVALID_MESSAGE_TYPE: i32 = 2;
    pub const BAD_SEQUENCE_ID: i32 = 4;
    pub const INTERNAL_ERROR: i32 = 6;
}

/// Cursor over one message payload with checked reads
pub struct BinaryReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ProtocolError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.take(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_i32()? as u32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    pub fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(ProtocolError::InvalidLength(len));
        }
        let bytes = self.take(len as usize)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Reads the message envelope, enforcing the strict version word
    pub fn read_message_begin(&mut self) -> Result<MessageHeader> {
        let word = self.read_u32()?;
        if word & VERSION_MASK != BINARY_VERSION_1 {
            return Err(ProtocolError::UnsupportedVersion(word));
        }
        let kind = MessageKind::from_byte((word & 0xff) as u8)?;
        let name = self.read_string()?;
        let seq = self.read_i32()?;
        Ok(MessageHeader { name, kind, seq })
    }

    /// Reads a field header; `None` marks the end of the struct
    pub fn read_field_begin(&mut self) -> Result<Option<(TType, i16)>> {
        let byte = self.read_u8()?;
        if byte == TType::Stop as u8 {
            return Ok(None);
        }
        let ttype = TType::from_byte(byte)?;
        let id = self.read_i16()?;
        Ok(Some((ttype, id)))
    }

    /// Skips one value of the given type, recursing into structs and
    /// containers, so unknown fields never desynchronize the stream
    ///
    /// Nesting beyond [`MAX_SKIP_DEPTH`] levels is rejected; no
    /// legitimate schema comes close, and the recursion must not be
    /// allowed to track attacker-chosen input.
    pub fn skip(&mut self, ttype: TType) -> Result<()> {
        self.skip_nested(ttype, 0)
    }

    fn skip_nested(&mut self, ttype: TType, depth: usize) -> Result<()> {
        if depth >= MAX_SKIP_DEPTH
            && matches!(
                ttype,
                TType::Struct | TType::Map | TType::Set | TType::List
            )
        {
            return Err(ProtocolError::NestingTooDeep(MAX_SKIP_DEPTH));
        }
        match ttype {
            TType::Bool | TType::Byte => {
                self.take(1)?;
            }
            TType::I16 => {
                self.take(2)?;
            }
            TType::I32 => {
                self.take(4)?;
            }
            TType::I64 | TType::Double => {
                self.take(8)?;
            }
            TType::String => {
                let len = self.read_i32()?;
                if len < 0 {
                    return Err(ProtocolError::InvalidLength(len));
                }
                self.take(len as usize)?;
            }
            TType::Struct => {
                while let Some((field_type, _)) = self.read_field_begin()? {
                    self.skip_nested(field_type, depth + 1)?;
                }
            }
            TType::Map => {
                let key_type = TType::from_byte(self.read_u8()?)?;
                let val_type = TType::from_byte(self.read_u8()?)?;
                let size = self.read_i32()?;
                if size < 0 {
                    return Err(ProtocolError::InvalidLength(size));
                }
                for _ in 0..size {
                    self.skip_nested(key_type, depth + 1)?;
                    self.skip_nested(val_type, depth + 1)?;
                }
            }
            TType::Set | TType::List => {
                let elem_type = TType::from_byte(self.read_u8()?)?;
                let size = self.read_i32()?;
                if size < 0 {
                    return Err(ProtocolError::InvalidLength(size));
                }
                for _ in 0..size {
                    self.skip_nested(elem_type, depth + 1)?;
                }
            }
            TType::Stop | TType::Void => {
                return Err(ProtocolError::InvalidType(ttype as u8));
            }
        }
        Ok(())
    }
}

/// Builder for one message payload
pub struct BinaryWriter {
    buf: BytesMut,
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn write_message_begin(&mut self, name: &str, kind: MessageKind, seq: i32) {
        self.buf.put_u32(BINARY_VERSION_1 | kind as u32);
        self.write_string(name);
        self.buf.put_i32(seq);
    }

    pub fn write_field_begin(&mut self, ttype: TType, id: i16) {
        self.buf.put_u8(ttype as u8);
        self.buf.put_i16(id);
    }

    pub fn write_field_stop(&mut self) {
        self.buf.put_u8(TType::Stop as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    pub fn write_double(&mut self, value: f64) {
        self.buf.put_i64(value.to_bits() as i64);
    }

    pub fn write_string(&mut self, value: &str) {
        self.buf.put_i32(value.len() as i32);
        self.buf.put_slice(value.as_bytes());
    }
}

/// Encodes an exception reply carrying the standard exception struct
/// (1: string message, 2: i32 type)
pub fn write_application_exception(name: &str, seq: i32, kind: i32, message: &str) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write_message_begin(name, MessageKind::Exception, seq);
    writer.write_field_begin(TType::String, 1);
    writer.write_string(message);
    writer.write_field_begin(TType::I32, 2);
    writer.write_i32(kind);
    writer.write_field_stop();
    writer.into_payload()
}

/// Decodes the standard exception struct into the error it reports
pub fn read_application_exception(reader: &mut BinaryReader) -> Result<ProtocolError> {
    let mut message = String::new();
    let mut kind = exception::UNKNOWN;

    while let Some((field_type, id)) = reader.read_field_begin()? {
        match (id, field_type) {
            (1, TType::String) => message = reader.read_string()?,
            (2, TType::I32) => kind = reader.read_i32()?,
            (_, other) => reader.skip(other)?,
        }
    }

    Ok(ProtocolError::Application { kind, message })
}
