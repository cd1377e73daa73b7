//! UAS Datalink Local Set message type and codecs.
//!
//! The set travels two ways: as a field-tagged struct inside an RPC message
//! body, and as a MISB ST 0601 KLV packet (16-byte universal label, BER
//! packet length, BER-OID item tags). The KLV packet leads with the
//! precision time stamp item and ends with the running checksum item.

use std::fmt;

use crate::error::{ProtocolError, Result};
use crate::klv::{self, ber, beroid, imap::ImapA};
use crate::protocol::binary::{BinaryReader, BinaryWriter, TType};

/// ST 0601 tag numbers, also used as RPC field ids
pub mod tag {
    pub const CHECKSUM: i16 = 1;
    pub const PRECISION_TIME_STAMP: i16 = 2;
    pub const MISSION_ID: i16 = 3;
    pub const PLATFORM_HEADING_ANGLE: i16 = 5;
    pub const PLATFORM_DESIGNATION: i16 = 10;
    pub const SENSOR_LATITUDE: i16 = 13;
    pub const SENSOR_LONGITUDE: i16 = 14;
    pub const SENSOR_TRUE_ALTITUDE: i16 = 15;
    pub const ICING_DETECTED: i16 = 34;
    pub const OUTSIDE_AIR_TEMPERATURE: i16 = 39;
    pub const PLATFORM_CALL_SIGN: i16 = 59;
    pub const UAS_DATALINK_LS_VERSION_NUMBER: i16 = 65;
    pub const ALTERNATE_PLATFORM_NAME: i16 = 70;
    pub const EVENT_START_TIME_UTC: i16 = 72;
    pub const TIME_AIRBORNE: i16 = 110;
}

/// ST 0601 revision this crate implements
pub const LS_VERSION: u8 = 15;

// Item 15 maps true altitude in meters over [-900, 19000] at half-meter
// precision, which lands on a three-byte IMAP A encoding.
fn altitude_mapping() -> Result<ImapA> {
    ImapA::new(-900.0, 19_000.0, 0.5)
}

/// UAS Datalink Local Set, ST 0601 revision 15
///
/// Required items are plain fields; everything else is optional and omitted
/// from both encodings when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct UasDatalinkLocalSet {
    /// Running 16-bit checksum of the KLV packet (item 1)
    pub checksum: u16,
    /// Microseconds since the UNIX epoch (item 2)
    pub precision_time_stamp: u64,
    pub mission_id: Option<String>,
    /// Degrees clockwise from true north (item 5)
    pub platform_heading_angle: Option<f64>,
    pub platform_designation: Option<String>,
    pub sensor_latitude: Option<f64>,
    pub sensor_longitude: Option<f64>,
    /// Meters above mean sea level (item 15)
    pub sensor_true_altitude: Option<f64>,
    pub icing_detected: Option<bool>,
    /// Degrees Celsius (item 39)
    pub outside_air_temperature: Option<i8>,
    pub platform_call_sign: Option<String>,
    /// Local set revision, [`LS_VERSION`] unless overridden (item 65)
    pub ls_version_number: u8,
    pub alternate_platform_name: Option<String>,
    pub event_start_time_utc: Option<i64>,
    /// Seconds since takeoff (item 110)
    pub time_airborne: Option<i32>,
}

impl Default for UasDatalinkLocalSet {
    fn default() -> Self {
        Self {
            checksum: 0,
            precision_time_stamp: 0,
            mission_id: None,
            platform_heading_angle: None,
            platform_designation: None,
            sensor_latitude: None,
            sensor_longitude: None,
            sensor_true_altitude: None,
            icing_detected: None,
            outside_air_temperature: None,
            platform_call_sign: None,
            ls_version_number: LS_VERSION,
            alternate_platform_name: None,
            event_start_time_utc: None,
            time_airborne: None,
        }
    }
}

impl UasDatalinkLocalSet {
    /// Decodes a field-tagged struct body from an RPC message
    ///
    /// Unknown fields and known fields with an unexpected wire type are
    /// skipped. The three required items must be present.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut set = Self::default();
        let mut have_checksum = false;
        let mut have_timestamp = false;
        let mut have_version = false;
        while let Some((ftype, id)) = reader.read_field_begin()? {
            match (id, ftype) {
                (tag::CHECKSUM, TType::I16) => {
                    set.checksum = reader.read_i16()? as u16;
                    have_checksum = true;
                }
                (tag::PRECISION_TIME_STAMP, TType::I64) => {
                    set.precision_time_stamp = reader.read_i64()? as u64;
                    have_timestamp = true;
                }
                (tag::MISSION_ID, TType::String) => {
                    set.mission_id = Some(reader.read_string()?);
                }
                (tag::PLATFORM_HEADING_ANGLE, TType::Double) => {
                    set.platform_heading_angle = Some(reader.read_double()?);
                }
                (tag::PLATFORM_DESIGNATION, TType::String) => {
                    set.platform_designation = Some(reader.read_string()?);
                }
                (tag::SENSOR_LATITUDE, TType::Double) => {
                    set.sensor_latitude = Some(reader.read_double()?);
                }
                (tag::SENSOR_LONGITUDE, TType::Double) => {
                    set.sensor_longitude = Some(reader.read_double()?);
                }
                (tag::SENSOR_TRUE_ALTITUDE, TType::Double) => {
                    set.sensor_true_altitude = Some(reader.read_double()?);
                }
                (tag::ICING_DETECTED, TType::Bool) => {
                    set.icing_detected = Some(reader.read_bool()?);
                }
                (tag::OUTSIDE_AIR_TEMPERATURE, TType::Byte) => {
                    set.outside_air_temperature = Some(reader.read_i8()?);
                }
                (tag::PLATFORM_CALL_SIGN, TType::String) => {
                    set.platform_call_sign = Some(reader.read_string()?);
                }
                (tag::UAS_DATALINK_LS_VERSION_NUMBER, TType::Byte) => {
                    set.ls_version_number = reader.read_i8()? as u8;
                    have_version = true;
                }
                (tag::ALTERNATE_PLATFORM_NAME, TType::String) => {
                    set.alternate_platform_name = Some(reader.read_string()?);
                }
                (tag::EVENT_START_TIME_UTC, TType::I64) => {
                    set.event_start_time_utc = Some(reader.read_i64()?);
                }
                (tag::TIME_AIRBORNE, TType::I32) => {
                    set.time_airborne = Some(reader.read_i32()?);
                }
                (_, other) => reader.skip(other)?,
            }
        }
        if !have_checksum {
            return Err(ProtocolError::MissingField("checksum"));
        }
        if !have_timestamp {
            return Err(ProtocolError::MissingField("precision_time_stamp"));
        }
        if !have_version {
            return Err(ProtocolError::MissingField("ls_version_number"));
        }
        Ok(set)
    }

    /// Encodes the set as a field-tagged struct body, fields in tag order
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_field_begin(TType::I16, tag::CHECKSUM);
        writer.write_i16(self.checksum as i16);
        writer.write_field_begin(TType::I64, tag::PRECISION_TIME_STAMP);
        writer.write_i64(self.precision_time_stamp as i64);
        if let Some(ref v) = self.mission_id {
            writer.write_field_begin(TType::String, tag::MISSION_ID);
            writer.write_string(v);
        }
        if let Some(v) = self.platform_heading_angle {
            writer.write_field_begin(TType::Double, tag::PLATFORM_HEADING_ANGLE);
            writer.write_double(v);
        }
        if let Some(ref v) = self.platform_designation {
            writer.write_field_begin(TType::String, tag::PLATFORM_DESIGNATION);
            writer.write_string(v);
        }
        if let Some(v) = self.sensor_latitude {
            writer.write_field_begin(TType::Double, tag::SENSOR_LATITUDE);
            writer.write_double(v);
        }
        if let Some(v) = self.sensor_longitude {
            writer.write_field_begin(TType::Double, tag::SENSOR_LONGITUDE);
            writer.write_double(v);
        }
        if let Some(v) = self.sensor_true_altitude {
            writer.write_field_begin(TType::Double, tag::SENSOR_TRUE_ALTITUDE);
            writer.write_double(v);
        }
        if let Some(v) = self.icing_detected {
            writer.write_field_begin(TType::Bool, tag::ICING_DETECTED);
            writer.write_bool(v);
        }
        if let Some(v) = self.outside_air_temperature {
            writer.write_field_begin(TType::Byte, tag::OUTSIDE_AIR_TEMPERATURE);
            writer.write_i8(v);
        }
        if let Some(ref v) = self.platform_call_sign {
            writer.write_field_begin(TType::String, tag::PLATFORM_CALL_SIGN);
            writer.write_string(v);
        }
        writer.write_field_begin(TType::Byte, tag::UAS_DATALINK_LS_VERSION_NUMBER);
        writer.write_i8(self.ls_version_number as i8);
        if let Some(ref v) = self.alternate_platform_name {
            writer.write_field_begin(TType::String, tag::ALTERNATE_PLATFORM_NAME);
            writer.write_string(v);
        }
        if let Some(v) = self.event_start_time_utc {
            writer.write_field_begin(TType::I64, tag::EVENT_START_TIME_UTC);
            writer.write_i64(v);
        }
        if let Some(v) = self.time_airborne {
            writer.write_field_begin(TType::I32, tag::TIME_AIRBORNE);
            writer.write_i32(v);
        }
        writer.write_field_stop();
    }

    /// Encodes the set as a MISB ST 0601 KLV packet
    ///
    /// The precision time stamp item leads, remaining items follow in tag
    /// order, and the checksum item computed over the packet closes it. The
    /// `checksum` field is not consulted; the written value is always the
    /// packet's own checksum.
    pub fn to_klv(&self) -> Result<Vec<u8>> {
        let mut items = Vec::new();
        put_item(
            &mut items,
            tag::PRECISION_TIME_STAMP,
            &self.precision_time_stamp.to_be_bytes(),
        );
        if let Some(ref v) = self.mission_id {
            put_item(&mut items, tag::MISSION_ID, v.as_bytes());
        }
        if let Some(v) = self.platform_heading_angle {
            put_item(&mut items, tag::PLATFORM_HEADING_ANGLE, &v.to_be_bytes());
        }
        if let Some(ref v) = self.platform_designation {
            put_item(&mut items, tag::PLATFORM_DESIGNATION, v.as_bytes());
        }
        if let Some(v) = self.sensor_latitude {
            put_item(&mut items, tag::SENSOR_LATITUDE, &v.to_be_bytes());
        }
        if let Some(v) = self.sensor_longitude {
            put_item(&mut items, tag::SENSOR_LONGITUDE, &v.to_be_bytes());
        }
        if let Some(v) = self.sensor_true_altitude {
            let imap = altitude_mapping()?;
            let encoded = imap.encode(v).to_be_bytes();
            put_item(
                &mut items,
                tag::SENSOR_TRUE_ALTITUDE,
                &encoded[encoded.len() - imap.length()..],
            );
        }
        if let Some(v) = self.icing_detected {
            put_item(&mut items, tag::ICING_DETECTED, &[u8::from(v)]);
        }
        if let Some(v) = self.outside_air_temperature {
            put_item(&mut items, tag::OUTSIDE_AIR_TEMPERATURE, &v.to_be_bytes());
        }
        if let Some(ref v) = self.platform_call_sign {
            put_item(&mut items, tag::PLATFORM_CALL_SIGN, v.as_bytes());
        }
        put_item(
            &mut items,
            tag::UAS_DATALINK_LS_VERSION_NUMBER,
            &[self.ls_version_number],
        );
        if let Some(ref v) = self.alternate_platform_name {
            put_item(&mut items, tag::ALTERNATE_PLATFORM_NAME, v.as_bytes());
        }
        if let Some(v) = self.event_start_time_utc {
            put_item(&mut items, tag::EVENT_START_TIME_UTC, &(v as u64).to_be_bytes());
        }
        if let Some(v) = self.time_airborne {
            put_item(&mut items, tag::TIME_AIRBORNE, &(v as u32).to_be_bytes());
        }

        // checksum item: one tag byte, one length byte, two value bytes
        let content_len = (items.len() + 4) as u64;
        let mut packet =
            Vec::with_capacity(klv::UAS_DATALINK_LS_UL.len() + ber::encoded_len(content_len) + content_len as usize);
        packet.extend_from_slice(&klv::UAS_DATALINK_LS_UL);
        ber::encode(content_len, &mut packet);
        packet.extend_from_slice(&items);
        beroid::encode(tag::CHECKSUM as u64, &mut packet);
        ber::encode(2, &mut packet);
        let bcc = klv::checksum_16(&packet);
        packet.extend_from_slice(&bcc.to_be_bytes());
        Ok(packet)
    }

    /// Checksum the KLV encoding of this set carries
    pub fn packet_checksum(&self) -> Result<u16> {
        let packet = self.to_klv()?;
        let n = packet.len();
        Ok(u16::from_be_bytes([packet[n - 2], packet[n - 1]]))
    }

    /// Decodes a MISB ST 0601 KLV packet
    ///
    /// The stored checksum is verified against the packet bytes and kept in
    /// the `checksum` field. Unknown item tags are skipped.
    pub fn from_klv(buf: &[u8]) -> Result<Self> {
        let key_len = klv::UAS_DATALINK_LS_UL.len();
        if buf.len() < key_len {
            return Err(ProtocolError::Truncated);
        }
        let (key, rest) = buf.split_at(key_len);
        if key != klv::UAS_DATALINK_LS_UL {
            return Err(ProtocolError::UnknownLabel);
        }
        let (content_len, len_octets) = ber::decode(rest)?;
        let header_len = key_len + len_octets;
        let content_end = len_octets
            .checked_add(content_len as usize)
            .ok_or(ProtocolError::Truncated)?;
        let content = rest
            .get(len_octets..content_end)
            .ok_or(ProtocolError::Truncated)?;

        let mut set = Self::default();
        let mut have_checksum = false;
        let mut have_timestamp = false;
        let mut have_version = false;
        let mut pos = 0usize;
        while pos < content.len() {
            let (tag_value, tag_octets) = beroid::decode(&content[pos..])?;
            pos += tag_octets;
            let (value_len, ber_octets) = ber::decode(&content[pos..])?;
            pos += ber_octets;
            let value_end = pos
                .checked_add(value_len as usize)
                .ok_or(ProtocolError::Truncated)?;
            let value = content.get(pos..value_end).ok_or(ProtocolError::Truncated)?;
            pos = value_end;

            let Ok(item) = i16::try_from(tag_value) else {
                continue;
            };
            match item {
                tag::CHECKSUM => {
                    if value.len() != 2 {
                        return Err(ProtocolError::InvalidMapping(format!(
                            "checksum item of {} bytes",
                            value.len()
                        )));
                    }
                    let stored = u16::from_be_bytes([value[0], value[1]]);
                    let computed = klv::checksum_16(&buf[..header_len + pos - 2]);
                    if stored != computed {
                        return Err(ProtocolError::ChecksumMismatch {
                            expected: computed,
                            actual: stored,
                        });
                    }
                    set.checksum = stored;
                    have_checksum = true;
                }
                tag::PRECISION_TIME_STAMP => {
                    set.precision_time_stamp = be_uint(value)?;
                    have_timestamp = true;
                }
                tag::MISSION_ID => set.mission_id = Some(String::from_utf8(value.to_vec())?),
                tag::PLATFORM_HEADING_ANGLE => {
                    set.platform_heading_angle = Some(be_f64(value)?);
                }
                tag::PLATFORM_DESIGNATION => {
                    set.platform_designation = Some(String::from_utf8(value.to_vec())?);
                }
                tag::SENSOR_LATITUDE => set.sensor_latitude = Some(be_f64(value)?),
                tag::SENSOR_LONGITUDE => set.sensor_longitude = Some(be_f64(value)?),
                tag::SENSOR_TRUE_ALTITUDE => {
                    let imap = altitude_mapping()?;
                    if value.len() != imap.length() {
                        return Err(ProtocolError::InvalidMapping(format!(
                            "altitude item of {} bytes",
                            value.len()
                        )));
                    }
                    set.sensor_true_altitude = Some(imap.decode(be_uint(value)?)?);
                }
                tag::ICING_DETECTED => set.icing_detected = Some(be_uint(value)? != 0),
                tag::OUTSIDE_AIR_TEMPERATURE => {
                    set.outside_air_temperature = Some(be_int(value)? as i8);
                }
                tag::PLATFORM_CALL_SIGN => {
                    set.platform_call_sign = Some(String::from_utf8(value.to_vec())?);
                }
                tag::UAS_DATALINK_LS_VERSION_NUMBER => {
                    set.ls_version_number = be_uint(value)? as u8;
                    have_version = true;
                }
                tag::ALTERNATE_PLATFORM_NAME => {
                    set.alternate_platform_name = Some(String::from_utf8(value.to_vec())?);
                }
                tag::EVENT_START_TIME_UTC => {
                    set.event_start_time_utc = Some(be_uint(value)? as i64);
                }
                tag::TIME_AIRBORNE => set.time_airborne = Some(be_uint(value)? as i32),
                _ => {}
            }
        }
        if !have_checksum {
            return Err(ProtocolError::MissingField("checksum"));
        }
        if !have_timestamp {
            return Err(ProtocolError::MissingField("precision_time_stamp"));
        }
        if !have_version {
            return Err(ProtocolError::MissingField("ls_version_number"));
        }
        Ok(set)
    }
}

impl fmt::Display for UasDatalinkLocalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UasDatalinkLocalSet {{ checksum: {:#06x}, precision_time_stamp: {}",
            self.checksum, self.precision_time_stamp
        )?;
        if let Some(ref v) = self.mission_id {
            write!(f, ", mission_id: {v:?}")?;
        }
        if let Some(v) = self.platform_heading_angle {
            write!(f, ", platform_heading_angle: {v}")?;
        }
        if let Some(ref v) = self.platform_designation {
            write!(f, ", platform_designation: {v:?}")?;
        }
        if let Some(v) = self.sensor_latitude {
            write!(f, ", sensor_latitude: {v}")?;
        }
        if let Some(v) = self.sensor_longitude {
            write!(f, ", sensor_longitude: {v}")?;
        }
        if let Some(v) = self.sensor_true_altitude {
            write!(f, ", sensor_true_altitude: {v}")?;
        }
        if let Some(v) = self.icing_detected {
            write!(f, ", icing_detected: {v}")?;
        }
        if let Some(v) = self.outside_air_temperature {
            write!(f, ", outside_air_temperature: {v}")?;
        }
        if let Some(ref v) = self.platform_call_sign {
            write!(f, ", platform_call_sign: {v:?}")?;
        }
        write!(f, ", ls_version_number: {}", self.ls_version_number)?;
        if let Some(ref v) = self.alternate_platform_name {
            write!(f, ", alternate_platform_name: {v:?}")?;
        }
        if let Some(v) = self.event_start_time_utc {
            write!(f, ", event_start_time_utc: {v}")?;
        }
        if let Some(v) = self.time_airborne {
            write!(f, ", time_airborne: {v}")?;
        }
        f.write_str(" }")
    }
}

fn put_item(out: &mut Vec<u8>, tag: i16, value: &[u8]) {
    beroid::encode(tag as u64, out);
    ber::encode(value.len() as u64, out);
    out.extend_from_slice(value);
}

fn be_uint(value: &[u8]) -> Result<u64> {
    if value.is_empty() || value.len() > 8 {
        return Err(ProtocolError::InvalidMapping(format!(
            "integer item of {} bytes",
            value.len()
        )));
    }
    Ok(value.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn be_int(value: &[u8]) -> Result<i64> {
    let x = be_uint(value)?;
    let shift = 64 - 8 * value.len() as u32;
    Ok(((x << shift) as i64) >> shift)
}

fn be_f64(value: &[u8]) -> Result<f64> {
    let bytes: [u8; 8] = value
        .try_into()
        .map_err(|_| ProtocolError::InvalidMapping(format!("double item of {} bytes", value.len())))?;
    Ok(f64::from_be_bytes(bytes))
}
