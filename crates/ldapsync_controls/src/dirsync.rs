//! Active Directory DirSync controls.
//!
//! ```text
//! DirSyncRequestValue ::= SEQUENCE {
//!     Flags              INTEGER,
//!     MaxAttributeCount  INTEGER,
//!     Cookie             OCTET STRING }
//! ```
//!
//! The response value has the same shape; its cookie resumes the next
//! round.

use crate::control::{bytes_at, control_packet, control_value, integer_at, nested_sequence};
use crate::error::{ControlError, ControlResult};
use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::Packet;
use std::fmt;

/// Return security descriptors readable by the caller without replication rights.
pub const OBJECT_SECURITY: u64 = 0x0000_0001;
/// Return parents before children.
pub const ANCESTORS_FIRST_ORDER: u64 = 0x0000_0800;
/// Omit secret attributes.
pub const PUBLIC_DATA_ONLY: u64 = 0x0000_2000;
/// Return only changed values of multi-valued attributes.
pub const INCREMENTAL_VALUES: u64 = 0x8000_0000;

const NAME: &str = "DIRSYNC";

/// DirSync request and response control.
///
/// The same instance is reused across polling rounds: each response cookie
/// is written back with [`set_cookie`](Self::set_cookie) before the next
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSyncControl {
    /// Criticality flag, true for new requests.
    pub criticality: bool,
    /// Combination of the flag constants in this module.
    pub flags: u64,
    /// Upper bound on attribute values returned per round.
    pub max_attribute_count: u64,
    /// Resume cookie, empty on the first round.
    pub cookie: Vec<u8>,
}

impl DirSyncControl {
    /// Creates a critical request.
    pub fn new(flags: u64, max_attribute_count: u64, cookie: Vec<u8>) -> Self {
        Self {
            criticality: true,
            flags,
            max_attribute_count,
            cookie,
        }
    }

    /// Replaces the resume cookie.
    pub fn set_cookie(&mut self, cookie: Vec<u8>) {
        self.cookie = cookie;
    }

    /// Encodes the control.
    pub fn encode(&self) -> Packet {
        let seq = Packet::sequence("DIRSYNC Control Value")
            .with_child(Packet::integer(self.flags as i64, "Flags"))
            .with_child(Packet::integer(
                self.max_attribute_count as i64,
                "MaxAttributeCount",
            ))
            .with_child(Packet::octet_string(self.cookie.clone(), "Cookie"));
        control_packet(
            oid::DIRSYNC,
            self.criticality,
            Some(control_value(NAME, seq)),
        )
    }

    pub(crate) fn decode(criticality: bool, value: Option<&mut Packet>) -> ControlResult<Self> {
        let value = value.ok_or_else(|| ControlError::malformed(NAME, "missing value"))?;
        let seq = nested_sequence(value, NAME, NAME)?;
        seq.description = "Search Control Value".to_string();
        if seq.children.len() != 3 {
            return Err(ControlError::malformed(
                NAME,
                format!("expected 3 elements, found {}", seq.children.len()),
            ));
        }

        let flags = integer_at(seq, 0, NAME, "Flags")? as u64;
        let max_attribute_count = integer_at(seq, 1, NAME, "MaxAttributeCount")? as u64;
        let cookie = bytes_at(seq, 2, NAME, "Cookie")?;

        Ok(Self {
            criticality,
            flags,
            max_attribute_count,
            cookie,
        })
    }
}

impl fmt::Display for DirSyncControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?}) Criticality:{} Flags:{} MaxAttributeCount:{} Cookie:{}",
            control_type_name(oid::DIRSYNC).unwrap_or(NAME),
            oid::DIRSYNC,
            self.criticality,
            self.flags,
            self.max_attribute_count,
            hex::encode(&self.cookie)
        )
    }
}

const EX_NAME: &str = "DIRSYNC EX";

/// Extended DN control sent with DirSync requests. Always critical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirSyncExControl {
    /// Extended DN format flag.
    pub flag: u64,
}

impl DirSyncExControl {
    /// Creates the control.
    pub fn new(flag: u64) -> Self {
        Self { flag }
    }

    /// Encodes the control.
    pub fn encode(&self) -> Packet {
        let seq = Packet::sequence("Search Control Value")
            .with_child(Packet::integer(self.flag as i64, "Flag"));
        control_packet(oid::DIRSYNC_EX, true, Some(control_value(EX_NAME, seq)))
    }

    pub(crate) fn decode(value: Option<&mut Packet>) -> ControlResult<Self> {
        let value = value.ok_or_else(|| ControlError::malformed(EX_NAME, "missing value"))?;
        let seq = nested_sequence(value, EX_NAME, EX_NAME)?;
        let flag = integer_at(seq, 0, EX_NAME, "Flag")? as u64;
        Ok(Self { flag })
    }
}

impl fmt::Display for DirSyncExControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: true Flag: {}",
            control_type_name(oid::DIRSYNC_EX).unwrap_or(EX_NAME),
            oid::DIRSYNC_EX,
            self.flag
        )
    }
}
