//! Simple paged results control (RFC 2696).

use crate::control::{bytes_at, control_packet, control_value, integer_at, nested_sequence};
use crate::error::{ControlError, ControlResult};
use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::Packet;
use std::fmt;

const NAME: &str = "Paging";

/// Requests results in pages of `paging_size` entries.
///
/// The server answers each page with the same control carrying a cookie;
/// sending that cookie back requests the next page. An empty cookie from
/// the server means the last page was delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingControl {
    /// Requested page size, or the server's size estimate in responses.
    pub paging_size: u32,
    /// Opaque continuation cookie.
    pub cookie: Vec<u8>,
}

impl PagingControl {
    /// Creates a first-page request.
    pub fn new(paging_size: u32) -> Self {
        Self {
            paging_size,
            cookie: Vec::new(),
        }
    }

    /// Replaces the continuation cookie.
    pub fn set_cookie(&mut self, cookie: Vec<u8>) {
        self.cookie = cookie;
    }

    /// Encodes the control.
    pub fn encode(&self) -> Packet {
        let seq = Packet::sequence("Search Control Value")
            .with_child(Packet::integer(i64::from(self.paging_size), "Paging Size"))
            .with_child(Packet::octet_string(self.cookie.clone(), "Cookie"));
        control_packet(oid::PAGING, false, Some(control_value(NAME, seq)))
    }

    pub(crate) fn decode(value: Option<&mut Packet>) -> ControlResult<Self> {
        let value = value.ok_or_else(|| ControlError::malformed(NAME, "missing value"))?;
        let seq = nested_sequence(value, NAME, NAME)?;
        seq.description = "Search Control Value".to_string();

        let size = integer_at(seq, 0, NAME, "Paging Size")?;
        let paging_size = u32::try_from(size).map_err(|_| {
            ControlError::malformed(NAME, format!("paging size {size} out of range"))
        })?;
        let cookie = bytes_at(seq, 1, NAME, "Cookie")?;

        Ok(Self {
            paging_size,
            cookie,
        })
    }
}

impl fmt::Display for PagingControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: false  PagingSize: {}  Cookie: {:?}",
            control_type_name(oid::PAGING).unwrap_or(NAME),
            oid::PAGING,
            self.paging_size,
            String::from_utf8_lossy(&self.cookie)
        )
    }
}
