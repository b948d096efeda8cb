//! Active Directory change notification control.

use crate::control::{control_packet, control_value, nested_sequence};
use crate::error::ControlResult;
use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::{tag, Packet};
use std::fmt;

const NAME: &str = "Change Notification";

/// Requests a persistent search that reports changes as they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotifyControl {
    /// Criticality flag, true by default.
    pub criticality: bool,
    /// Opaque cookie.
    pub cookie: Vec<u8>,
}

impl ChangeNotifyControl {
    /// Creates a critical control with no cookie.
    pub fn new() -> Self {
        Self {
            criticality: true,
            cookie: Vec::new(),
        }
    }

    /// Replaces the cookie.
    pub fn set_cookie(&mut self, cookie: Vec<u8>) {
        self.cookie = cookie;
    }

    /// Encodes the control.
    pub fn encode(&self) -> Packet {
        let seq = Packet::sequence("Search Control Value")
            .with_child(Packet::octet_string(self.cookie.clone(), "Cookie"));
        control_packet(
            oid::CHANGE_NOTIFY,
            self.criticality,
            Some(control_value(NAME, seq)),
        )
    }

    pub(crate) fn decode(criticality: bool, value: Option<&mut Packet>) -> ControlResult<Self> {
        let mut control = Self {
            criticality,
            cookie: Vec::new(),
        };
        let Some(value) = value else {
            return Ok(control);
        };
        let seq = nested_sequence(value, NAME, NAME)?;
        seq.description = "Search Control Value".to_string();
        if let Some(cookie) = seq
            .children
            .first_mut()
            .filter(|c| c.is_universal(tag::OCTET_STRING))
        {
            cookie.description = "Cookie".to_string();
            control.cookie = cookie.content_bytes();
        }
        Ok(control)
    }
}

impl Default for ChangeNotifyControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChangeNotifyControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: {}  Cookie: {:?}",
            control_type_name(oid::CHANGE_NOTIFY).unwrap_or(NAME),
            oid::CHANGE_NOTIFY,
            self.criticality,
            String::from_utf8_lossy(&self.cookie)
        )
    }
}
