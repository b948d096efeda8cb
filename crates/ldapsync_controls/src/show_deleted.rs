//! Active Directory show deleted objects control.

use crate::control::control_packet;
use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::Packet;
use std::fmt;

/// Includes tombstoned objects in search results. Carries no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowDeletedControl {
    /// Criticality flag, true by default.
    pub criticality: bool,
}

impl ShowDeletedControl {
    /// Creates a critical control.
    pub fn new() -> Self {
        Self { criticality: true }
    }

    /// Encodes the control.
    pub fn encode(&self) -> Packet {
        control_packet(oid::SHOW_DELETED, self.criticality, None)
    }

    pub(crate) fn decode(criticality: bool) -> Self {
        Self { criticality }
    }
}

impl Default for ShowDeletedControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShowDeletedControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: {}",
            control_type_name(oid::SHOW_DELETED).unwrap_or_default(),
            oid::SHOW_DELETED,
            self.criticality
        )
    }
}
