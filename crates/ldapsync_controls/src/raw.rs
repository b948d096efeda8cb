//! Fallback for controls without a typed variant.

use crate::control::control_packet;
use ldapsync_ber::Packet;
use std::fmt;

/// A control kept as its OID and raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawControl {
    /// Control type OID.
    pub control_type: String,
    /// Criticality flag.
    pub criticality: bool,
    /// Value octets, if the control had a value.
    pub value: Option<Vec<u8>>,
}

impl RawControl {
    /// Creates a control.
    pub fn new(control_type: impl Into<String>, criticality: bool, value: Option<Vec<u8>>) -> Self {
        Self {
            control_type: control_type.into(),
            criticality,
            value,
        }
    }

    /// Encodes the control with its value bytes unchanged.
    pub fn encode(&self) -> Packet {
        let value = self
            .value
            .as_ref()
            .map(|v| Packet::octet_string(v.clone(), "Control Value"));
        control_packet(&self.control_type, self.criticality, value)
    }

    pub(crate) fn decode(
        control_type: String,
        criticality: bool,
        value: Option<&mut Packet>,
    ) -> Self {
        Self {
            control_type,
            criticality,
            value: value.map(|v| v.content_bytes()),
        }
    }
}

impl fmt::Display for RawControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: {}  Control Value: ",
            "Generic",
            self.control_type,
            self.criticality
        )?;
        match &self.value {
            Some(value) => write!(f, "{:?}", String::from_utf8_lossy(value)),
            None => f.write_str("none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::decode_control_bytes;
    use crate::Control;

    #[test]
    fn unknown_oid_preserves_value_bytes() {
        let value = vec![0x30, 0x03, 0x02, 0x01, 0x05];
        let raw = RawControl::new("1.3.6.1.4.1.99999.1", false, Some(value.clone()));
        let decoded = decode_control_bytes(&raw.encode().encode()).unwrap();
        assert_eq!(decoded.oid(), "1.3.6.1.4.1.99999.1");
        assert_eq!(decoded, Control::Raw(raw));
    }

    #[test]
    fn display_marks_missing_value() {
        let raw = RawControl::new("1.2.3", true, None);
        assert!(raw.to_string().ends_with("none"));
    }
}
