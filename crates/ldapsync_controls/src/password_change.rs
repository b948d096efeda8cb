//! Netscape password expiration controls (draft-vchu-ldap-pwd-policy).
//!
//! Both controls are response-only and have no request encoding.

use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::Packet;
use std::fmt;
use tracing::warn;

/// The server requires the password to be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordMustChangeControl {
    /// Set whenever the control is present.
    pub must_change: bool,
}

impl PasswordMustChangeControl {
    pub(crate) fn decode(_value: Option<&mut Packet>) -> Self {
        Self { must_change: true }
    }
}

impl fmt::Display for PasswordMustChangeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: false  MustChange: {}",
            control_type_name(oid::VCHU_PASSWORD_MUST_CHANGE).unwrap_or_default(),
            oid::VCHU_PASSWORD_MUST_CHANGE,
            self.must_change
        )
    }
}

/// Seconds until the password expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordWarningControl {
    /// Seconds until expiry, or -1 when the server's value was unreadable.
    pub expire: i64,
}

impl Default for PasswordWarningControl {
    fn default() -> Self {
        Self { expire: -1 }
    }
}

impl PasswordWarningControl {
    /// Parses the decimal string value. Unparseable input leaves `expire` at -1.
    pub(crate) fn decode(value: Option<&mut Packet>) -> Self {
        let mut control = Self::default();
        let Some(value) = value else {
            warn!("password expiry warning without a value");
            return control;
        };
        value.description = "Control Value (Password Expiry Warning)".to_string();

        let text = String::from_utf8_lossy(&value.content_bytes()).into_owned();
        match text.trim().parse::<i64>() {
            Ok(expire) => control.expire = expire,
            Err(err) => warn!(value = %text, error = %err, "unreadable password expiry warning"),
        }
        control
    }
}

impl fmt::Display for PasswordWarningControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: false  Expire: {}",
            control_type_name(oid::VCHU_PASSWORD_WARNING).unwrap_or_default(),
            oid::VCHU_PASSWORD_WARNING,
            self.expire
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{control_packet, decode_control_bytes};
    use crate::Control;

    fn warning_bytes(value: &[u8]) -> Vec<u8> {
        control_packet(
            oid::VCHU_PASSWORD_WARNING,
            false,
            Some(Packet::octet_string(value.to_vec(), "")),
        )
        .encode()
    }

    #[test]
    fn must_change_is_set_on_decode() {
        let bytes = control_packet(
            oid::VCHU_PASSWORD_MUST_CHANGE,
            false,
            Some(Packet::string("0", "")),
        )
        .encode();
        assert_eq!(
            decode_control_bytes(&bytes).unwrap(),
            Control::PasswordMustChange(PasswordMustChangeControl { must_change: true })
        );
    }

    #[test]
    fn warning_parses_seconds() {
        assert_eq!(
            decode_control_bytes(&warning_bytes(b"86400")).unwrap(),
            Control::PasswordWarning(PasswordWarningControl { expire: 86400 })
        );
    }

    #[test]
    fn unparseable_warning_keeps_sentinel() {
        assert_eq!(
            decode_control_bytes(&warning_bytes(b"soon")).unwrap(),
            Control::PasswordWarning(PasswordWarningControl { expire: -1 })
        );
    }

    #[test]
    fn response_only_controls_have_no_encoding() {
        assert!(Control::from(PasswordWarningControl::default())
            .encode()
            .is_none());
        assert!(Control::from(PasswordMustChangeControl::default())
            .encode()
            .is_none());
    }
}
