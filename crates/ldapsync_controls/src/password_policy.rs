//! Password policy response control (draft-behera-ldap-password-policy).
//!
//! ```text
//! PasswordPolicyResponseValue ::= SEQUENCE {
//!     warning [0] CHOICE {
//!         timeBeforeExpiration [0] INTEGER (0 .. maxInt),
//!         graceAuthNsRemaining [1] INTEGER (0 .. maxInt) } OPTIONAL,
//!     error   [1] ENUMERATED { ... } OPTIONAL }
//! ```

use crate::control::{control_packet, nested_sequence};
use crate::error::ControlResult;
use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::Packet;
use std::fmt;

const NAME: &str = "Password Policy - Behera";

/// Maps a password policy error code to its message.
pub fn behera_error_string(code: i8) -> Option<&'static str> {
    let message = match code {
        0 => "Password expired",
        1 => "Account locked",
        2 => "Password must be changed",
        3 => "Policy prevents password modification",
        4 => "Policy requires old password in order to change password",
        5 => "Password fails quality checks",
        6 => "Password is too short for policy",
        7 => "Password has been changed too recently",
        8 => "New password is in list of old passwords",
        _ => return None,
    };
    Some(message)
}

/// Password policy state returned after a bind or password change.
///
/// Absent fields stay at -1. The request form carries no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeheraPasswordPolicyControl {
    /// Seconds until the password expires, or -1.
    pub expire: i64,
    /// Grace logins remaining, or -1.
    pub grace: i64,
    /// Error code, or -1.
    pub error: i8,
    /// Message for `error`, empty when unknown.
    pub error_string: String,
}

impl BeheraPasswordPolicyControl {
    /// Creates the request control.
    pub fn new() -> Self {
        Self {
            expire: -1,
            grace: -1,
            error: -1,
            error_string: String::new(),
        }
    }

    /// Encodes the request control (type only, no value).
    pub fn encode(&self) -> Packet {
        control_packet(oid::BEHERA_PASSWORD_POLICY, false, None)
    }

    pub(crate) fn decode(value: Option<&mut Packet>) -> ControlResult<Self> {
        let mut control = Self::new();
        let Some(value) = value else {
            return Ok(control);
        };
        if value.data.is_empty() && value.children.is_empty() {
            return Ok(control);
        }

        let seq = nested_sequence(value, NAME, NAME)?;
        seq.description = "Password Policy Response".to_string();

        for child in &mut seq.children {
            if child.is_context(0) {
                child.description = "Warning".to_string();
                let Some(warning) = child.children.first_mut() else {
                    continue;
                };
                let Some(val) = warning.as_integer() else {
                    continue;
                };
                if warning.is_context(0) {
                    warning.description = "Time Before Expiration".to_string();
                    control.expire = val;
                } else if warning.is_context(1) {
                    warning.description = "Grace Logins Remaining".to_string();
                    control.grace = val;
                }
            } else if child.is_context(1) {
                child.description = "Error".to_string();
                control.error = child
                    .as_integer()
                    .and_then(|code| i8::try_from(code).ok())
                    .unwrap_or(-1);
                control.error_string = behera_error_string(control.error)
                    .unwrap_or_default()
                    .to_string();
            }
        }

        Ok(control)
    }
}

impl Default for BeheraPasswordPolicyControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BeheraPasswordPolicyControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?})  Criticality: false  Expire: {}  Grace: {}  Error: {}, \
             ErrorString: {}",
            control_type_name(oid::BEHERA_PASSWORD_POLICY).unwrap_or(NAME),
            oid::BEHERA_PASSWORD_POLICY,
            self.expire,
            self.grace,
            self.error,
            self.error_string
        )
    }
}
