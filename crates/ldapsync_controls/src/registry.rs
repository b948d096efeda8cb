//! The control type registry.
//!
//! A fixed table mapping each supported OID to its variant and a
//! human-readable name. The table is static data; nothing registers into
//! it at runtime.

use crate::oid;
use std::fmt;

/// Discriminant of [`Control`](crate::Control).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Simple paged results.
    Paging,
    /// Behera password policy.
    BeheraPasswordPolicy,
    /// Netscape password must change.
    PasswordMustChange,
    /// Netscape password expiry warning.
    PasswordWarning,
    /// AD change notification.
    ChangeNotify,
    /// Content sync request.
    ContentSync,
    /// Content sync per-entry state.
    ContentSyncState,
    /// Content sync done.
    ContentSyncDone,
    /// AD DirSync.
    DirSync,
    /// AD DirSync extended DN.
    DirSyncEx,
    /// AD show deleted.
    ShowDeleted,
    /// Any control without a typed variant.
    Raw,
}

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlType {
    /// Control OID.
    pub oid: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Variant decoded for this OID.
    pub kind: ControlKind,
}

/// Every control with a typed variant.
pub static CONTROL_TYPES: [ControlType; 11] = [
    ControlType {
        oid: oid::PAGING,
        name: "Paging",
        kind: ControlKind::Paging,
    },
    ControlType {
        oid: oid::BEHERA_PASSWORD_POLICY,
        name: "Password Policy - Behera Draft",
        kind: ControlKind::BeheraPasswordPolicy,
    },
    ControlType {
        oid: oid::VCHU_PASSWORD_MUST_CHANGE,
        name: "Password Must Change",
        kind: ControlKind::PasswordMustChange,
    },
    ControlType {
        oid: oid::VCHU_PASSWORD_WARNING,
        name: "Password Expiry Warning",
        kind: ControlKind::PasswordWarning,
    },
    ControlType {
        oid: oid::CHANGE_NOTIFY,
        name: "Change Notification",
        kind: ControlKind::ChangeNotify,
    },
    ControlType {
        oid: oid::CONTENT_SYNC,
        name: "Content Sync",
        kind: ControlKind::ContentSync,
    },
    ControlType {
        oid: oid::CONTENT_SYNC_STATE,
        name: "Sync State",
        kind: ControlKind::ContentSyncState,
    },
    ControlType {
        oid: oid::CONTENT_SYNC_DONE,
        name: "Sync Done",
        kind: ControlKind::ContentSyncDone,
    },
    ControlType {
        oid: oid::DIRSYNC,
        name: "DIRSYNC",
        kind: ControlKind::DirSync,
    },
    ControlType {
        oid: oid::DIRSYNC_EX,
        name: "DIRSYNC EX",
        kind: ControlKind::DirSyncEx,
    },
    ControlType {
        oid: oid::SHOW_DELETED,
        name: "Deleted",
        kind: ControlKind::ShowDeleted,
    },
];

/// Looks up the registry row for an OID.
pub fn lookup(oid: &str) -> Option<&'static ControlType> {
    CONTROL_TYPES.iter().find(|t| t.oid == oid)
}

/// Returns the display name registered for an OID.
pub fn control_type_name(oid: &str) -> Option<&'static str> {
    lookup(oid).map(|t| t.name)
}

impl ControlKind {
    /// Returns the variant decoded for `oid`, or [`ControlKind::Raw`].
    pub fn from_oid(oid: &str) -> Self {
        lookup(oid).map_or(ControlKind::Raw, |t| t.kind)
    }

    /// Returns the OID of a typed variant. `Raw` has none.
    pub fn oid(self) -> Option<&'static str> {
        self.row().map(|t| t.oid)
    }

    /// Returns the registered display name.
    pub fn name(self) -> &'static str {
        self.row().map_or("Generic", |t| t.name)
    }

    fn row(self) -> Option<&'static ControlType> {
        CONTROL_TYPES.iter().find(|t| t.kind == self)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Description used for the control type child of a packet.
pub(crate) fn type_description(oid: &str) -> String {
    format!("Control Type ({})", control_type_name(oid).unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn oids_are_unique() {
        let oids: HashSet<_> = CONTROL_TYPES.iter().map(|t| t.oid).collect();
        assert_eq!(oids.len(), CONTROL_TYPES.len());
    }

    #[test]
    fn kinds_round_trip_through_oid() {
        for row in &CONTROL_TYPES {
            assert_eq!(ControlKind::from_oid(row.oid), row.kind);
            assert_eq!(row.kind.oid(), Some(row.oid));
            assert_eq!(row.kind.name(), row.name);
        }
    }

    #[test]
    fn unknown_oid_is_raw() {
        assert_eq!(ControlKind::from_oid("1.2.3.4"), ControlKind::Raw);
        assert_eq!(ControlKind::Raw.oid(), None);
        assert_eq!(control_type_name("1.2.3.4"), None);
    }

    #[test]
    fn names_match_wire_conventions() {
        assert_eq!(control_type_name(oid::DIRSYNC), Some("DIRSYNC"));
        assert_eq!(control_type_name(oid::CONTENT_SYNC_STATE), Some("Sync State"));
        assert_eq!(
            type_description(oid::PAGING),
            "Control Type (Paging)".to_string()
        );
    }
}
