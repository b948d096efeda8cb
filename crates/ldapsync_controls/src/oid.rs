//! Control type OIDs.

/// Simple paged results (RFC 2696).
pub const PAGING: &str = "1.2.840.113556.1.4.319";
/// Password policy response (draft-behera-ldap-password-policy).
pub const BEHERA_PASSWORD_POLICY: &str = "1.3.6.1.4.1.42.2.27.8.5.1";
/// Netscape password expired ("must change").
pub const VCHU_PASSWORD_MUST_CHANGE: &str = "2.16.840.1.113730.3.4.4";
/// Netscape password expiring (seconds until expiry).
pub const VCHU_PASSWORD_WARNING: &str = "2.16.840.1.113730.3.4.5";

/// Active Directory change notification.
pub const CHANGE_NOTIFY: &str = "1.2.840.113556.1.4.528";

/// Content synchronization request (RFC 4533).
pub const CONTENT_SYNC: &str = "1.3.6.1.4.1.4203.1.9.1.1";
/// Per-entry sync state (RFC 4533).
pub const CONTENT_SYNC_STATE: &str = "1.3.6.1.4.1.4203.1.9.1.2";
/// Sync done, attached to the final search result (RFC 4533).
pub const CONTENT_SYNC_DONE: &str = "1.3.6.1.4.1.4203.1.9.1.3";
/// Sync info intermediate response name (RFC 4533).
pub const CONTENT_SYNC_INFO: &str = "1.3.6.1.4.1.4203.1.9.1.4";

/// Active Directory DirSync.
pub const DIRSYNC: &str = "1.2.840.113556.1.4.841";
/// Active Directory extended DN, sent alongside DirSync.
pub const DIRSYNC_EX: &str = "1.2.840.113556.1.4.529";
/// Active Directory show deleted objects.
pub const SHOW_DELETED: &str = "1.2.840.113556.1.4.417";
