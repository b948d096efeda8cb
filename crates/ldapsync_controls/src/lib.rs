//! # ldapsync Controls
//!
//! Typed LDAP controls (RFC 4511 §4.1.11) and their BER codec.
//!
//! This crate provides:
//! - A static registry of supported control OIDs
//! - The [`Control`] sum type with one variant per supported control
//! - Encode/decode of the `Control` envelope and each control value
//! - Typed lookup helpers ([`find_control`], [`expect_control`])
//!
//! Controls with an unregistered OID decode to [`RawControl`], which keeps
//! the OID and value bytes unchanged, so decoding never fails just because
//! a server sent something unfamiliar.
//!
//! ## Usage
//!
//! ```
//! use ldapsync_controls::{decode_control_bytes, DirSyncControl};
//!
//! let request = DirSyncControl::new(0, 1000, Vec::new());
//! let bytes = request.encode().encode();
//!
//! let control = decode_control_bytes(&bytes).unwrap();
//! let decoded = control.downcast_ref::<DirSyncControl>().unwrap();
//! assert_eq!(decoded.max_attribute_count, 1000);
//! ```
//!
//! This is a pure codec crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change_notify;
mod content_sync;
mod control;
pub mod dirsync;
mod error;
pub mod oid;
mod paging;
mod password_change;
mod password_policy;
mod raw;
pub mod registry;
mod show_deleted;

pub use change_notify::ChangeNotifyControl;
pub use content_sync::{
    ContentSyncControl, ContentSyncDoneControl, ContentSyncMode, ContentSyncStateControl,
    EntryState,
};
pub use control::{
    decode_control, decode_control_bytes, decode_controls, encode_controls, expect_control,
    expect_control_mut, find_control, Control, ControlVariant,
};
pub use dirsync::{DirSyncControl, DirSyncExControl};
pub use error::{ControlError, ControlResult};
pub use paging::PagingControl;
pub use password_change::{PasswordMustChangeControl, PasswordWarningControl};
pub use password_policy::{behera_error_string, BeheraPasswordPolicyControl};
pub use raw::RawControl;
pub use registry::{control_type_name, ControlKind, ControlType, CONTROL_TYPES};
pub use show_deleted::ShowDeletedControl;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
