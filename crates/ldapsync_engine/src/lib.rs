//! # ldapsync Engine
//!
//! Directory synchronization sessions built on typed LDAP controls.
//!
//! This crate provides:
//! - RFC 4533 Content Sync ([`ContentSync`]): a persistent search that
//!   reports each entry with its UUID and change state, plus resume cookies
//! - Active Directory DirSync ([`DirSync`]): a polling loop that hands each
//!   batch of changes and its cookie to a callback
//! - The [`Searcher`] capability both engines run on, and a scripted
//!   [`MockSearcher`] for tests
//! - Cooperative cancellation ([`CancelToken`])
//!
//! ## Session model
//!
//! Both engines are synchronous. Every search and callback runs on the
//! caller's thread, in server order. An error from the searcher, a
//! malformed control, or a callback ends the session; nothing is retried
//! internally. Callers resume by saving the cookie only after a callback
//! for it succeeded and starting a new session with it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod content_sync;
mod dirsync;
mod error;
mod search;

pub use cancel::CancelToken;
pub use config::{ContentSyncConfig, DirSyncConfig};
pub use content_sync::{content_sync_request, ContentSync};
pub use dirsync::{dirsync_request, DirSync, DirSyncStats};
pub use error::{CallbackError, CallbackResult, SyncError, SyncResult};
pub use search::{
    DerefAliases, MockSearcher, Scope, SearchEntry, SearchEvent, SearchRequest, SearchResult,
    Searcher,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
