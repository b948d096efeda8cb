//! Content synchronization controls (RFC 4533).
//!
//! ```text
//! syncRequestValue ::= SEQUENCE {
//!     mode ENUMERATED { refreshOnly (1), refreshAndPersist (3) },
//!     cookie     syncCookie OPTIONAL,
//!     reloadHint BOOLEAN DEFAULT FALSE }
//!
//! syncStateValue ::= SEQUENCE {
//!     state ENUMERATED { present (0), add (1), modify (2), delete (3) },
//!     entryUUID syncUUID,
//!     cookie    syncCookie OPTIONAL }
//!
//! syncDoneValue ::= SEQUENCE {
//!     cookie          syncCookie OPTIONAL,
//!     refreshDeletes  BOOLEAN DEFAULT FALSE }
//! ```

use crate::control::{bytes_at, control_packet, control_value, integer_at, nested_sequence};
use crate::error::{ControlError, ControlResult};
use crate::oid;
use crate::registry::control_type_name;
use ldapsync_ber::{tag, Packet};
use std::fmt;
use uuid::Uuid;

/// Content sync request mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentSyncMode {
    /// Synchronize once and end the search.
    RefreshOnly,
    /// Synchronize, then keep the search open for live changes.
    #[default]
    RefreshAndPersist,
}

impl ContentSyncMode {
    /// Returns the wire value.
    pub fn code(self) -> i64 {
        match self {
            ContentSyncMode::RefreshOnly => 1,
            ContentSyncMode::RefreshAndPersist => 3,
        }
    }

    /// Parses a wire value.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ContentSyncMode::RefreshOnly),
            3 => Some(ContentSyncMode::RefreshAndPersist),
            _ => None,
        }
    }
}

impl fmt::Display for ContentSyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSyncMode::RefreshOnly => f.write_str("refreshOnly"),
            ContentSyncMode::RefreshAndPersist => f.write_str("refreshAndPersist"),
        }
    }
}

/// The sync request control. Always sent critical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSyncControl {
    /// Request mode.
    pub mode: ContentSyncMode,
    /// Resume cookie from a previous session.
    pub cookie: Option<Vec<u8>>,
    /// Asks the server to skip the full reload when resuming.
    pub reload_hint: bool,
}

const SYNC_NAME: &str = "Content Sync";

impl ContentSyncControl {
    /// Creates a request. An empty cookie counts as no cookie; `reload_hint`
    /// is set exactly when a cookie is supplied.
    pub fn new(mode: ContentSyncMode, cookie: Option<Vec<u8>>) -> Self {
        let cookie = cookie.filter(|c| !c.is_empty());
        Self {
            mode,
            reload_hint: cookie.is_some(),
            cookie,
        }
    }

    /// Replaces the resume cookie.
    pub fn set_cookie(&mut self, cookie: Vec<u8>) {
        self.cookie = Some(cookie).filter(|c| !c.is_empty());
        self.reload_hint = self.cookie.is_some();
    }

    /// Encodes the control. The cookie is always present, empty when unset.
    pub fn encode(&self) -> Packet {
        let cookie = self.cookie.clone().unwrap_or_default();
        let seq = Packet::sequence("Content Sync Control Value")
            .with_child(Packet::enumerated(self.mode.code(), "Mode"))
            .with_child(Packet::octet_string(cookie, "Cookie"))
            .with_child(Packet::boolean(self.reload_hint, "ReloadHint"));
        control_packet(oid::CONTENT_SYNC, true, Some(control_value(SYNC_NAME, seq)))
    }

    pub(crate) fn decode(value: Option<&mut Packet>) -> ControlResult<Self> {
        let value = value.ok_or_else(|| ControlError::malformed(SYNC_NAME, "missing value"))?;
        let seq = nested_sequence(value, SYNC_NAME, SYNC_NAME)?;
        seq.description = "Content Sync Control Value".to_string();

        let code = integer_at(seq, 0, SYNC_NAME, "Mode")?;
        let mode = ContentSyncMode::from_code(code)
            .ok_or_else(|| ControlError::malformed(SYNC_NAME, format!("unknown mode {code}")))?;

        let mut control = Self {
            mode,
            cookie: None,
            reload_hint: false,
        };
        for child in seq.children.iter_mut().skip(1) {
            if child.is_universal(tag::OCTET_STRING) {
                child.description = "Cookie".to_string();
                control.cookie = Some(child.content_bytes()).filter(|c| !c.is_empty());
            } else if child.is_universal(tag::BOOLEAN) {
                child.description = "ReloadHint".to_string();
                control.reload_hint = child.as_bool().unwrap_or(false);
            }
        }
        Ok(control)
    }
}

impl fmt::Display for ContentSyncControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?}) Criticality:true Mode:{} ReloadHint:{} Cookie:{}",
            control_type_name(oid::CONTENT_SYNC).unwrap_or(SYNC_NAME),
            oid::CONTENT_SYNC,
            self.mode,
            self.reload_hint,
            String::from_utf8_lossy(self.cookie.as_deref().unwrap_or_default())
        )
    }
}

/// Change reported for an entry by a sync state control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryState {
    /// Unchanged entry that is still present (refresh phase).
    #[default]
    Present,
    /// New entry.
    Add,
    /// Modified entry.
    Modify,
    /// Deleted entry.
    Delete,
}

impl EntryState {
    /// Returns the wire value.
    pub fn code(self) -> i64 {
        match self {
            EntryState::Present => 0,
            EntryState::Add => 1,
            EntryState::Modify => 2,
            EntryState::Delete => 3,
        }
    }

    /// Parses a wire value.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(EntryState::Present),
            1 => Some(EntryState::Add),
            2 => Some(EntryState::Modify),
            3 => Some(EntryState::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryState::Present => "present",
            EntryState::Add => "add",
            EntryState::Modify => "modify",
            EntryState::Delete => "delete",
        };
        f.write_str(name)
    }
}

const STATE_NAME: &str = "Sync State";

/// Per-entry sync state attached to search result entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSyncStateControl {
    /// What happened to the entry.
    pub state: EntryState,
    /// The server's stable entry identifier (syncUUID).
    pub uuid: Vec<u8>,
    /// Resume cookie, carried by some entries only.
    pub cookie: Option<Vec<u8>>,
}

impl ContentSyncStateControl {
    /// Returns the entry UUID when it is exactly 16 bytes.
    pub fn entry_uuid(&self) -> Option<Uuid> {
        Uuid::from_slice(&self.uuid).ok()
    }

    /// Encodes the control.
    pub fn encode(&self) -> Packet {
        let mut seq = Packet::sequence("Search Control Value")
            .with_child(Packet::enumerated(self.state.code(), "State"))
            .with_child(Packet::octet_string(self.uuid.clone(), "UUID"));
        if let Some(cookie) = &self.cookie {
            seq.push(Packet::octet_string(cookie.clone(), "Cookie"));
        }
        control_packet(
            oid::CONTENT_SYNC_STATE,
            false,
            Some(control_value(STATE_NAME, seq)),
        )
    }

    /// A control without a value decodes to the defaults.
    pub(crate) fn decode(value: Option<&mut Packet>) -> ControlResult<Self> {
        let mut control = Self::default();
        let Some(value) = value else {
            return Ok(control);
        };
        if value.data.is_empty() && value.children.is_empty() {
            return Ok(control);
        }

        let seq = nested_sequence(value, STATE_NAME, STATE_NAME)?;
        let code = integer_at(seq, 0, STATE_NAME, "Entry State")?;
        control.state = EntryState::from_code(code).ok_or(ControlError::InvalidEntryState(code))?;
        control.uuid = bytes_at(seq, 1, STATE_NAME, "Entry UUID")?;
        if seq.children.len() > 2 {
            control.cookie = Some(bytes_at(seq, 2, STATE_NAME, "Cookie")?);
        }
        Ok(control)
    }
}

impl fmt::Display for ContentSyncStateControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?}) State: {} Uuid: {}  Cookie: {}",
            control_type_name(oid::CONTENT_SYNC_STATE).unwrap_or(STATE_NAME),
            oid::CONTENT_SYNC_STATE,
            self.state,
            hex::encode(&self.uuid),
            hex::encode(self.cookie.as_deref().unwrap_or_default())
        )
    }
}

const DONE_NAME: &str = "Sync Done";

/// Attached to the final search result of a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSyncDoneControl {
    /// Resume cookie for the next session.
    pub cookie: Option<Vec<u8>>,
    /// Deleted entries were sent as delete states rather than implied by
    /// absence of present states.
    pub refresh_deletes: bool,
}

impl ContentSyncDoneControl {
    /// Encodes the control. `refresh_deletes` is omitted when false.
    pub fn encode(&self) -> Packet {
        let mut seq = Packet::sequence("Sync Done Value");
        if let Some(cookie) = &self.cookie {
            seq.push(Packet::octet_string(cookie.clone(), "Cookie"));
        }
        if self.refresh_deletes {
            seq.push(Packet::boolean(true, "RefreshDeletes"));
        }
        control_packet(
            oid::CONTENT_SYNC_DONE,
            false,
            Some(control_value(DONE_NAME, seq)),
        )
    }

    pub(crate) fn decode(value: Option<&mut Packet>) -> ControlResult<Self> {
        let mut control = Self::default();
        let Some(value) = value else {
            return Ok(control);
        };
        let seq = nested_sequence(value, DONE_NAME, DONE_NAME)?;
        seq.description = "Sync Done Value".to_string();
        for child in &mut seq.children {
            if child.is_universal(tag::OCTET_STRING) {
                child.description = "Cookie".to_string();
                control.cookie = Some(child.content_bytes());
            } else if child.is_universal(tag::BOOLEAN) {
                child.description = "RefreshDeletes".to_string();
                control.refresh_deletes = child.as_bool().unwrap_or(false);
            } else {
                return Err(ControlError::malformed(
                    DONE_NAME,
                    format!("unexpected element with tag {}", child.tag),
                ));
            }
        }
        Ok(control)
    }
}

impl fmt::Display for ContentSyncDoneControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Control Type: {} ({:?}) RefreshDeletes: {} Cookie: {}",
            control_type_name(oid::CONTENT_SYNC_DONE).unwrap_or(DONE_NAME),
            oid::CONTENT_SYNC_DONE,
            self.refresh_deletes,
            hex::encode(self.cookie.as_deref().unwrap_or_default())
        )
    }
}
