//! Configuration for the sync engines.

use crate::search::{Scope, SearchRequest};
use ldapsync_controls::{ContentSyncControl, ContentSyncMode, DirSyncControl, DirSyncExControl};
use std::time::Duration;

/// Configuration for Content Sync sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSyncConfig {
    /// Request mode.
    pub mode: ContentSyncMode,
    /// Attributes to request, empty for all user attributes.
    pub attributes: Vec<String>,
}

impl ContentSyncConfig {
    /// Creates a persistent configuration requesting all attributes.
    pub fn new() -> Self {
        Self {
            mode: ContentSyncMode::RefreshAndPersist,
            attributes: Vec::new(),
        }
    }

    /// Sets the request mode.
    pub fn with_mode(mut self, mode: ContentSyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the requested attributes.
    pub fn with_attributes<I, A>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a whole-subtree search carrying the sync request control.
    pub fn request(
        &self,
        base_dn: impl Into<String>,
        filter: impl Into<String>,
        cookie: Option<Vec<u8>>,
    ) -> SearchRequest {
        SearchRequest::new(base_dn, Scope::WholeSubtree, filter)
            .with_attributes(self.attributes.iter().cloned())
            .with_control(ContentSyncControl::new(self.mode, cookie))
    }
}

impl Default for ContentSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for DirSync sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSyncConfig {
    /// Search filter.
    pub filter: String,
    /// Search scope.
    pub scope: Scope,
    /// DirSync flags.
    pub flags: u64,
    /// Maximum attribute values per round.
    pub max_attribute_count: u64,
    /// Extended DN flag.
    pub ex_flag: u64,
    /// Pause after a round that returned no entries.
    pub backoff: Duration,
}

impl DirSyncConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            filter: "(objectclass=*)".to_string(),
            scope: Scope::BaseObject,
            flags: 0,
            max_attribute_count: 1000,
            ex_flag: 1,
            backoff: Duration::from_secs(10),
        }
    }

    /// Sets the search filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the search scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the DirSync flags.
    pub fn with_flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the maximum attribute count.
    pub fn with_max_attribute_count(mut self, count: u64) -> Self {
        self.max_attribute_count = count;
        self
    }

    /// Sets the extended DN flag.
    pub fn with_ex_flag(mut self, flag: u64) -> Self {
        self.ex_flag = flag;
        self
    }

    /// Sets the empty-round backoff.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Builds a search carrying the DirSync and extended DN controls.
    pub fn request(&self, base_dn: impl Into<String>, cookie: Vec<u8>) -> SearchRequest {
        SearchRequest::new(base_dn, self.scope, self.filter.clone())
            .with_control(DirSyncControl::new(
                self.flags,
                self.max_attribute_count,
                cookie,
            ))
            .with_control(DirSyncExControl::new(self.ex_flag))
    }
}

impl Default for DirSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
