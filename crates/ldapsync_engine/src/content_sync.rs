//! RFC 4533 Content Sync sessions.

use crate::cancel::CancelToken;
use crate::config::ContentSyncConfig;
use crate::error::{CallbackResult, SyncError, SyncResult};
use crate::search::{SearchEntry, SearchEvent, SearchRequest, Searcher};
use ldapsync_controls::{
    expect_control, find_control, oid, ContentSyncDoneControl, ContentSyncStateControl, EntryState,
};
use tracing::{debug, info};

/// Builds a persistent whole-subtree sync search.
///
/// Pass the cookie saved from a previous session to resume; `None` starts
/// with a full refresh.
pub fn content_sync_request(
    base_dn: impl Into<String>,
    filter: impl Into<String>,
    cookie: Option<Vec<u8>>,
) -> SearchRequest {
    ContentSyncConfig::default().request(base_dn, filter, cookie)
}

/// A Content Sync session over a [`Searcher`].
pub struct ContentSync<S: Searcher> {
    searcher: S,
    config: ContentSyncConfig,
    cancel: CancelToken,
}

impl<S: Searcher> ContentSync<S> {
    /// Creates a session.
    pub fn new(searcher: S, config: ContentSyncConfig) -> Self {
        Self {
            searcher,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Returns a handle that stops [`run`](Self::run) from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Builds a request using this session's configuration.
    pub fn request(
        &self,
        base_dn: impl Into<String>,
        filter: impl Into<String>,
        cookie: Option<Vec<u8>>,
    ) -> SearchRequest {
        self.config.request(base_dn, filter, cookie)
    }

    /// Runs the search and reports every synchronized entry.
    ///
    /// `entry_cb` receives each entry with its UUID and state. `cookie_cb`
    /// receives every resume cookie in the order the server sent them;
    /// persisting the latest one is enough to resume later. Entries without
    /// controls are skipped. The first error from either callback ends the
    /// session.
    ///
    /// In refresh-and-persist mode this only returns on error or
    /// cancellation.
    pub fn run<E, C>(
        &self,
        request: &SearchRequest,
        mut entry_cb: E,
        mut cookie_cb: C,
    ) -> SyncResult<()>
    where
        E: FnMut(&SearchEntry, &[u8], EntryState) -> CallbackResult,
        C: FnMut(&[u8]) -> CallbackResult,
    {
        self.cancel.check()?;
        info!(base_dn = %request.base_dn, filter = %request.filter, "starting content sync");

        let mut entries = 0u64;
        let final_controls = self.searcher.search_streaming(request, &mut |event| {
            self.cancel.check()?;
            match event {
                SearchEvent::Entry(entry) => {
                    if handle_entry(&entry, &mut entry_cb, &mut cookie_cb)? {
                        entries += 1;
                    }
                    Ok(())
                }
                SearchEvent::Cookie(cookie) => {
                    debug!(len = cookie.len(), "sync info cookie");
                    cookie_cb(&cookie).map_err(SyncError::Callback)
                }
                SearchEvent::Referral(url) => {
                    debug!(%url, "referral ignored");
                    Ok(())
                }
            }
        })?;

        if let Some(done) = find_control(&final_controls, oid::CONTENT_SYNC_DONE) {
            let done = done.downcast_ref::<ContentSyncDoneControl>()?;
            if let Some(cookie) = done.cookie.as_deref().filter(|c| !c.is_empty()) {
                cookie_cb(cookie).map_err(SyncError::Callback)?;
            }
        }

        info!(entries, "content sync finished");
        Ok(())
    }
}

/// Returns false when the entry was skipped.
fn handle_entry<E, C>(
    entry: &SearchEntry,
    entry_cb: &mut E,
    cookie_cb: &mut C,
) -> SyncResult<bool>
where
    E: FnMut(&SearchEntry, &[u8], EntryState) -> CallbackResult,
    C: FnMut(&[u8]) -> CallbackResult,
{
    if entry.controls.is_empty() {
        debug!(dn = %entry.dn, "entry without sync state skipped");
        return Ok(false);
    }

    let count = entry
        .controls
        .iter()
        .filter(|c| c.oid() == oid::CONTENT_SYNC_STATE)
        .count();
    if count > 1 {
        return Err(SyncError::DuplicateControl {
            oid: oid::CONTENT_SYNC_STATE,
            count,
        });
    }
    let state = expect_control::<ContentSyncStateControl>(&entry.controls)?;
    entry_cb(entry, &state.uuid, state.state).map_err(SyncError::Callback)?;

    // Update and delete states carry their cookie inline; no separate
    // cookie message follows.
    if let Some(cookie) = state.cookie.as_deref().filter(|c| !c.is_empty()) {
        cookie_cb(cookie).map_err(SyncError::Callback)?;
    }
    Ok(true)
}
