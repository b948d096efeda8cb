//! Active Directory DirSync polling sessions.

use crate::cancel::CancelToken;
use crate::config::DirSyncConfig;
use crate::error::{CallbackResult, SyncError, SyncResult};
use crate::search::{SearchEntry, SearchRequest, Searcher};
use ldapsync_controls::{expect_control, DirSyncControl};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Builds the default DirSync search: base-object scope,
/// `(objectclass=*)`, DirSync (flags 0, 1000 attributes) and extended DN
/// flag 1.
pub fn dirsync_request(base_dn: impl Into<String>, cookie: Vec<u8>) -> SearchRequest {
    DirSyncConfig::default().request(base_dn, cookie)
}

/// Counters for a DirSync session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirSyncStats {
    /// Completed rounds.
    pub rounds: u64,
    /// Entries delivered to the callback.
    pub entries: u64,
    /// Rounds that returned no entries.
    pub empty_rounds: u64,
    /// Backoff sleeps that ran to completion.
    pub backoffs: u64,
    /// Cookie of the last completed round.
    pub last_cookie: Option<Vec<u8>>,
}

/// A DirSync polling session over a [`Searcher`].
pub struct DirSync<S: Searcher> {
    searcher: S,
    config: DirSyncConfig,
    cancel: CancelToken,
    stats: RwLock<DirSyncStats>,
}

impl<S: Searcher> DirSync<S> {
    /// Creates a session.
    pub fn new(searcher: S, config: DirSyncConfig) -> Self {
        Self {
            searcher,
            config,
            cancel: CancelToken::new(),
            stats: RwLock::new(DirSyncStats::default()),
        }
    }

    /// Returns a handle that stops [`run`](Self::run) from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Returns a snapshot of the session counters.
    pub fn stats(&self) -> DirSyncStats {
        self.stats.read().clone()
    }

    /// Builds a request using this session's configuration.
    pub fn request(&self, base_dn: impl Into<String>, cookie: Vec<u8>) -> SearchRequest {
        self.config.request(base_dn, cookie)
    }

    /// Polls for changes until an error or cancellation.
    ///
    /// Each round hands the returned entries and the new cookie to
    /// `callback`. After a round with entries the cookie is written into the
    /// request's DirSync control and the next round starts immediately.
    /// After an empty round the session sleeps for the configured backoff
    /// and repeats with the cookie unchanged.
    ///
    /// On return `request` holds the cookie of the last non-empty round, so
    /// the caller can persist it and resume.
    pub fn run<F>(&self, request: &mut SearchRequest, mut callback: F) -> SyncResult<()>
    where
        F: FnMut(&[SearchEntry], &[u8]) -> CallbackResult,
    {
        request.control::<DirSyncControl>()?;
        info!(base_dn = %request.base_dn, "starting dirsync");

        loop {
            self.cancel.check()?;
            let result = self.searcher.search(request)?;

            let cookie = expect_control::<DirSyncControl>(&result.controls)?
                .cookie
                .clone();
            if cookie.is_empty() {
                return Err(SyncError::EmptyCookie);
            }

            callback(&result.entries, &cookie).map_err(SyncError::Callback)?;

            let count = result.entries.len() as u64;
            {
                let mut stats = self.stats.write();
                stats.rounds += 1;
                stats.entries += count;
                if count == 0 {
                    stats.empty_rounds += 1;
                }
                stats.last_cookie = Some(cookie.clone());
            }
            debug!(entries = count, cookie_len = cookie.len(), "dirsync round complete");

            if count == 0 {
                debug!(backoff = ?self.config.backoff, "no changes, backing off");
                self.cancel.check()?;
                self.cancel.sleep(self.config.backoff)?;
                self.stats.write().backoffs += 1;
            } else {
                request.control_mut::<DirSyncControl>()?.set_cookie(cookie);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{MockSearcher, Scope, SearchResult};
    use ldapsync_controls::{DirSyncExControl, PagingControl};

    #[test]
    fn request_shape() {
        let request = dirsync_request("dc=corp,dc=example", Vec::new());
        assert_eq!(request.scope, Scope::BaseObject);
        assert_eq!(request.filter, "(objectclass=*)");
        assert_eq!(request.controls.len(), 2);

        let dirsync = request.control::<DirSyncControl>().unwrap();
        assert_eq!(dirsync.flags, 0);
        assert_eq!(dirsync.max_attribute_count, 1000);
        assert!(dirsync.cookie.is_empty());
        assert_eq!(request.control::<DirSyncExControl>().unwrap().flag, 1);
    }

    #[test]
    fn request_without_dirsync_control_is_rejected() {
        let searcher = MockSearcher::new();
        let sync = DirSync::new(&searcher, DirSyncConfig::default());
        let mut request =
            SearchRequest::new("dc=corp,dc=example", Scope::BaseObject, "(objectclass=*)")
                .with_control(PagingControl::new(10));

        let result = sync.run(&mut request, |_, _| Ok(()));
        assert!(matches!(result, Err(SyncError::ControlNotFound { .. })));
        assert!(searcher.requests().is_empty());
    }

    #[test]
    fn response_without_dirsync_control_is_fatal() {
        let searcher = MockSearcher::new();
        searcher.push_result(SearchResult::default());
        let sync = DirSync::new(&searcher, DirSyncConfig::default());
        let mut request = sync.request("dc=corp,dc=example", Vec::new());

        let mut calls = 0;
        let result = sync.run(&mut request, |_, _| {
            calls += 1;
            Ok(())
        });
        assert!(matches!(result, Err(SyncError::ControlNotFound { .. })));
        assert_eq!(calls, 0);
    }
}
