//! The search capability the engines run on.
//!
//! The engines never open connections themselves. They hand a
//! [`SearchRequest`] to a [`Searcher`], which owns the socket, TLS, bind and
//! LDAP message framing.

use crate::error::{SyncError, SyncResult};
use ldapsync_controls::{expect_control, expect_control_mut, Control, ControlVariant};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};

/// Search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Only the base entry.
    BaseObject,
    /// Immediate children of the base.
    SingleLevel,
    /// The base and all descendants.
    #[default]
    WholeSubtree,
}

/// Alias dereferencing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DerefAliases {
    /// Never dereference.
    #[default]
    Never,
    /// Dereference while searching below the base.
    InSearching,
    /// Dereference when locating the base.
    FindingBaseObj,
    /// Always dereference.
    Always,
}

/// An LDAP search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Base DN.
    pub base_dn: String,
    /// Search scope.
    pub scope: Scope,
    /// Alias dereferencing.
    pub deref_aliases: DerefAliases,
    /// Maximum entries, 0 for no limit.
    pub size_limit: u32,
    /// Maximum seconds, 0 for no limit.
    pub time_limit: u32,
    /// Return attribute names only.
    pub types_only: bool,
    /// Search filter in string form.
    pub filter: String,
    /// Requested attributes, empty for all user attributes.
    pub attributes: Vec<String>,
    /// Request controls, in order.
    pub controls: Vec<Control>,
}

impl SearchRequest {
    /// Creates an unlimited request with no attributes or controls.
    pub fn new(base_dn: impl Into<String>, scope: Scope, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            scope,
            deref_aliases: DerefAliases::Never,
            size_limit: 0,
            time_limit: 0,
            types_only: false,
            filter: filter.into(),
            attributes: Vec::new(),
            controls: Vec::new(),
        }
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

    /// Appends a control.
    pub fn with_control(mut self, control: impl Into<Control>) -> Self {
        self.controls.push(control.into());
        self
    }

    /// Borrows the request control of type `T`.
    pub fn control<T: ControlVariant>(&self) -> SyncResult<&T> {
        Ok(expect_control::<T>(&self.controls)?)
    }

    /// Mutably borrows the request control of type `T`.
    pub fn control_mut<T: ControlVariant>(&mut self) -> SyncResult<&mut T> {
        Ok(expect_control_mut::<T>(&mut self.controls)?)
    }
}

/// A search result entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchEntry {
    /// Distinguished name.
    pub dn: String,
    /// Attribute values by name.
    pub attributes: BTreeMap<String, Vec<Vec<u8>>>,
    /// Controls attached to this entry.
    pub controls: Vec<Control>,
}

impl SearchEntry {
    /// Creates an entry with no attributes or controls.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            ..Default::default()
        }
    }

    /// Adds values for an attribute.
    pub fn with_attribute<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.attributes
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Attaches a control.
    pub fn with_control(mut self, control: impl Into<Control>) -> Self {
        self.controls.push(control.into());
        self
    }

    /// Returns the values of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&[Vec<u8>]> {
        self.attributes.get(name).map(Vec::as_slice)
    }
}

/// The complete result of a non-streaming search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Returned entries.
    pub entries: Vec<SearchEntry>,
    /// Continuation references.
    pub referrals: Vec<String>,
    /// Controls on the final response.
    pub controls: Vec<Control>,
}

/// A message delivered while a streaming search is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A result entry.
    Entry(SearchEntry),
    /// A continuation reference.
    Referral(String),
    /// A resume cookie delivered outside of an entry (Sync Info message).
    Cookie(Vec<u8>),
}

/// Issues LDAP searches over an established connection.
///
/// Implementations must deliver streamed events in the order the server
/// sent them and stop streaming as soon as the handler returns an error,
/// returning that error.
pub trait Searcher: Send + Sync {
    /// Runs a search and collects the whole result.
    fn search(&self, request: &SearchRequest) -> SyncResult<SearchResult>;

    /// Runs a search, handing each message to `handler` as it arrives.
    ///
    /// Returns the controls of the final search result message.
    fn search_streaming(
        &self,
        request: &SearchRequest,
        handler: &mut dyn FnMut(SearchEvent) -> SyncResult<()>,
    ) -> SyncResult<Vec<Control>>;
}

impl<S: Searcher + ?Sized> Searcher for &S {
    fn search(&self, request: &SearchRequest) -> SyncResult<SearchResult> {
        (**self).search(request)
    }

    fn search_streaming(
        &self,
        request: &SearchRequest,
        handler: &mut dyn FnMut(SearchEvent) -> SyncResult<()>,
    ) -> SyncResult<Vec<Control>> {
        (**self).search_streaming(request, handler)
    }
}

/// A scripted searcher for tests.
///
/// Batch searches pop scripted results in order; streaming searches pop
/// scripted event streams. Once a script runs dry the searcher fails with
/// a fatal transport error. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockSearcher {
    results: Mutex<VecDeque<SyncResult<SearchResult>>>,
    streams: Mutex<VecDeque<(Vec<SearchEvent>, Vec<Control>)>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearcher {
    /// Creates a searcher with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next batch search.
    pub fn push_result(&self, result: SearchResult) {
        self.results.lock().push_back(Ok(result));
    }

    /// Queues a failure for the next batch search.
    pub fn push_error(&self, error: SyncError) {
        self.results.lock().push_back(Err(error));
    }

    /// Queues the events and final controls of the next streaming search.
    pub fn push_stream(&self, events: Vec<SearchEvent>, final_controls: Vec<Control>) {
        self.streams.lock().push_back((events, final_controls));
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }
}

impl Searcher for MockSearcher {
    fn search(&self, request: &SearchRequest) -> SyncResult<SearchResult> {
        self.requests.lock().push(request.clone());
        self.results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::transport_fatal("no scripted search result")))
    }

    fn search_streaming(
        &self,
        request: &SearchRequest,
        handler: &mut dyn FnMut(SearchEvent) -> SyncResult<()>,
    ) -> SyncResult<Vec<Control>> {
        self.requests.lock().push(request.clone());
        let (events, controls) = self
            .streams
            .lock()
            .pop_front()
            .ok_or_else(|| SyncError::transport_fatal("no scripted search stream"))?;
        for event in events {
            handler(event)?;
        }
        Ok(controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldapsync_controls::{DirSyncControl, PagingControl};

    #[test]
    fn control_mut_updates_in_place() {
        let mut request =
            SearchRequest::new("dc=example,dc=com", Scope::BaseObject, "(objectclass=*)")
                .with_control(DirSyncControl::new(0, 1000, Vec::new()));
        request
            .control_mut::<DirSyncControl>()
            .unwrap()
            .set_cookie(b"c1".to_vec());
        assert_eq!(request.control::<DirSyncControl>().unwrap().cookie, b"c1");
        assert!(matches!(
            request.control::<PagingControl>(),
            Err(SyncError::ControlNotFound { .. })
        ));
    }

    #[test]
    fn entry_attributes_accumulate() {
        let entry = SearchEntry::new("cn=a,dc=example,dc=com")
            .with_attribute("mail", ["a@example.com"])
            .with_attribute("mail", ["b@example.com"]);
        assert_eq!(entry.attribute("mail").map(<[_]>::len), Some(2));
        assert_eq!(entry.attribute("cn"), None);
    }

    #[test]
    fn mock_searcher_records_and_runs_dry() {
        let searcher = MockSearcher::new();
        searcher.push_result(SearchResult::default());
        let request = SearchRequest::new("dc=example,dc=com", Scope::WholeSubtree, "(uid=*)");

        assert!(searcher.search(&request).is_ok());
        assert!(matches!(
            searcher.search(&request),
            Err(SyncError::Transport { retryable: false, .. })
        ));
        assert_eq!(searcher.requests().len(), 2);
    }

    #[test]
    fn mock_stream_stops_on_handler_error() {
        let searcher = MockSearcher::new();
        searcher.push_stream(
            vec![
                SearchEvent::Referral("ldap://a".into()),
                SearchEvent::Referral("ldap://b".into()),
            ],
            Vec::new(),
        );
        let request = SearchRequest::new("", Scope::BaseObject, "(objectclass=*)");

        let mut seen = 0;
        let result = searcher.search_streaming(&request, &mut |_| {
            seen += 1;
            Err(SyncError::Cancelled)
        });
        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(seen, 1);
    }
}
