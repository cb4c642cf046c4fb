//! One reconciliation unit: the changes of a single kind from one delivery.
//!
//! A [`HeadEvent`] is offered to every registered navigator and source while
//! the delivery is dispatched. Matching is decided here; head resolution is
//! split into [`branches`] and [`pull_requests`], the latter reading through
//! the unit-owned [`cache::PullRequestCache`].

pub mod branches;
pub mod cache;
pub mod pull_requests;

use std::sync::Arc;

use tracing::{debug, info};

use crate::event::{ChangeKind, RefChange, RefsChangedEvent};
use crate::git_providers::PullRequestApi;
use crate::scm::{HeadMap, RepositoryType};
use crate::source::{BitbucketServerSource, NavigatorCandidate, SourceCandidate};

use cache::PullRequestCache;

/// Server URL of Bitbucket Cloud; deliveries are never matched against it.
pub const BITBUCKET_CLOUD_URL: &str = "https://bitbucket.org";

/// The per-kind unit dispatched for a refs-changed delivery.
#[derive(Debug)]
pub struct HeadEvent {
    kind: ChangeKind,
    changes: Vec<RefChange>,
    origin: String,
    server_url: String,
    event: Arc<RefsChangedEvent>,
    cache: PullRequestCache,
}

/// Read-only view shared by the resolvers for one source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolution<'a> {
    pub kind: ChangeKind,
    pub changes: &'a [RefChange],
    pub event: &'a RefsChangedEvent,
    pub source: &'a BitbucketServerSource,
}

impl Resolution<'_> {
    /// The source's configured repository is the event's repository.
    pub fn event_matches_source(&self) -> bool {
        self.source.is_repository(&self.event.repository)
    }
}

impl HeadEvent {
    pub fn new(
        kind: ChangeKind,
        changes: Vec<RefChange>,
        origin: impl Into<String>,
        server_url: impl Into<String>,
        event: Arc<RefsChangedEvent>,
    ) -> Self {
        Self {
            kind,
            changes,
            origin: origin.into(),
            server_url: server_url.into(),
            event,
            cache: PullRequestCache::default(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn changes(&self) -> &[RefChange] {
        &self.changes
    }

    /// Identifier of the delivery origin (remote host).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Name of the repository the event is about.
    pub fn source_name(&self) -> &str {
        &self.event.repository.repository_name
    }

    /// Number of distinct server URLs whose pull requests were fetched so far.
    pub fn cached_server_urls(&self) -> usize {
        self.cache.len()
    }

    fn is_server_url_match(&self, candidate_url: Option<&str>) -> bool {
        match candidate_url {
            None => false,
            Some(url) if url == BITBUCKET_CLOUD_URL => false,
            Some(url) => url == self.server_url,
        }
    }

    /// Does the delivery concern a repository this navigator scans?
    pub fn matches_navigator(&self, candidate: NavigatorCandidate<'_>) -> bool {
        let NavigatorCandidate::BitbucketServer(nav) = candidate else {
            return false;
        };

        self.is_server_url_match(nav.server_url.as_deref())
            && nav
                .repo_owner
                .eq_ignore_ascii_case(&self.event.repository.owner_name)
    }

    /// Returns the source when server URL and repository type apply to it.
    ///
    /// Owner/repository equality is left to the resolvers.
    pub fn matching_source<'a>(
        &self,
        candidate: SourceCandidate<'a>,
    ) -> Option<&'a BitbucketServerSource> {
        let SourceCandidate::BitbucketServer(src) = candidate else {
            return None;
        };

        if !self.is_server_url_match(src.server_url.as_deref()) {
            return None;
        }

        let scm_id = &self.event.repository.scm_id;
        if RepositoryType::from_scm_id(scm_id) != RepositoryType::Git {
            info!(scm = %scm_id, "Received event for unknown repository type");
            return None;
        }

        Some(src)
    }

    /// Heads and revisions this unit contributes to `candidate`.
    ///
    /// Empty when the candidate does not match. Pull-request heads are only
    /// produced for updates; fetched pull requests are memoized per server
    /// URL for the lifetime of this unit.
    pub async fn resolve_heads<A: PullRequestApi>(
        &mut self,
        candidate: SourceCandidate<'_>,
        api: &A,
    ) -> HeadMap {
        let mut result = HeadMap::new();
        let Some(source) = self.matching_source(candidate) else {
            return result;
        };

        let resolution = Resolution {
            kind: self.kind,
            changes: &self.changes,
            event: &self.event,
            source,
        };

        branches::add_branches(&resolution, &mut result);
        pull_requests::add_pull_requests(&resolution, &mut self.cache, api, &mut result).await;

        debug!(
            source = %source.id,
            kind = %self.kind,
            heads = result.len(),
            "resolved heads"
        );
        result
    }
}
