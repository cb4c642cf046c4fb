//! Outgoing pull requests of one unit, memoized per server URL.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::event::{RefChange, RefsChangedEvent};
use crate::git_providers::{PullRequestApi, ServerPullRequest};

/// Lives inside one [`HeadEvent`](super::HeadEvent) and dies with it.
#[derive(Debug, Default)]
pub struct PullRequestCache {
    by_server_url: HashMap<String, Vec<ServerPullRequest>>,
}

impl PullRequestCache {
    pub fn len(&self) -> usize {
        self.by_server_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_server_url.is_empty()
    }

    /// Open pull requests leaving the event repository from any of the
    /// unit's branch changes, as seen by the server at `server_url`.
    ///
    /// The remote is asked once per branch change on the first call for a
    /// given URL; later calls return the stored list. A ref that vanished
    /// upstream or a failed request only drops that ref's contribution.
    pub async fn outgoing_pull_requests<A: PullRequestApi>(
        &mut self,
        server_url: &str,
        event: &RefsChangedEvent,
        changes: &[RefChange],
        api: &A,
    ) -> &[ServerPullRequest] {
        if !self.by_server_url.contains_key(server_url) {
            let fetched = fetch_outgoing(server_url, event, changes, api).await;
            self.by_server_url.insert(server_url.to_string(), fetched);
        }

        self.by_server_url
            .get(server_url)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

async fn fetch_outgoing<A: PullRequestApi>(
    server_url: &str,
    event: &RefsChangedEvent,
    changes: &[RefChange],
    api: &A,
) -> Vec<ServerPullRequest> {
    let repo = &event.repository;
    let mut pull_requests = Vec::new();

    for change in changes.iter().filter(|c| c.ref_type.is_branch()) {
        let for_change = match api
            .outgoing_open_pull_requests(
                server_url,
                &repo.owner_name,
                &repo.repository_name,
                &change.ref_id,
            )
            .await
        {
            Ok(prs) => prs,
            Err(e) if e.is_not_found() => {
                info!(repository = %repo, ref_id = %change.ref_id, "No such repository on Bitbucket");
                continue;
            }
            Err(e) => {
                warn!(
                    repository = %repo,
                    ref_id = %change.ref_id,
                    error = %e,
                    "Failed to retrieve pull requests from Bitbucket"
                );
                continue;
            }
        };

        pull_requests.extend(
            for_change
                .into_iter()
                .filter(|pr| repo.same_repository(&pr.source.repository)),
        );
    }

    pull_requests
}
