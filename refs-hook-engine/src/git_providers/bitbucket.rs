//! Bitbucket Server provider (REST 1.0) for outgoing pull requests.
//!
//! Endpoint used:
//!   * GET {server}/rest/api/1.0/projects/{key}/repos/{slug}/pull-requests
//!         ?direction=OUTGOING&at={refId}&state=OPEN&start={n}&limit={m}

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::errors::{ConfigError, ProviderError, ProviderResult};
use crate::git_providers::types::{RawPage, RawPullRequest, ServerPullRequest};
use crate::git_providers::{ProviderConfig, PullRequestApi};

/// Bitbucket Server HTTP client wrapper.
///
/// The server base URL is supplied per call because one client serves every
/// registered source, whichever server it points at.
#[derive(Debug, Clone)]
pub struct ServerApiClient {
    http: Client,
    token: Option<String>,
    page_limit: u32,
}

impl ServerApiClient {
    /// Builds the shared HTTP instance with a stable user agent and timeout.
    pub fn from_config(cfg: ProviderConfig) -> Result<Self, ConfigError> {
        debug!(
            timeout_secs = cfg.timeout.as_secs(),
            page_limit = cfg.page_limit,
            "Initializing Bitbucket Server client"
        );

        let http = Client::builder()
            .user_agent("refs-hook-engine/0.1")
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self::new(http, cfg.token, cfg.page_limit))
    }

    pub fn new(http: Client, token: Option<String>, page_limit: u32) -> Self {
        Self {
            http,
            token,
            page_limit: page_limit.max(1),
        }
    }

    async fn fetch_outgoing(
        &self,
        server_url: &str,
        owner_name: &str,
        repository_name: &str,
        ref_id: &str,
    ) -> ProviderResult<Vec<ServerPullRequest>> {
        let url = pull_requests_url(server_url, owner_name, repository_name);
        let limit = self.page_limit.to_string();

        let mut pull_requests = Vec::new();
        let mut start = Some(0u32);

        while let Some(offset) = start {
            debug!(%url, ref_id, offset, "Bitbucket Server outgoing pull requests page");

            let start_param = offset.to_string();
            let mut request = self.http.get(&url).query(&[
                ("direction", "OUTGOING"),
                ("at", ref_id),
                ("state", "OPEN"),
                ("withAttributes", "false"),
                ("withProperties", "false"),
                ("start", start_param.as_str()),
                ("limit", limit.as_str()),
            ]);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let resp = request.send().await?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound);
            }

            let page: RawPage<RawPullRequest> = resp.error_for_status()?.json().await?;
            start = advance(offset, page.next_start());
            pull_requests.extend(page.values.into_iter().map(ServerPullRequest::from));
        }

        Ok(pull_requests)
    }
}

impl PullRequestApi for ServerApiClient {
    async fn outgoing_open_pull_requests(
        &self,
        server_url: &str,
        owner_name: &str,
        repository_name: &str,
        ref_id: &str,
    ) -> ProviderResult<Vec<ServerPullRequest>> {
        self.fetch_outgoing(server_url, owner_name, repository_name, ref_id)
            .await
    }
}

/// Next page offset; a server that does not move forward ends the paging.
fn advance(current: u32, next: Option<u32>) -> Option<u32> {
    match next {
        Some(n) if n <= current => {
            warn!(current, next = n, "Bitbucket Server paging did not advance, stopping");
            None
        }
        other => other,
    }
}

/// Pull-request collection URL of a repository; path segments are encoded.
fn pull_requests_url(server_url: &str, owner_name: &str, repository_name: &str) -> String {
    format!(
        "{}/rest/api/1.0/projects/{}/repos/{}/pull-requests",
        server_url.trim_end_matches('/'),
        urlencoding::encode(owner_name),
        urlencoding::encode(repository_name)
    )
}
