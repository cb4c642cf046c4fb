//! Remote access to Bitbucket Server.
//!
//! The engine only needs one remote operation: listing the open pull requests
//! that originate from a given ref. It is expressed as the [`PullRequestApi`]
//! trait so the resolvers stay generic (static dispatch, no boxed futures);
//! [`bitbucket::ServerApiClient`] is the production implementation.

pub mod types;
pub use types::*;

pub mod bitbucket;

use std::future::Future;
use std::time::Duration;

use crate::errors::ProviderResult;

/// Runtime configuration of the Bitbucket Server client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Optional personal access token sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Page size requested from paged endpoints.
    pub page_limit: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(30),
            page_limit: 100,
        }
    }
}

/// "List outgoing open pull requests for ref X" on a Bitbucket Server.
///
/// Implementations must report a missing repository or ref as
/// [`ProviderError::NotFound`](crate::errors::ProviderError::NotFound) so the
/// caller can tell it apart from transient failures.
pub trait PullRequestApi {
    fn outgoing_open_pull_requests(
        &self,
        server_url: &str,
        owner_name: &str,
        repository_name: &str,
        ref_id: &str,
    ) -> impl Future<Output = ProviderResult<Vec<ServerPullRequest>>> + Send;
}
