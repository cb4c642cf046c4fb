//! Bitbucket Server wire shapes and the pull-request model built from them.

use serde::{Deserialize, Serialize};

use crate::event::RepositoryIdentity;

/// One side (`fromRef` / `toRef`) of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestEndpoint {
    pub repository: RepositoryIdentity,
    /// Fully qualified ref, e.g. `refs/heads/feature/x`.
    pub ref_id: String,
    /// Short branch name, e.g. `feature/x`.
    pub branch: String,
    pub commit_hash: String,
}

/// An open pull request as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerPullRequest {
    pub id: String,
    pub source: PullRequestEndpoint,
    pub destination: PullRequestEndpoint,
}

/// Repository object shared by hook payloads and REST responses.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRepository {
    #[serde(default)]
    pub id: Option<i64>,
    pub slug: String,
    #[serde(rename = "scmId", default)]
    pub scm_id: Option<String>,
    pub project: RawProject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProject {
    pub key: String,
}

impl From<RawRepository> for RepositoryIdentity {
    fn from(raw: RawRepository) -> Self {
        RepositoryIdentity {
            id: raw.id,
            owner_name: raw.project.key,
            repository_name: raw.slug,
            scm_id: raw.scm_id.unwrap_or_default(),
        }
    }
}

/// Paged response envelope of the REST 1.0 API.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPage<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    #[serde(rename = "isLastPage", default = "default_last_page")]
    pub is_last_page: bool,
    #[serde(rename = "nextPageStart", default)]
    pub next_page_start: Option<u32>,
}

fn default_last_page() -> bool {
    true
}

impl<T> RawPage<T> {
    /// Start offset of the following page, `None` when this one was the last.
    pub fn next_start(&self) -> Option<u32> {
        if self.is_last_page {
            None
        } else {
            self.next_page_start
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPullRequest {
    pub id: u64,
    #[serde(rename = "fromRef")]
    pub from_ref: RawPullRequestRef,
    #[serde(rename = "toRef")]
    pub to_ref: RawPullRequestRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPullRequestRef {
    pub id: String,
    #[serde(rename = "displayId")]
    pub display_id: String,
    #[serde(rename = "latestCommit")]
    pub latest_commit: String,
    pub repository: RawRepository,
}

impl From<RawPullRequestRef> for PullRequestEndpoint {
    fn from(raw: RawPullRequestRef) -> Self {
        PullRequestEndpoint {
            repository: raw.repository.into(),
            ref_id: raw.id,
            branch: raw.display_id,
            commit_hash: raw.latest_commit,
        }
    }
}

impl From<RawPullRequest> for ServerPullRequest {
    fn from(raw: RawPullRequest) -> Self {
        ServerPullRequest {
            id: raw.id.to_string(),
            source: raw.from_ref.into(),
            destination: raw.to_ref.into(),
        }
    }
}
