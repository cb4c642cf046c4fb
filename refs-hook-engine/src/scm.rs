//! Heads and revisions handed to the indexing side.
//!
//! A head is a named line of development (a branch or a synthetic
//! pull-request head); a revision pins it to concrete commits. Both are plain
//! values with structural equality so that resolving the same pull request
//! and strategy twice yields the same map key.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of resolving one reconciliation unit against one source.
///
/// `None` means the head was removed and has nothing to check out.
pub type HeadMap = HashMap<Head, Option<Revision>>;

/// Repository flavor as reported by the server's `scmId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryType {
    Git,
    Mercurial,
    Unknown,
}

impl RepositoryType {
    /// Resolves a raw SCM id (`git`, `hg`) case-insensitively.
    pub fn from_scm_id(scm_id: &str) -> Self {
        if scm_id.eq_ignore_ascii_case("git") {
            RepositoryType::Git
        } else if scm_id.eq_ignore_ascii_case("hg") {
            RepositoryType::Mercurial
        } else {
            RepositoryType::Unknown
        }
    }
}

/// How a pull request is materialized for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStrategy {
    /// The result of merging the PR into its target branch.
    Merge,
    /// The PR source branch tip as-is.
    Head,
}

impl CheckoutStrategy {
    /// Lowercase name used as the head-name suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStrategy::Merge => "merge",
            CheckoutStrategy::Head => "head",
        }
    }
}

impl fmt::Display for CheckoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a pull request comes from the source's own repository or a fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadOrigin {
    Default,
    Fork,
}

/// A plain branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchHead {
    pub name: String,
}

impl BranchHead {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A synthetic head standing for one checkout variant of an open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestHead {
    /// `PR-<id>` or `PR-<id>-<strategy>`.
    pub name: String,
    /// Owner of the source the head was resolved for.
    pub owner_name: String,
    /// Repository of the source the head was resolved for.
    pub repo_name: String,
    /// Branch name the head is exposed under; equals `name`.
    pub branch_name: String,
    /// Destination branch of the pull request.
    pub target: BranchHead,
    pub pull_request_id: String,
    pub origin: HeadOrigin,
    pub checkout_strategy: CheckoutStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Head {
    Branch(BranchHead),
    PullRequest(PullRequestHead),
}

impl Head {
    pub fn name(&self) -> &str {
        match self {
            Head::Branch(h) => &h.name,
            Head::PullRequest(h) => &h.name,
        }
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A git commit attached to a head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitRevision {
    pub head: Head,
    pub hash: String,
}

impl GitRevision {
    pub fn new(head: Head, hash: impl Into<String>) -> Self {
        Self {
            head,
            hash: hash.into(),
        }
    }
}

/// Pairs the target branch commit with the pull request source commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRevision {
    pub head: Head,
    pub target: GitRevision,
    pub source: GitRevision,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Revision {
    Git(GitRevision),
    PullRequest(PullRequestRevision),
}
