//! Registered sources and navigators a hook can be matched against.
//!
//! Candidates reach the engine as tagged variants: only the Bitbucket Server
//! flavor is understood, everything else never matches.

pub mod registry;

pub use registry::{RegisteredNavigator, RegisteredSource, SourceRegistry};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::event::RepositoryIdentity;
use crate::scm::{CheckoutStrategy, HeadOrigin};

/// Pull-request discovery policy of a source.
///
/// An empty strategy set means pull requests of that direction are not wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTraits {
    /// Strategies for pull requests opened from the source repository itself.
    pub origin_pull_requests: BTreeSet<CheckoutStrategy>,
    /// Strategies for pull requests opened from forks.
    pub fork_pull_requests: BTreeSet<CheckoutStrategy>,
}

impl SourceTraits {
    pub fn wants_pull_requests(&self) -> bool {
        !self.origin_pull_requests.is_empty() || !self.fork_pull_requests.is_empty()
    }

    pub fn origin_strategies(&self) -> &BTreeSet<CheckoutStrategy> {
        &self.origin_pull_requests
    }

    pub fn fork_strategies(&self) -> &BTreeSet<CheckoutStrategy> {
        &self.fork_pull_requests
    }

    /// Strategy set for pull requests of the given origin.
    pub fn strategies_for(&self, origin: HeadOrigin) -> &BTreeSet<CheckoutStrategy> {
        match origin {
            HeadOrigin::Default => self.origin_strategies(),
            HeadOrigin::Fork => self.fork_strategies(),
        }
    }
}

/// A single repository on a Bitbucket Server instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitbucketServerSource {
    pub id: String,
    /// `None` stands for a source with no server configured; it matches nothing.
    #[serde(default)]
    pub server_url: Option<String>,
    pub repo_owner: String,
    pub repository: String,
    /// Stable repository id; when known it wins over name comparison.
    #[serde(default)]
    pub repository_id: Option<i64>,
    #[serde(default)]
    pub traits: SourceTraits,
}

impl BitbucketServerSource {
    /// Is `repository` the one this source tracks?
    ///
    /// A repository id known on both sides decides on its own, so renamed
    /// repositories keep matching; otherwise owner and name are compared
    /// case-insensitively.
    pub fn is_repository(&self, repository: &RepositoryIdentity) -> bool {
        if let (Some(theirs), Some(ours)) = (repository.id, self.repository_id) {
            return theirs == ours;
        }
        repository.has_name(&self.repo_owner, &self.repository)
    }

    /// Same repository as this source, or a fork of it.
    pub fn classify_origin(&self, repository: &RepositoryIdentity) -> HeadOrigin {
        if self.is_repository(repository) {
            HeadOrigin::Default
        } else {
            HeadOrigin::Fork
        }
    }
}

/// An organization-level scanner: every repository of one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitbucketNavigator {
    pub id: String,
    #[serde(default)]
    pub server_url: Option<String>,
    pub repo_owner: String,
}

/// A source offered to a reconciliation unit.
#[derive(Debug, Clone, Copy)]
pub enum SourceCandidate<'a> {
    BitbucketServer(&'a BitbucketServerSource),
    Other,
}

/// A navigator offered to a reconciliation unit.
#[derive(Debug, Clone, Copy)]
pub enum NavigatorCandidate<'a> {
    BitbucketServer(&'a BitbucketNavigator),
    Other,
}
