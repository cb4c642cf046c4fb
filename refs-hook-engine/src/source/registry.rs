//! YAML-backed registry of configured sources and navigators.
//!
//! ```yaml
//! navigators:
//!   - kind: bitbucket_server
//!     id: proj-scan
//!     server_url: https://git.example.com
//!     repo_owner: PROJ
//! sources:
//!   - kind: bitbucket_server
//!     id: proj-repo
//!     server_url: https://git.example.com
//!     repo_owner: PROJ
//!     repository: repo
//!     traits:
//!       origin_pull_requests: [merge]
//!       fork_pull_requests: [merge, head]
//!   - kind: other
//!     id: github-mirror
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::RegistryError;
use crate::source::{BitbucketNavigator, BitbucketServerSource, NavigatorCandidate, SourceCandidate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisteredSource {
    BitbucketServer(BitbucketServerSource),
    /// Any source flavor this engine does not handle.
    Other { id: String },
}

impl RegisteredSource {
    pub fn id(&self) -> &str {
        match self {
            RegisteredSource::BitbucketServer(s) => &s.id,
            RegisteredSource::Other { id } => id,
        }
    }

    pub fn candidate(&self) -> SourceCandidate<'_> {
        match self {
            RegisteredSource::BitbucketServer(s) => SourceCandidate::BitbucketServer(s),
            RegisteredSource::Other { .. } => SourceCandidate::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisteredNavigator {
    BitbucketServer(BitbucketNavigator),
    Other { id: String },
}

impl RegisteredNavigator {
    pub fn id(&self) -> &str {
        match self {
            RegisteredNavigator::BitbucketServer(n) => &n.id,
            RegisteredNavigator::Other { id } => id,
        }
    }

    pub fn candidate(&self) -> NavigatorCandidate<'_> {
        match self {
            RegisteredNavigator::BitbucketServer(n) => NavigatorCandidate::BitbucketServer(n),
            RegisteredNavigator::Other { .. } => NavigatorCandidate::Other,
        }
    }
}

/// Every source and navigator a delivery is offered to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRegistry {
    pub navigators: Vec<RegisteredNavigator>,
    pub sources: Vec<RegisteredSource>,
}

impl SourceRegistry {
    /// Reads and validates a registry file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_yaml(&text)?;

        info!(
            path = %path.display(),
            navigators = registry.navigators.len(),
            sources = registry.sources.len(),
            "source registry loaded"
        );
        Ok(registry)
    }

    pub fn from_yaml(text: &str) -> Result<Self, RegistryError> {
        let registry: SourceRegistry = serde_yml::from_str(text)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Rejects empty ids, duplicate ids and blank server URLs.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        let ids = self
            .navigators
            .iter()
            .map(RegisteredNavigator::id)
            .chain(self.sources.iter().map(RegisteredSource::id));
        for id in ids {
            if id.trim().is_empty() {
                return Err(RegistryError::Invalid {
                    id: id.to_string(),
                    reason: "id is empty".into(),
                });
            }
            if !seen.insert(id) {
                return Err(RegistryError::DuplicateId(id.to_string()));
            }
        }

        for nav in &self.navigators {
            if let RegisteredNavigator::BitbucketServer(n) = nav {
                check_server_url(&n.id, n.server_url.as_deref())?;
                check_non_empty(&n.id, "repo_owner", &n.repo_owner)?;
            }
        }
        for src in &self.sources {
            if let RegisteredSource::BitbucketServer(s) = src {
                check_server_url(&s.id, s.server_url.as_deref())?;
                check_non_empty(&s.id, "repo_owner", &s.repo_owner)?;
                check_non_empty(&s.id, "repository", &s.repository)?;
            }
        }
        Ok(())
    }
}

fn check_server_url(id: &str, url: Option<&str>) -> Result<(), RegistryError> {
    match url {
        Some(u) if u.trim().is_empty() => Err(RegistryError::Invalid {
            id: id.to_string(),
            reason: "server_url is blank".into(),
        }),
        Some(u) if !(u.starts_with("http://") || u.starts_with("https://")) => {
            Err(RegistryError::Invalid {
                id: id.to_string(),
                reason: format!("server_url '{u}' must start with http:// or https://"),
            })
        }
        _ => Ok(()),
    }
}

fn check_non_empty(id: &str, field: &str, value: &str) -> Result<(), RegistryError> {
    if value.trim().is_empty() {
        return Err(RegistryError::Invalid {
            id: id.to_string(),
            reason: format!("{field} is empty"),
        });
    }
    Ok(())
}
