//! Structured form of a native Bitbucket Server `repo:refs_changed` delivery.

use std::fmt;

use serde::Serialize;

/// Kind of a single ref mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Removed,
    Unknown,
}

impl ChangeKind {
    /// Exact-match lookup of the server's change `type` field.
    pub fn from_change_type(raw: &str) -> Self {
        match raw {
            "ADD" => ChangeKind::Created,
            "UPDATE" => ChangeKind::Updated,
            "DELETE" => ChangeKind::Removed,
            _ => ChangeKind::Unknown,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Removed => "removed",
            ChangeKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Type of the ref a change applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefType {
    Branch,
    Tag,
    Other(String),
}

impl RefType {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "BRANCH" => RefType::Branch,
            "TAG" => RefType::Tag,
            other => RefType::Other(other.to_string()),
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, RefType::Branch)
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefType::Branch => f.write_str("BRANCH"),
            RefType::Tag => f.write_str("TAG"),
            RefType::Other(s) => f.write_str(s),
        }
    }
}

/// One ref mutation inside a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefChange {
    /// Fully qualified ref, e.g. `refs/heads/feature/x`.
    pub ref_id: String,
    /// Short ref name, e.g. `feature/x`.
    pub ref_display_id: String,
    pub ref_type: RefType,
    pub from_hash: String,
    pub to_hash: String,
    /// Raw change type as sent by the server (`ADD`, `UPDATE`, `DELETE`, ...).
    pub change_type: String,
    pub kind: ChangeKind,
}

/// Identity of a repository on a Bitbucket Server instance.
///
/// `owner_name` is the project key, `repository_name` the repository slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryIdentity {
    pub id: Option<i64>,
    pub owner_name: String,
    pub repository_name: String,
    pub scm_id: String,
}

impl RepositoryIdentity {
    /// Case-insensitive owner/name comparison.
    pub fn has_name(&self, owner_name: &str, repository_name: &str) -> bool {
        self.owner_name.eq_ignore_ascii_case(owner_name)
            && self.repository_name.eq_ignore_ascii_case(repository_name)
    }

    /// Same repository: names match, and ids match whenever both sides carry one.
    pub fn same_repository(&self, other: &RepositoryIdentity) -> bool {
        if let (Some(a), Some(b)) = (self.id, other.id) {
            if a != b {
                return false;
            }
        }
        self.has_name(&other.owner_name, &other.repository_name)
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_name, self.repository_name)
    }
}

/// One inbound delivery: the repository and its ordered ref changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefsChangedEvent {
    pub repository: RepositoryIdentity,
    pub changes: Vec<RefChange>,
}
