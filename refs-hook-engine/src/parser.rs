//! Decoding of native Bitbucket Server `repo:refs_changed` hook payloads.
//!
//! Only the fields the engine needs are read; unknown fields are ignored.
//! A missing `changes` array is treated as an empty one (re-index signal).

use serde::Deserialize;

use crate::errors::PayloadError;
use crate::event::{ChangeKind, RefChange, RefType, RefsChangedEvent};
use crate::git_providers::types::RawRepository;

#[derive(Debug, Deserialize)]
struct RawRefsChangedPayload {
    repository: RawRepository,
    #[serde(default)]
    changes: Vec<RawChange>,
}

#[derive(Debug, Deserialize)]
struct RawChange {
    #[serde(rename = "ref")]
    reference: RawRef,
    #[serde(rename = "refId", default)]
    ref_id: Option<String>,
    #[serde(rename = "fromHash")]
    from_hash: String,
    #[serde(rename = "toHash")]
    to_hash: String,
    #[serde(rename = "type")]
    change_type: String,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    id: String,
    #[serde(rename = "displayId")]
    display_id: String,
    #[serde(rename = "type")]
    ref_type: String,
}

impl From<RawChange> for RefChange {
    fn from(raw: RawChange) -> Self {
        RefChange {
            ref_id: raw.ref_id.unwrap_or(raw.reference.id),
            ref_display_id: raw.reference.display_id,
            ref_type: RefType::from_raw(&raw.reference.ref_type),
            from_hash: raw.from_hash,
            to_hash: raw.to_hash,
            kind: ChangeKind::from_change_type(&raw.change_type),
            change_type: raw.change_type,
        }
    }
}

/// Parses a raw hook body into a [`RefsChangedEvent`].
///
/// # Errors
///
/// Returns [`PayloadError::Json`] when the body is not JSON or lacks a
/// required field (repository, ref ids, hashes, change type).
pub fn parse_refs_changed(payload: &str) -> Result<RefsChangedEvent, PayloadError> {
    let raw: RawRefsChangedPayload = serde_json::from_str(payload)?;

    Ok(RefsChangedEvent {
        repository: raw.repository.into(),
        changes: raw.changes.into_iter().map(RefChange::from).collect(),
    })
}
