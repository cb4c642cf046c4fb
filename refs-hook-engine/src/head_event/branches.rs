//! Branch heads for direct pushes.

use tracing::info;

use crate::event::ChangeKind;
use crate::head_event::Resolution;
use crate::scm::{BranchHead, GitRevision, Head, HeadMap, Revision};

/// Adds one branch head per branch change of the unit.
///
/// Removed branches map to `None`; created and updated ones to the new tip.
/// Nothing is added when the source tracks another repository.
pub(crate) fn add_branches(resolution: &Resolution<'_>, result: &mut HeadMap) {
    if !resolution.event_matches_source() {
        return;
    }

    for change in resolution.changes {
        if !change.ref_type.is_branch() {
            info!(
                ref_type = %change.ref_type,
                ref_display_id = %change.ref_display_id,
                "Received event for unknown ref type"
            );
            continue;
        }

        let head = Head::Branch(BranchHead::new(change.ref_display_id.clone()));
        let revision = match resolution.kind {
            ChangeKind::Removed => None,
            _ => Some(Revision::Git(GitRevision::new(
                head.clone(),
                change.to_hash.clone(),
            ))),
        };
        result.insert(head, revision);
    }
}
