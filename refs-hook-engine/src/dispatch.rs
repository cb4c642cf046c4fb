//! Offers reconciliation units to every registered navigator and source.

use serde::Serialize;
use tracing::{debug, info};

use crate::event::ChangeKind;
use crate::git_providers::PullRequestApi;
use crate::head_event::HeadEvent;
use crate::scm::{Head, HeadMap, Revision};
use crate::source::SourceRegistry;

/// The indexing side that consumes what the engine resolves.
pub trait IndexTrigger {
    /// Delivery without changes: rescan the repository from scratch.
    fn reindex(&self, owner_name: &str, repository_name: &str);

    /// A navigator scans the repository the unit is about.
    fn navigator_matched(&self, navigator_id: &str, kind: ChangeKind, source_name: &str);

    /// Heads of a source changed.
    fn heads_changed(&self, source_id: &str, kind: ChangeKind, heads: &HeadMap);
}

/// Trigger that only reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingIndexTrigger;

impl IndexTrigger for LoggingIndexTrigger {
    fn reindex(&self, owner_name: &str, repository_name: &str) {
        info!(owner = owner_name, repository = repository_name, "re-index requested");
    }

    fn navigator_matched(&self, navigator_id: &str, kind: ChangeKind, source_name: &str) {
        info!(navigator = navigator_id, %kind, source_name, "navigator event");
    }

    fn heads_changed(&self, source_id: &str, kind: ChangeKind, heads: &HeadMap) {
        for (head, revision) in heads {
            match revision {
                Some(rev) => info!(source = source_id, %kind, %head, revision = ?rev, "head changed"),
                None => info!(source = source_id, %kind, %head, "head removed"),
            }
        }
    }
}

/// One head of a resolution, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadUpdate {
    pub head: Head,
    pub revision: Option<Revision>,
}

/// Heads one source received from one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceHeads {
    pub source_id: String,
    /// Sorted by head name.
    pub heads: Vec<HeadUpdate>,
}

/// What a single unit did during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub kind: ChangeKind,
    pub changes: usize,
    pub navigators: Vec<String>,
    pub sources: Vec<SourceHeads>,
}

/// Evaluates units one after another against a fixed registry.
pub struct Dispatcher<'a, A, T> {
    registry: &'a SourceRegistry,
    api: &'a A,
    trigger: &'a T,
}

impl<'a, A, T> Dispatcher<'a, A, T>
where
    A: PullRequestApi,
    T: IndexTrigger,
{
    pub fn new(registry: &'a SourceRegistry, api: &'a A, trigger: &'a T) -> Self {
        Self {
            registry,
            api,
            trigger,
        }
    }

    /// Offers the unit to every navigator, then every source.
    ///
    /// The unit (and its pull-request cache) is dropped afterwards.
    pub async fn dispatch(&self, mut unit: HeadEvent) -> UnitReport {
        let kind = unit.kind();
        debug!(%kind, changes = unit.changes().len(), origin = unit.origin(), "dispatching unit");

        let mut navigators = Vec::new();
        for nav in &self.registry.navigators {
            if unit.matches_navigator(nav.candidate()) {
                self.trigger
                    .navigator_matched(nav.id(), kind, unit.source_name());
                navigators.push(nav.id().to_string());
            }
        }

        let mut sources = Vec::new();
        for src in &self.registry.sources {
            let heads = unit.resolve_heads(src.candidate(), self.api).await;
            if heads.is_empty() {
                continue;
            }
            self.trigger.heads_changed(src.id(), kind, &heads);
            sources.push(SourceHeads {
                source_id: src.id().to_string(),
                heads: sorted_updates(heads),
            });
        }

        UnitReport {
            kind,
            changes: unit.changes().len(),
            navigators,
            sources,
        }
    }
}

fn sorted_updates(heads: HeadMap) -> Vec<HeadUpdate> {
    let mut updates: Vec<HeadUpdate> = heads
        .into_iter()
        .map(|(head, revision)| HeadUpdate { head, revision })
        .collect();
    updates.sort_by(|a, b| a.head.name().cmp(b.head.name()));
    updates
}
