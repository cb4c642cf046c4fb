//! Entry point for one native Bitbucket Server push hook delivery.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::classifier::classify_changes;
use crate::dispatch::{Dispatcher, IndexTrigger, UnitReport};
use crate::errors::HookEngineResult;
use crate::git_providers::PullRequestApi;
use crate::head_event::HeadEvent;
use crate::parser::parse_refs_changed;
use crate::source::SourceRegistry;

/// Event key a native Bitbucket Server push hook is sent with.
pub const SERVER_REFS_CHANGED: &str = "repo:refs_changed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEventType {
    ServerRefsChanged,
    Other(String),
}

impl HookEventType {
    pub fn from_key(key: &str) -> Self {
        match key {
            SERVER_REFS_CHANGED => HookEventType::ServerRefsChanged,
            other => HookEventType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookEventType::ServerRefsChanged => f.write_str(SERVER_REFS_CHANGED),
            HookEventType::Other(key) => f.write_str(key),
        }
    }
}

/// Flavor of the Bitbucket instance that sent the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BitbucketType {
    Server,
    Cloud,
}

/// One inbound hook delivery as seen by the engine.
#[derive(Debug, Clone)]
pub struct HookRequest {
    pub event_type: HookEventType,
    /// Raw JSON body; `None` when the delivery carried nothing.
    pub payload: Option<String>,
    pub instance_type: BitbucketType,
    /// Remote host the delivery came from.
    pub origin: String,
    /// Base URL of the sending server; without it nothing can match.
    pub server_url: Option<String>,
}

/// What processing one delivery led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessOutcome {
    Ignored { reason: String },
    Reindexed { owner: String, repository: String },
    Dispatched { units: Vec<UnitReport> },
}

impl ProcessOutcome {
    fn ignored(reason: impl Into<String>) -> Self {
        ProcessOutcome::Ignored {
            reason: reason.into(),
        }
    }
}

/// Turns a push hook delivery into index events.
///
/// A delivery without changes asks for a full re-index of its repository.
/// Otherwise the changes are split by kind and every kind is dispatched as
/// its own unit, one after another.
///
/// # Errors
///
/// Only an undecodable payload fails; remote failures are absorbed while
/// resolving heads.
pub async fn process_push_hook<A, T>(
    request: HookRequest,
    registry: &SourceRegistry,
    api: &A,
    trigger: &T,
) -> HookEngineResult<ProcessOutcome>
where
    A: PullRequestApi,
    T: IndexTrigger,
{
    if request.event_type != HookEventType::ServerRefsChanged {
        debug!(event = %request.event_type, "not a refs-changed hook");
        return Ok(ProcessOutcome::ignored(format!(
            "unsupported event type {}",
            request.event_type
        )));
    }

    let Some(payload) = request.payload.as_deref() else {
        return Ok(ProcessOutcome::ignored("empty payload"));
    };

    let Some(server_url) = request.server_url else {
        debug!(origin = %request.origin, "hook without server url");
        return Ok(ProcessOutcome::ignored("no server url"));
    };

    let event = match parse_refs_changed(payload) {
        Ok(event) => event,
        Err(e) => {
            error!(origin = %request.origin, error = %e, "Can not read hook payload");
            return Err(e.into());
        }
    };

    let owner = event.repository.owner_name.clone();
    let repository = event.repository.repository_name.clone();

    if event.changes.is_empty() {
        info!(
            owner = %owner,
            repository = %repository,
            "Received hook from Bitbucket. Processing push event"
        );
        trigger.reindex(&owner, &repository);
        return Ok(ProcessOutcome::Reindexed { owner, repository });
    }

    let classified = classify_changes(&event);
    debug!(
        owner = %owner,
        repository = %repository,
        instance = ?request.instance_type,
        kinds = classified.len(),
        "refs-changed hook classified"
    );

    let event = Arc::new(event);
    let dispatcher = Dispatcher::new(registry, api, trigger);
    let mut units = Vec::with_capacity(classified.len());

    for (kind, changes) in classified {
        let unit = HeadEvent::new(
            kind,
            changes,
            request.origin.clone(),
            server_url.clone(),
            Arc::clone(&event),
        );
        units.push(dispatcher.dispatch(unit).await);
    }

    Ok(ProcessOutcome::Dispatched { units })
}
