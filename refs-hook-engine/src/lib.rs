//! Reconciles native Bitbucket Server `repo:refs_changed` hooks into
//! branch and pull-request head updates for registered sources.
//!
//! A delivery is decoded ([`parser`]), split by change kind
//! ([`classifier`]), and every kind is offered as one [`HeadEvent`] to the
//! registered navigators and sources ([`dispatch`]). [`process_push_hook`]
//! runs the whole pipeline.

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod event;
pub mod git_providers;
pub mod head_event;
pub mod parser;
pub mod processor;
pub mod scm;
pub mod source;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

pub use config::EngineConfig;
pub use dispatch::{Dispatcher, IndexTrigger, LoggingIndexTrigger, UnitReport};
pub use errors::{HookEngineError, HookEngineResult};
pub use git_providers::bitbucket::ServerApiClient;
pub use head_event::HeadEvent;
pub use processor::{BitbucketType, HookEventType, HookRequest, ProcessOutcome, process_push_hook};
pub use source::SourceRegistry;
