//! Builders and fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::dispatch::IndexTrigger;
use crate::errors::{ProviderError, ProviderResult};
use crate::event::{ChangeKind, RefChange, RefType, RefsChangedEvent, RepositoryIdentity};
use crate::git_providers::{PullRequestApi, PullRequestEndpoint, ServerPullRequest};
use crate::head_event::HeadEvent;
use crate::scm::HeadMap;
use crate::source::{BitbucketServerSource, SourceTraits};

pub const SERVER_URL: &str = "https://git.example.com";

fn change(change_type: &str, ref_id: String, name: &str, ref_type: RefType, from: &str, to: &str) -> RefChange {
    RefChange {
        ref_id,
        ref_display_id: name.to_string(),
        ref_type,
        from_hash: from.to_string(),
        to_hash: to.to_string(),
        change_type: change_type.to_string(),
        kind: ChangeKind::from_change_type(change_type),
    }
}

pub fn branch_change(change_type: &str, name: &str, from: &str, to: &str) -> RefChange {
    change(change_type, format!("refs/heads/{name}"), name, RefType::Branch, from, to)
}

pub fn tag_change(change_type: &str, name: &str, from: &str, to: &str) -> RefChange {
    change(change_type, format!("refs/tags/{name}"), name, RefType::Tag, from, to)
}

pub fn repository(owner: &str, repo: &str, id: Option<i64>, scm: &str) -> RepositoryIdentity {
    RepositoryIdentity {
        id,
        owner_name: owner.to_string(),
        repository_name: repo.to_string(),
        scm_id: scm.to_string(),
    }
}

pub fn event_for(
    owner: &str,
    repo: &str,
    id: Option<i64>,
    scm: &str,
    changes: Vec<RefChange>,
) -> RefsChangedEvent {
    RefsChangedEvent {
        repository: repository(owner, repo, id, scm),
        changes,
    }
}

pub fn event_with(changes: Vec<RefChange>) -> RefsChangedEvent {
    event_for("PROJ", "repo", Some(84), "git", changes)
}

pub fn unit_for(kind: ChangeKind, event: RefsChangedEvent) -> HeadEvent {
    HeadEvent::new(kind, event.changes.clone(), "10.0.0.1", SERVER_URL, Arc::new(event))
}

pub fn unit(kind: ChangeKind, changes: Vec<RefChange>) -> HeadEvent {
    unit_for(kind, event_with(changes))
}

pub fn server_source(owner: &str, repo: &str, traits: SourceTraits) -> BitbucketServerSource {
    BitbucketServerSource {
        id: "src".to_string(),
        server_url: Some(SERVER_URL.to_string()),
        repo_owner: owner.to_string(),
        repository: repo.to_string(),
        repository_id: None,
        traits,
    }
}

/// Open pull request from `PROJ/repo:<branch>` into `<dest_owner>/<dest_repo>:master`.
pub fn pull_request(id: &str, branch: &str, dest_owner: &str, dest_repo: &str) -> ServerPullRequest {
    ServerPullRequest {
        id: id.to_string(),
        source: PullRequestEndpoint {
            repository: repository("PROJ", "repo", Some(84), "git"),
            ref_id: format!("refs/heads/{branch}"),
            branch: branch.to_string(),
            commit_hash: format!("src-{id}"),
        },
        destination: PullRequestEndpoint {
            repository: repository(dest_owner, dest_repo, None, "git"),
            ref_id: "refs/heads/master".to_string(),
            branch: "master".to_string(),
            commit_hash: format!("dst-{id}"),
        },
    }
}

#[derive(Debug, Clone)]
pub enum FakeReply {
    Ok(Vec<ServerPullRequest>),
    NotFound,
    Fail,
}

/// Canned replies keyed by ref id; unknown refs have no pull requests.
#[derive(Debug, Default)]
pub struct FakeApi {
    replies: HashMap<String, FakeReply>,
    calls: AtomicUsize,
}

impl FakeApi {
    pub fn reply(mut self, ref_id: &str, reply: FakeReply) -> Self {
        self.replies.insert(ref_id.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PullRequestApi for FakeApi {
    async fn outgoing_open_pull_requests(
        &self,
        _server_url: &str,
        _owner_name: &str,
        _repository_name: &str,
        ref_id: &str,
    ) -> ProviderResult<Vec<ServerPullRequest>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(ref_id) {
            Some(FakeReply::Ok(prs)) => Ok(prs.clone()),
            Some(FakeReply::NotFound) => Err(ProviderError::NotFound),
            Some(FakeReply::Fail) => Err(ProviderError::Server(500)),
            None => Ok(Vec::new()),
        }
    }
}

/// Trigger that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingTrigger {
    reindexed: Mutex<Vec<(String, String)>>,
    navigators: Mutex<Vec<(String, ChangeKind, String)>>,
    heads: Mutex<Vec<(String, ChangeKind, HeadMap)>>,
}

impl RecordingTrigger {
    pub fn reindexed(&self) -> Vec<(String, String)> {
        self.reindexed.lock().unwrap().clone()
    }

    pub fn navigator_events(&self) -> Vec<(String, ChangeKind, String)> {
        self.navigators.lock().unwrap().clone()
    }

    pub fn head_events(&self) -> Vec<(String, ChangeKind, HeadMap)> {
        self.heads.lock().unwrap().clone()
    }
}

impl IndexTrigger for RecordingTrigger {
    fn reindex(&self, owner_name: &str, repository_name: &str) {
        self.reindexed
            .lock()
            .unwrap()
            .push((owner_name.to_string(), repository_name.to_string()));
    }

    fn navigator_matched(&self, navigator_id: &str, kind: ChangeKind, source_name: &str) {
        self.navigators
            .lock()
            .unwrap()
            .push((navigator_id.to_string(), kind, source_name.to_string()));
    }

    fn heads_changed(&self, source_id: &str, kind: ChangeKind, heads: &HeadMap) {
        self.heads
            .lock()
            .unwrap()
            .push((source_id.to_string(), kind, heads.clone()));
    }
}
