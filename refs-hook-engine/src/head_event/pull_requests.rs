//! Synthetic pull-request heads for updated branches.
//!
//! Pushing to a branch moves every open pull request that leaves from it.
//! Each such pull request is exposed once per selected checkout strategy.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::event::ChangeKind;
use crate::git_providers::{PullRequestApi, ServerPullRequest};
use crate::head_event::Resolution;
use crate::head_event::cache::PullRequestCache;
use crate::scm::{
    BranchHead, CheckoutStrategy, GitRevision, Head, HeadMap, HeadOrigin, PullRequestHead,
    PullRequestRevision, Revision,
};

/// `PR-<id>` for a single strategy, `PR-<id>-<strategy>` otherwise.
pub fn pull_request_head_name(
    pull_request_id: &str,
    strategy: CheckoutStrategy,
    strategy_count: usize,
) -> String {
    if strategy_count > 1 {
        format!("PR-{pull_request_id}-{}", strategy.as_str())
    } else {
        format!("PR-{pull_request_id}")
    }
}

pub(crate) async fn add_pull_requests<A: PullRequestApi>(
    resolution: &Resolution<'_>,
    cache: &mut PullRequestCache,
    api: &A,
    result: &mut HeadMap,
) {
    if resolution.kind != ChangeKind::Updated {
        return;
    }

    let source = resolution.source;
    if !source.traits.wants_pull_requests() {
        // branch heads already cover the push
        return;
    }

    let event_repo = &resolution.event.repository;
    let origin = source.classify_origin(event_repo);
    let strategies = source.traits.strategies_for(origin);
    if strategies.is_empty() {
        debug!(source = %source.id, ?origin, "no checkout strategy for this origin");
        return;
    }

    // matched sources always carry a server URL
    let Some(server_url) = source.server_url.as_deref() else {
        return;
    };
    let outgoing = cache
        .outgoing_pull_requests(server_url, resolution.event, resolution.changes, api)
        .await;

    for change in resolution.changes {
        if !change.ref_type.is_branch() {
            info!(
                ref_type = %change.ref_type,
                ref_display_id = %change.ref_display_id,
                "Received event for unknown ref type"
            );
            continue;
        }

        for pull_request in outgoing.iter().filter(|pr| pr.source.ref_id == change.ref_id) {
            if !source.is_repository(&pull_request.destination.repository) {
                continue;
            }

            insert_heads(
                pull_request,
                &source.repo_owner,
                &source.repository,
                origin,
                strategies,
                result,
            );
        }
    }
}

fn insert_heads(
    pull_request: &ServerPullRequest,
    owner_name: &str,
    repo_name: &str,
    origin: HeadOrigin,
    strategies: &BTreeSet<CheckoutStrategy>,
    result: &mut HeadMap,
) {
    let target = BranchHead::new(pull_request.destination.branch.clone());

    for &strategy in strategies {
        let name = pull_request_head_name(&pull_request.id, strategy, strategies.len());
        let head = Head::PullRequest(PullRequestHead {
            name: name.clone(),
            owner_name: owner_name.to_string(),
            repo_name: repo_name.to_string(),
            branch_name: name,
            target: target.clone(),
            pull_request_id: pull_request.id.clone(),
            origin,
            checkout_strategy: strategy,
        });

        let revision = PullRequestRevision {
            head: head.clone(),
            target: GitRevision::new(
                Head::Branch(target.clone()),
                pull_request.destination.commit_hash.clone(),
            ),
            source: GitRevision::new(head.clone(), pull_request.source.commit_hash.clone()),
        };
        result.insert(head, Some(Revision::PullRequest(revision)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceCandidate, SourceTraits};
    use crate::test_utils::{
        FakeApi, FakeReply, branch_change, event_for, pull_request, server_source, unit,
        unit_for,
    };
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn merge_only() -> SourceTraits {
        SourceTraits {
            origin_pull_requests: [CheckoutStrategy::Merge].into(),
            fork_pull_requests: [CheckoutStrategy::Merge].into(),
        }
    }

    fn pr_heads(heads: &HeadMap) -> Vec<&PullRequestHead> {
        let mut out: Vec<_> = heads
            .keys()
            .filter_map(|h| match h {
                Head::PullRequest(p) => Some(p),
                Head::Branch(_) => None,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    #[test]
    fn head_names() {
        assert_eq!(pull_request_head_name("7", CheckoutStrategy::Merge, 1), "PR-7");
        assert_eq!(pull_request_head_name("7", CheckoutStrategy::Head, 1), "PR-7");
        assert_eq!(pull_request_head_name("7", CheckoutStrategy::Merge, 2), "PR-7-merge");
        assert_eq!(pull_request_head_name("7", CheckoutStrategy::Head, 2), "PR-7-head");
    }

    proptest! {
        #[test]
        fn names_are_distinct_per_strategy(id in "[1-9][0-9]{0,5}") {
            let both = [CheckoutStrategy::Merge, CheckoutStrategy::Head];
            let names: HashSet<String> = both
                .iter()
                .map(|s| pull_request_head_name(&id, *s, both.len()))
                .collect();
            prop_assert_eq!(names.len(), 2);
            for s in both {
                prop_assert_eq!(pull_request_head_name(&id, s, 1), format!("PR-{}", id));
            }
        }
    }

    #[tokio::test]
    async fn update_with_open_pull_request() {
        let mut u = unit(
            ChangeKind::Updated,
            vec![branch_change("UPDATE", "feature/x", "A", "B")],
        );
        let src = server_source("PROJ", "repo", merge_only());
        let api = FakeApi::default().reply(
            "refs/heads/feature/x",
            FakeReply::Ok(vec![pull_request("7", "feature/x", "PROJ", "repo")]),
        );

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        assert_eq!(heads.len(), 2);
        assert!(heads.contains_key(&Head::Branch(BranchHead::new("feature/x"))));

        let prs = pr_heads(&heads);
        assert_eq!(prs.len(), 1);
        let pr = prs[0];
        assert_eq!(pr.name, "PR-7");
        assert_eq!(pr.branch_name, "PR-7");
        assert_eq!(pr.owner_name, "PROJ");
        assert_eq!(pr.repo_name, "repo");
        assert_eq!(pr.target, BranchHead::new("master"));
        assert_eq!(pr.origin, HeadOrigin::Default);
        assert_eq!(pr.checkout_strategy, CheckoutStrategy::Merge);

        let head = Head::PullRequest(pr.clone());
        match heads.get(&head) {
            Some(Some(Revision::PullRequest(rev))) => {
                assert_eq!(rev.head, head);
                assert_eq!(rev.target.hash, "dst-7");
                assert_eq!(rev.target.head, Head::Branch(BranchHead::new("master")));
                assert_eq!(rev.source.hash, "src-7");
                assert_eq!(rev.source.head, head);
            }
            other => panic!("unexpected revision {other:?}"),
        }
    }

    #[tokio::test]
    async fn multiple_strategies_expand_each_pull_request() {
        let traits = SourceTraits {
            origin_pull_requests: [CheckoutStrategy::Merge, CheckoutStrategy::Head].into(),
            fork_pull_requests: Default::default(),
        };
        let mut u = unit(ChangeKind::Updated, vec![branch_change("UPDATE", "f", "A", "B")]);
        let src = server_source("PROJ", "repo", traits);
        let api = FakeApi::default().reply(
            "refs/heads/f",
            FakeReply::Ok(vec![
                pull_request("3", "f", "PROJ", "repo"),
                pull_request("4", "f", "PROJ", "repo"),
            ]),
        );

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        let names: Vec<_> = pr_heads(&heads).iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["PR-3-head", "PR-3-merge", "PR-4-head", "PR-4-merge"]);
    }

    #[tokio::test]
    async fn fork_event_uses_fork_strategies() {
        let traits = SourceTraits {
            origin_pull_requests: [CheckoutStrategy::Merge].into(),
            fork_pull_requests: [CheckoutStrategy::Head].into(),
        };
        let event = event_for(
            "~ALICE",
            "repo",
            Some(90),
            "git",
            vec![branch_change("UPDATE", "fix", "A", "B")],
        );
        let mut u = unit_for(ChangeKind::Updated, event);

        let mut pr = pull_request("11", "fix", "PROJ", "repo");
        pr.source.repository.owner_name = "~ALICE".into();
        pr.source.repository.id = Some(90);
        let api = FakeApi::default().reply("refs/heads/fix", FakeReply::Ok(vec![pr]));
        let src = server_source("PROJ", "repo", traits);

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        // fork push: no branch head for the upstream source
        assert_eq!(heads.len(), 1);
        let prs = pr_heads(&heads);
        assert_eq!(prs[0].name, "PR-11");
        assert_eq!(prs[0].origin, HeadOrigin::Fork);
        assert_eq!(prs[0].checkout_strategy, CheckoutStrategy::Head);
    }

    #[tokio::test]
    async fn fork_event_without_fork_strategies_skips_fetch() {
        let traits = SourceTraits {
            origin_pull_requests: [CheckoutStrategy::Merge].into(),
            fork_pull_requests: Default::default(),
        };
        let event = event_for("~ALICE", "repo", None, "git", vec![branch_change("UPDATE", "fix", "A", "B")]);
        let mut u = unit_for(ChangeKind::Updated, event);
        let api = FakeApi::default();
        let src = server_source("PROJ", "repo", traits);

        assert!(u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await.is_empty());
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn pull_requests_into_other_repositories_are_ignored() {
        let mut u = unit(ChangeKind::Updated, vec![branch_change("UPDATE", "f", "A", "B")]);
        let src = server_source("PROJ", "repo", merge_only());
        let api = FakeApi::default().reply(
            "refs/heads/f",
            FakeReply::Ok(vec![
                pull_request("1", "f", "OTHER", "repo"),
                pull_request("2", "f", "proj", "REPO"),
            ]),
        );

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        let names: Vec<_> = pr_heads(&heads).iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["PR-2"]);
    }

    #[tokio::test]
    async fn renamed_repository_matched_by_id_keeps_pull_requests() {
        let traits = SourceTraits {
            origin_pull_requests: [CheckoutStrategy::Merge].into(),
            fork_pull_requests: [CheckoutStrategy::Head].into(),
        };
        let mut src = server_source("PROJ", "repo", traits);
        src.repository_id = Some(84);

        let event = event_for("PROJ", "renamed", Some(84), "git", vec![branch_change("UPDATE", "f", "A", "B")]);
        let mut u = unit_for(ChangeKind::Updated, event);

        let mut pr = pull_request("7", "f", "PROJ", "renamed");
        pr.source.repository.repository_name = "renamed".into();
        pr.destination.repository.id = Some(84);
        let api = FakeApi::default().reply("refs/heads/f", FakeReply::Ok(vec![pr]));

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        let mut names: Vec<_> = heads.keys().map(Head::name).collect();
        names.sort();
        assert_eq!(names, ["PR-7", "f"]);

        let prs = pr_heads(&heads);
        assert_eq!(prs[0].origin, HeadOrigin::Default);
        assert_eq!(prs[0].checkout_strategy, CheckoutStrategy::Merge);
        assert_eq!(prs[0].repo_name, "repo");
    }

    #[tokio::test]
    async fn destination_with_other_id_is_ignored() {
        let mut src = server_source("PROJ", "repo", merge_only());
        src.repository_id = Some(84);
        let mut u = unit(ChangeKind::Updated, vec![branch_change("UPDATE", "f", "A", "B")]);

        let mut pr = pull_request("3", "f", "PROJ", "repo");
        pr.destination.repository.id = Some(12);
        let api = FakeApi::default().reply("refs/heads/f", FakeReply::Ok(vec![pr]));

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        assert!(pr_heads(&heads).is_empty());
        assert_eq!(heads.len(), 1);
    }

    #[tokio::test]
    async fn created_and_removed_units_never_fetch() {
        let src = server_source("PROJ", "repo", merge_only());
        for kind in [ChangeKind::Created, ChangeKind::Removed] {
            let mut u = unit(kind, vec![branch_change("ADD", "f", "0", "B")]);
            let api = FakeApi::default();
            let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
            assert_eq!(heads.len(), 1);
            assert_eq!(api.calls(), 0);
        }
    }

    #[tokio::test]
    async fn source_without_pull_request_traits_never_fetches() {
        let mut u = unit(ChangeKind::Updated, vec![branch_change("UPDATE", "f", "A", "B")]);
        let src = server_source("PROJ", "repo", SourceTraits::default());
        let api = FakeApi::default();

        u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn cache_shared_across_sources_of_one_unit() {
        let mut u = unit(
            ChangeKind::Updated,
            vec![
                branch_change("UPDATE", "a", "1", "2"),
                branch_change("UPDATE", "b", "3", "4"),
            ],
        );
        let api = FakeApi::default()
            .reply("refs/heads/a", FakeReply::Ok(vec![pull_request("1", "a", "PROJ", "repo")]));
        let first = server_source("PROJ", "repo", merge_only());
        let mut second = server_source("PROJ", "repo", merge_only());
        second.id = "second".into();

        let a = u.resolve_heads(SourceCandidate::BitbucketServer(&first), &api).await;
        let b = u.resolve_heads(SourceCandidate::BitbucketServer(&second), &api).await;

        assert_eq!(a, b);
        assert_eq!(api.calls(), 2);
        assert_eq!(u.cached_server_urls(), 1);
    }

    #[tokio::test]
    async fn not_found_ref_does_not_hide_other_refs() {
        let mut u = unit(
            ChangeKind::Updated,
            vec![
                branch_change("UPDATE", "gone", "1", "2"),
                branch_change("UPDATE", "live", "3", "4"),
            ],
        );
        let api = FakeApi::default()
            .reply("refs/heads/gone", FakeReply::NotFound)
            .reply("refs/heads/live", FakeReply::Ok(vec![pull_request("5", "live", "PROJ", "repo")]));
        let src = server_source("PROJ", "repo", merge_only());

        let heads = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        let names: Vec<_> = pr_heads(&heads).iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["PR-5"]);
        assert_eq!(heads.len(), 3);
    }

    #[tokio::test]
    async fn resolving_twice_yields_equal_heads() {
        let mut u = unit(ChangeKind::Updated, vec![branch_change("UPDATE", "f", "A", "B")]);
        let src = server_source("PROJ", "repo", merge_only());
        let api = FakeApi::default()
            .reply("refs/heads/f", FakeReply::Ok(vec![pull_request("8", "f", "PROJ", "repo")]));

        let first = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        let second = u.resolve_heads(SourceCandidate::BitbucketServer(&src), &api).await;
        assert_eq!(first, second);
    }
}
