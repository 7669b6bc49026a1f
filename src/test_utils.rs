//! Shared test fixtures and arbitrary generators for property-based testing.

use crate::types::{
    BranchData, CommentId, PrNumber, ProjectId, PullRequestId, PullRequestInfo, RepoRef, Sha,
    User,
};
use crate::webhooks::{
    Comment, CommitCommentEvent, NoteAction, NoteEvent, PullRequestCommentEvent,
};
use proptest::prelude::*;

pub const TARGET_REPO_URL: &str = "https://git.example.com/acme/widgets.git";

pub fn repo(id: u64, namespace: &str, name: &str) -> RepoRef {
    RepoRef {
        id: ProjectId(id),
        name: name.to_string(),
        namespace: namespace.to_string(),
        homepage: format!("https://git.example.com/{namespace}/{name}"),
        url: format!("git@git.example.com:{namespace}/{name}.git"),
        ssh_url: format!("git@git.example.com:{namespace}/{name}.git"),
        http_url: format!("https://git.example.com/{namespace}/{name}.git"),
        path_with_namespace: format!("{namespace}/{name}"),
    }
}

fn author() -> User {
    User::new("reviewer", "Rita Reviewer", "rita@example.com")
}

/// A mergeable pull request from `feature-1` (fork, project 11) into
/// `master` (project 22) with merge commit `cafef00d`.
pub fn pull_request() -> PullRequestInfo {
    PullRequestInfo {
        id: PullRequestId(900),
        number: PrNumber(3),
        title: "Add widgets".to_string(),
        body: Some("Adds the widget module.".to_string()),
        merge_commit_sha: Some(Sha::new("cafef00d")),
        merge_reference_name: Some("refs/pull/3/MERGE".to_string()),
        mergeable: true,
        need_test: true,
        labels: Vec::new(),
        head: BranchData {
            label: "dev:feature-1".to_string(),
            ref_name: "feature-1".to_string(),
            sha: Some(Sha::new("0123456789abcdef")),
            user: User::new("dev", "Dev Eloper", "dev@example.com"),
            repo: repo(11, "dev", "widgets"),
        },
        base: BranchData {
            label: "acme:master".to_string(),
            ref_name: "master".to_string(),
            sha: Some(Sha::new("fedcba9876543210")),
            user: User::new("acme", "Acme", "ops@example.com"),
            repo: repo(22, "acme", "widgets"),
        },
    }
}

/// A `comment` note on [`pull_request`], customized by `f`.
pub fn pull_request_comment_event(
    body: &str,
    f: impl FnOnce(&mut PullRequestInfo),
) -> NoteEvent {
    let mut pr = pull_request();
    f(&mut pr);
    NoteEvent::PullRequestComment(PullRequestCommentEvent {
        action: NoteAction::Comment,
        comment: Comment {
            id: CommentId(1),
            body: body.to_string(),
            user: author(),
            commit_id: None,
        },
        pull_request: pr,
        project: repo(22, "acme", "widgets"),
        repository: repo(22, "acme", "widgets"),
    })
}

/// A `comment` note on a bare commit of project 22.
pub fn commit_comment_event(body: &str, commit_id: Option<&str>) -> NoteEvent {
    NoteEvent::CommitComment(CommitCommentEvent {
        action: NoteAction::Comment,
        comment: Comment {
            id: CommentId(2),
            body: body.to_string(),
            user: author(),
            commit_id: commit_id.map(Sha::new),
        },
        project: repo(22, "acme", "widgets"),
        repository: None,
    })
}

/// Replaces the action of any event.
pub fn with_action(event: NoteEvent, action: NoteAction) -> NoteEvent {
    match event {
        NoteEvent::PullRequestComment(mut e) => {
            e.action = action;
            NoteEvent::PullRequestComment(e)
        }
        NoteEvent::CommitComment(mut e) => {
            e.action = action;
            NoteEvent::CommitComment(e)
        }
    }
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(Sha::new)
}

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9/-]{0,30}".prop_map(String::from)
}

/// Any action other than `comment`.
pub fn arb_non_comment_action() -> impl Strategy<Value = NoteAction> {
    "[a-z_]{1,12}"
        .prop_filter("must not be the comment action", |s| s != "comment")
        .prop_map(NoteAction::Other)
}

pub fn arb_comment_body() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .!?\\[\\]-]{0,60}".prop_map(String::from)
}

/// Pull-request and commit-comment events with arbitrary bodies, merge
/// state and build targets.
pub fn arb_note_event() -> impl Strategy<Value = NoteEvent> {
    let pr_event = (
        arb_comment_body(),
        any::<bool>(),
        any::<bool>(),
        prop::option::of(arb_sha()),
        arb_branch_name(),
    )
        .prop_map(|(body, mergeable, need_test, merge_sha, target)| {
            pull_request_comment_event(&body, |pr| {
                pr.mergeable = mergeable;
                pr.need_test = need_test;
                pr.merge_commit_sha = merge_sha;
                pr.base.ref_name = target;
            })
        });
    let commit_event = (arb_comment_body(), prop::option::of("[0-9a-f]{8,40}")).prop_map(
        |(body, commit)| commit_comment_event(&body, commit.as_deref()),
    );
    prop_oneof![pr_event, commit_event]
}
