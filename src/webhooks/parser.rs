//! Note hook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`NoteEvent`] values.
//! The parser is designed to be robust against unknown fields.
//!
//! # Parsing Strategy
//!
//! 1. Payloads for other hooks (`hook_name` present and not `note_hooks`)
//!    return `Ok(None)` (ignored, not error)
//! 2. A payload with a `pull_request` object becomes a pull request comment;
//!    anything else (commit or issue comment) becomes a commit comment
//! 3. Missing optional strings become empty strings
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    BranchData, CommentId, PrNumber, ProjectId, PullRequestId, PullRequestInfo, RepoRef, Sha,
    User,
};

use super::events::{
    Comment, CommitCommentEvent, NoteAction, NoteEvent, PullRequestCommentEvent,
};

/// The `hook_name` the host sends with comment events.
const NOTE_HOOK_NAME: &str = "note_hooks";

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a note hook payload into a typed event.
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a comment event
/// * `Ok(None)` - The payload belongs to another hook (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use note_trigger::webhooks::{parse_note_hook, NoteEvent};
///
/// let payload = br#"{
///     "action": "comment",
///     "hook_name": "note_hooks",
///     "comment": {
///         "id": 1,
///         "body": "retest",
///         "user": { "username": "octocat", "name": "Octo Cat", "email": "o@example.com" },
///         "commit_id": "deadbeef"
///     },
///     "project": { "id": 7, "name": "repo" }
/// }"#;
///
/// let event = parse_note_hook(payload).unwrap().unwrap();
/// assert!(matches!(event, NoteEvent::CommitComment(_)));
/// ```
pub fn parse_note_hook(payload: &[u8]) -> Result<Option<NoteEvent>, ParseError> {
    let raw: RawNotePayload = serde_json::from_slice(payload)?;

    if let Some(hook_name) = raw.hook_name.as_deref()
        && hook_name != NOTE_HOOK_NAME
    {
        return Ok(None);
    }

    let action = NoteAction::from_wire(raw.action.as_deref().unwrap_or_default());
    let comment = convert_comment(raw.comment);
    let repository = raw.repository.map(convert_repo);

    let project = match (raw.project, &repository) {
        (Some(project), _) => convert_repo(project),
        (None, Some(repository)) => repository.clone(),
        (None, None) => {
            return Err(ParseError::InvalidField {
                field: "project",
                value: "missing (and no repository to fall back to)".to_string(),
            });
        }
    };

    let event = match raw.pull_request {
        Some(pr) => NoteEvent::PullRequestComment(PullRequestCommentEvent {
            action,
            comment,
            pull_request: convert_pull_request(pr)?,
            repository: repository.unwrap_or_else(|| project.clone()),
            project,
        }),
        None => NoteEvent::CommitComment(CommitCommentEvent {
            action,
            comment,
            project,
            repository,
        }),
    };

    Ok(Some(event))
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match the host's webhook JSON structure. We use Option<T> liberally to
// handle missing fields gracefully, then validate required fields explicitly.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawNotePayload {
    action: Option<String>,
    hook_name: Option<String>,
    comment: RawComment,
    project: Option<RawRepository>,
    repository: Option<RawRepository>,
    pull_request: Option<RawPullRequest>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: u64,
    body: Option<String>,
    user: Option<RawUser>,
    commit_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUser {
    #[serde(alias = "login")]
    username: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    id: u64,
    name: Option<String>,
    namespace: Option<String>,
    homepage: Option<String>,
    url: Option<String>,
    git_ssh_url: Option<String>,
    git_http_url: Option<String>,
    path_with_namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    id: u64,
    number: u64,
    title: Option<String>,
    body: Option<String>,
    merge_commit_sha: Option<String>,
    merge_reference_name: Option<String>,
    mergeable: Option<bool>,
    need_test: Option<bool>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    head: RawBranch,
    base: RawBranch,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawBranch {
    label: Option<String>,
    #[serde(rename = "ref")]
    ref_name: String,
    sha: Option<String>,
    user: Option<RawUser>,
    repo: RawRepository,
}

fn convert_user(raw: Option<RawUser>) -> User {
    let raw = raw.unwrap_or_default();
    User {
        username: raw.username.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        email: raw.email.unwrap_or_default(),
    }
}

fn convert_repo(raw: RawRepository) -> RepoRef {
    RepoRef {
        id: ProjectId(raw.id),
        name: raw.name.unwrap_or_default(),
        namespace: raw.namespace.unwrap_or_default(),
        homepage: raw.homepage.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        ssh_url: raw.git_ssh_url.unwrap_or_default(),
        http_url: raw.git_http_url.unwrap_or_default(),
        path_with_namespace: raw.path_with_namespace.unwrap_or_default(),
    }
}

/// Converts an optional wire string to a SHA, treating blank as absent.
fn non_blank_sha(value: Option<String>) -> Option<Sha> {
    value.map(Sha::new).filter(|sha| !sha.is_blank())
}

fn convert_comment(raw: RawComment) -> Comment {
    Comment {
        id: CommentId(raw.id),
        body: raw.body.unwrap_or_default(),
        user: convert_user(raw.user),
        commit_id: non_blank_sha(raw.commit_id),
    }
}

fn convert_branch(raw: RawBranch) -> BranchData {
    BranchData {
        label: raw.label.unwrap_or_default(),
        ref_name: raw.ref_name,
        sha: non_blank_sha(raw.sha),
        user: convert_user(raw.user),
        repo: convert_repo(raw.repo),
    }
}

fn convert_pull_request(raw: RawPullRequest) -> Result<PullRequestInfo, ParseError> {
    if raw.head.ref_name.trim().is_empty() {
        return Err(ParseError::InvalidField {
            field: "pull_request.head.ref",
            value: raw.head.ref_name,
        });
    }

    let merge_reference_name = raw
        .merge_reference_name
        .filter(|name| !name.trim().is_empty());

    Ok(PullRequestInfo {
        id: PullRequestId(raw.id),
        number: PrNumber(raw.number),
        title: raw.title.unwrap_or_default(),
        body: raw.body,
        merge_commit_sha: non_blank_sha(raw.merge_commit_sha),
        merge_reference_name,
        // Absent while the host is still computing it.
        mergeable: raw.mergeable.unwrap_or(true),
        need_test: raw.need_test.unwrap_or(true),
        labels: raw.labels.into_iter().map(|label| label.name).collect(),
        head: convert_branch(raw.head),
        base: convert_branch(raw.base),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_json(id: u64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "namespace": "acme",
            "homepage": format!("https://git.example.com/acme/{}", name),
            "url": format!("https://git.example.com/acme/{}", name),
            "git_ssh_url": format!("git@git.example.com:acme/{}.git", name),
            "git_http_url": format!("https://git.example.com/acme/{}.git", name),
            "path_with_namespace": format!("acme/{}", name)
        })
    }

    fn pull_request_payload() -> serde_json::Value {
        serde_json::json!({
            "action": "comment",
            "hook_name": "note_hooks",
            "noteable_type": "PullRequest",
            "comment": {
                "id": 77,
                "body": "retest this please",
                "user": { "login": "reviewer", "name": "Re Viewer", "email": "r@example.com" }
            },
            "project": repo_json(2, "widgets"),
            "repository": repo_json(2, "widgets"),
            "pull_request": {
                "id": 9001,
                "number": 12,
                "title": "Add widgets",
                "body": "Adds the widgets",
                "merge_commit_sha": "cafef00d",
                "merge_reference_name": "refs/pull/12/MERGE",
                "mergeable": true,
                "need_test": false,
                "labels": [{ "id": 1, "name": "bug" }, { "id": 2, "name": "ci" }],
                "head": {
                    "label": "dev:feature-1",
                    "ref": "feature-1",
                    "sha": "1111111111111111111111111111111111111111",
                    "user": { "username": "dev", "name": "Dev Eloper", "email": "dev@example.com" },
                    "repo": repo_json(1, "widgets-fork")
                },
                "base": {
                    "label": "acme:master",
                    "ref": "master",
                    "sha": "2222222222222222222222222222222222222222",
                    "user": { "username": "acme", "name": "Acme", "email": "" },
                    "repo": repo_json(2, "widgets")
                }
            }
        })
    }

    fn parse(value: &serde_json::Value) -> Result<Option<NoteEvent>, ParseError> {
        parse_note_hook(&serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn parse_pull_request_comment() {
        let event = parse(&pull_request_payload()).unwrap().expect("should parse");

        match event {
            NoteEvent::PullRequestComment(e) => {
                assert_eq!(e.action, NoteAction::Comment);
                assert_eq!(e.comment.id, CommentId(77));
                assert_eq!(e.comment.body, "retest this please");
                assert_eq!(e.comment.user.username, "reviewer");
                assert_eq!(e.comment.commit_id, None);

                let pr = &e.pull_request;
                assert_eq!(pr.id, PullRequestId(9001));
                assert_eq!(pr.number, PrNumber(12));
                assert_eq!(pr.source_branch(), "feature-1");
                assert_eq!(pr.target_branch(), "master");
                assert_eq!(pr.source_project_id(), ProjectId(1));
                assert_eq!(pr.target_project_id(), ProjectId(2));
                assert_eq!(pr.merge_commit_sha, Some(Sha::new("cafef00d")));
                assert_eq!(
                    pr.merge_reference_name.as_deref(),
                    Some("refs/pull/12/MERGE")
                );
                assert!(pr.mergeable);
                assert!(!pr.need_test);
                assert_eq!(pr.labels, vec!["bug".to_string(), "ci".to_string()]);
                assert_eq!(pr.head.user.name, "Dev Eloper");
                assert_eq!(
                    pr.source().http_url,
                    "https://git.example.com/acme/widgets-fork.git"
                );
                assert_eq!(e.repository.name, "widgets");
            }
            _ => panic!("expected PullRequestComment"),
        }
    }

    #[test]
    fn parse_commit_comment() {
        let payload = serde_json::json!({
            "action": "comment",
            "hook_name": "note_hooks",
            "noteable_type": "Commit",
            "comment": {
                "id": 5,
                "body": "build it",
                "user": { "username": "octocat", "name": "Octo Cat", "email": "o@example.com" },
                "commit_id": "deadbeef"
            },
            "project": repo_json(3, "tools")
        });

        let event = parse(&payload).unwrap().expect("should parse");

        match event {
            NoteEvent::CommitComment(e) => {
                assert_eq!(e.comment.commit_id, Some(Sha::new("deadbeef")));
                assert_eq!(e.project.id, ProjectId(3));
                assert_eq!(e.project.ssh_url, "git@git.example.com:acme/tools.git");
                assert!(e.repository.is_none());
            }
            _ => panic!("expected CommitComment"),
        }
    }

    #[test]
    fn blank_commit_id_is_absent() {
        let payload = serde_json::json!({
            "action": "comment",
            "comment": { "id": 5, "body": "x", "commit_id": "   " },
            "project": repo_json(3, "tools")
        });

        let event = parse(&payload).unwrap().unwrap();
        assert_eq!(event.comment().commit_id, None);
    }

    #[test]
    fn issue_comment_parses_without_commit() {
        let payload = serde_json::json!({
            "action": "comment",
            "hook_name": "note_hooks",
            "noteable_type": "Issue",
            "comment": { "id": 5, "body": "hello", "user": { "username": "u" } },
            "project": repo_json(3, "tools")
        });

        let event = parse(&payload).unwrap().unwrap();
        assert!(event.pull_request().is_none());
        assert_eq!(event.comment().commit_id, None);
    }

    #[test]
    fn unknown_action_is_preserved() {
        let mut payload = pull_request_payload();
        payload["action"] = serde_json::json!("edit");

        let event = parse(&payload).unwrap().unwrap();
        assert_eq!(event.action(), &NoteAction::Other("edit".to_string()));
    }

    #[test]
    fn missing_mergeable_defaults_to_true() {
        let mut payload = pull_request_payload();
        payload["pull_request"]
            .as_object_mut()
            .unwrap()
            .remove("mergeable");

        let event = parse(&payload).unwrap().unwrap();
        assert!(event.pull_request().unwrap().mergeable);
    }

    #[test]
    fn blank_merge_fields_are_absent() {
        let mut payload = pull_request_payload();
        payload["pull_request"]["merge_commit_sha"] = serde_json::json!("");
        payload["pull_request"]["merge_reference_name"] = serde_json::json!(" ");

        let event = parse(&payload).unwrap().unwrap();
        let pr = event.pull_request().unwrap();
        assert!(pr.merge_commit_sha.is_none());
        assert!(pr.merge_reference_name.is_none());
    }

    #[test]
    fn other_hooks_return_none() {
        let mut payload = pull_request_payload();
        payload["hook_name"] = serde_json::json!("merge_request_hooks");

        assert!(parse(&payload).unwrap().is_none());
    }

    #[test]
    fn repository_falls_back_to_project() {
        let mut payload = pull_request_payload();
        payload.as_object_mut().unwrap().remove("repository");

        match parse(&payload).unwrap().unwrap() {
            NoteEvent::PullRequestComment(e) => assert_eq!(e.repository, e.project),
            _ => panic!("expected PullRequestComment"),
        }
    }

    // ========================================================================
    // Error handling
    // ========================================================================

    #[test]
    fn malformed_json_returns_error() {
        let result = parse_note_hook(b"not valid json");
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn missing_comment_returns_error() {
        let payload = serde_json::json!({
            "action": "comment",
            "project": repo_json(3, "tools")
        });
        assert!(matches!(parse(&payload), Err(ParseError::JsonError(_))));
    }

    #[test]
    fn missing_project_and_repository_returns_error() {
        let payload = serde_json::json!({
            "action": "comment",
            "comment": { "id": 1, "body": "x" }
        });
        assert!(matches!(
            parse(&payload),
            Err(ParseError::InvalidField {
                field: "project",
                ..
            })
        ));
    }

    #[test]
    fn empty_head_ref_returns_error() {
        let mut payload = pull_request_payload();
        payload["pull_request"]["head"]["ref"] = serde_json::json!("");
        assert!(matches!(
            parse(&payload),
            Err(ParseError::InvalidField {
                field: "pull_request.head.ref",
                ..
            })
        ));
    }
}
