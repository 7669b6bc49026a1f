//! Comment ("note") webhook event types.
//!
//! A note hook is delivered for comments on pull requests, commits and issues.
//! The bridge distinguishes two shapes:
//!
//! - `PullRequestComment` - the comment belongs to a pull request, and the
//!   event carries the pull request's merge state and branches
//! - `CommitComment` - anything else; the only build target is the comment's
//!   commit id, if present
//!
//! Representing the shape as an enum means "has pull request context" is
//! decided once, at parse time, instead of being re-checked at every use.

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, PullRequestInfo, RepoRef, Sha, User};

/// The action tag of a note hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteAction {
    /// A comment was posted. The only action that can trigger a build.
    Comment,
    /// Any other action the host may send (kept verbatim).
    Other(String),
}

impl NoteAction {
    /// Maps the wire value to an action.
    pub fn from_wire(action: &str) -> Self {
        match action {
            "comment" => NoteAction::Comment,
            other => NoteAction::Other(other.to_string()),
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, NoteAction::Comment)
    }
}

/// The comment that produced the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub user: User,
    /// The commit the comment was left on. Only set for commit comments.
    pub commit_id: Option<Sha>,
}

/// A comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestCommentEvent {
    pub action: NoteAction,
    pub comment: Comment,
    pub pull_request: PullRequestInfo,
    /// The project the hook is configured on.
    pub project: RepoRef,
    /// The repository the comment was made in. Its HTTP URL identifies the
    /// remote that earlier builds were fetched from.
    pub repository: RepoRef,
}

/// A comment without pull request context (commit or issue comment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitCommentEvent {
    pub action: NoteAction,
    pub comment: Comment,
    pub project: RepoRef,
    pub repository: Option<RepoRef>,
}

/// A parsed note hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteEvent {
    PullRequestComment(PullRequestCommentEvent),
    CommitComment(CommitCommentEvent),
}

impl NoteEvent {
    pub fn action(&self) -> &NoteAction {
        match self {
            NoteEvent::PullRequestComment(e) => &e.action,
            NoteEvent::CommitComment(e) => &e.action,
        }
    }

    pub fn comment(&self) -> &Comment {
        match self {
            NoteEvent::PullRequestComment(e) => &e.comment,
            NoteEvent::CommitComment(e) => &e.comment,
        }
    }

    /// Returns the pull request context, if the comment was made on one.
    pub fn pull_request(&self) -> Option<&PullRequestInfo> {
        match self {
            NoteEvent::PullRequestComment(e) => Some(&e.pull_request),
            NoteEvent::CommitComment(_) => None,
        }
    }

    pub fn project(&self) -> &RepoRef {
        match self {
            NoteEvent::PullRequestComment(e) => &e.project,
            NoteEvent::CommitComment(e) => &e.project,
        }
    }

    /// Returns the repository the comment was made in.
    ///
    /// Commit comments may omit it; the project is used instead.
    pub fn repository(&self) -> &RepoRef {
        match self {
            NoteEvent::PullRequestComment(e) => &e.repository,
            NoteEvent::CommitComment(e) => e.repository.as_ref().unwrap_or(&e.project),
        }
    }

    /// The branch builds for this event would merge into, if any.
    pub fn target_branch(&self) -> Option<&str> {
        self.pull_request().map(|pr| pr.target_branch())
    }

    /// Labels of the pull request; empty for commit comments.
    pub fn labels(&self) -> &[String] {
        self.pull_request()
            .map(|pr| pr.labels.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{commit_comment_event, pull_request_comment_event};

    #[test]
    fn action_from_wire() {
        assert_eq!(NoteAction::from_wire("comment"), NoteAction::Comment);
        assert_eq!(
            NoteAction::from_wire("edited"),
            NoteAction::Other("edited".to_string())
        );
        assert!(!NoteAction::from_wire("Comment").is_comment());
    }

    #[test]
    fn commit_comment_has_no_pull_request_context() {
        let event = commit_comment_event("retest", Some("deadbeef"));
        assert!(event.pull_request().is_none());
        assert_eq!(event.target_branch(), None);
        assert!(event.labels().is_empty());
    }

    #[test]
    fn commit_comment_falls_back_to_project_for_repository() {
        let event = commit_comment_event("retest", None);
        assert_eq!(event.repository(), event.project());
    }

    #[test]
    fn pull_request_comment_exposes_target_branch() {
        let event = pull_request_comment_event("retest", |_| {});
        assert_eq!(event.target_branch(), Some("master"));
        assert_eq!(event.comment().body, "retest");
    }
}
