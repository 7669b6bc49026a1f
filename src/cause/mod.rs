//! Build cause records.
//!
//! A [`CauseData`] is the audit trail of why a build exists. It is assembled
//! once through [`CauseDataBuilder`], attached to the submitted build, and
//! never changed afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PrNumber, ProjectId, PullRequestId, Sha};

/// The kind of event that caused a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Push,
    TagPush,
    PullRequest,
    /// A comment on a pull request.
    Note,
    /// A comment on a bare commit.
    CommitComment,
    Pipeline,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Push => "PUSH",
            ActionType::TagPush => "TAG_PUSH",
            ActionType::PullRequest => "PULL_REQUEST",
            ActionType::Note => "NOTE",
            ActionType::CommitComment => "COMMIT_COMMENT",
            ActionType::Pipeline => "PIPELINE",
        };
        f.write_str(s)
    }
}

/// Why a build was triggered.
///
/// Fields that do not apply to an event shape are empty strings or `None`,
/// never missing, so the record serializes the same way for every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseData {
    pub action_type: ActionType,
    pub source_project_id: ProjectId,
    pub target_project_id: ProjectId,
    pub branch: String,
    pub source_branch: String,
    /// Login of the user the change is attributed to.
    pub user_name: String,
    pub user_email: String,
    pub source_repo_homepage: String,
    pub source_repo_name: String,
    pub source_namespace: String,
    pub source_repo_url: String,
    pub source_repo_ssh_url: String,
    pub source_repo_http_url: String,
    pub pull_request_title: String,
    pub pull_request_description: String,
    pub pull_request_id: Option<PullRequestId>,
    pub pull_request_iid: Option<PrNumber>,
    pub pull_request_target_project_id: Option<ProjectId>,
    pub target_branch: String,
    pub target_repo_name: String,
    pub target_namespace: String,
    pub target_repo_ssh_url: String,
    pub target_repo_http_url: String,
    /// Display name of the user the build is attributed to.
    pub triggered_by_user: String,
    pub last_commit: Option<Sha>,
    pub sha: Option<Sha>,
    pub after: Option<Sha>,
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
    pub target_project_url: String,
    /// The comment text that invoked the trigger.
    pub trigger_phrase: String,
    pub path_with_namespace: String,
}

impl CauseData {
    /// Starts building a cause record.
    pub fn builder() -> CauseDataBuilder {
        CauseDataBuilder::default()
    }

    /// One-line summary used in logs and build descriptions.
    pub fn short_description(&self) -> String {
        match (self.action_type, self.pull_request_iid) {
            (ActionType::Note, Some(iid)) => format!(
                "Triggered by {} comment on pull request {}: {}",
                self.triggered_by_user, iid, self.trigger_phrase
            ),
            (ActionType::CommitComment, _) => format!(
                "Triggered by {} comment on commit {}",
                self.triggered_by_user,
                self.sha.as_ref().map_or("?", |s| s.short())
            ),
            (action, _) => format!("Triggered by {} ({})", self.triggered_by_user, action),
        }
    }
}

/// A required field was never set on the builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cause data is missing required field `{0}`")]
pub struct CauseDataError(pub &'static str);

/// Builder for [`CauseData`].
///
/// Required fields must be set explicitly, even when the value is empty;
/// everything else defaults to empty.
#[derive(Debug, Clone, Default)]
pub struct CauseDataBuilder {
    action_type: Option<ActionType>,
    source_project_id: ProjectId,
    target_project_id: ProjectId,
    branch: String,
    source_branch: Option<String>,
    target_branch: Option<String>,
    user_name: Option<String>,
    user_email: String,
    source_repo_homepage: String,
    source_repo_name: String,
    source_namespace: String,
    source_repo_url: String,
    source_repo_ssh_url: String,
    source_repo_http_url: String,
    pull_request_title: String,
    pull_request_description: String,
    pull_request_id: Option<PullRequestId>,
    pull_request_iid: Option<PrNumber>,
    pull_request_target_project_id: Option<ProjectId>,
    target_repo_name: String,
    target_namespace: String,
    target_repo_ssh_url: String,
    target_repo_http_url: String,
    triggered_by_user: String,
    last_commit: Option<Sha>,
    sha: Option<Sha>,
    after: Option<Sha>,
    ref_name: Option<String>,
    target_project_url: String,
    trigger_phrase: String,
    path_with_namespace: String,
}

impl CauseDataBuilder {
    pub fn with_action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = Some(action_type);
        self
    }

    pub fn with_source_project_id(mut self, id: ProjectId) -> Self {
        self.source_project_id = id;
        self
    }

    pub fn with_target_project_id(mut self, id: ProjectId) -> Self {
        self.target_project_id = id;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_source_branch(mut self, branch: impl Into<String>) -> Self {
        self.source_branch = Some(branch.into());
        self
    }

    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = email.into();
        self
    }

    pub fn with_source_repo_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.source_repo_homepage = homepage.into();
        self
    }

    pub fn with_source_repo_name(mut self, name: impl Into<String>) -> Self {
        self.source_repo_name = name.into();
        self
    }

    pub fn with_source_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.source_namespace = namespace.into();
        self
    }

    pub fn with_source_repo_url(mut self, url: impl Into<String>) -> Self {
        self.source_repo_url = url.into();
        self
    }

    pub fn with_source_repo_ssh_url(mut self, url: impl Into<String>) -> Self {
        self.source_repo_ssh_url = url.into();
        self
    }

    pub fn with_source_repo_http_url(mut self, url: impl Into<String>) -> Self {
        self.source_repo_http_url = url.into();
        self
    }

    pub fn with_pull_request_title(mut self, title: impl Into<String>) -> Self {
        self.pull_request_title = title.into();
        self
    }

    pub fn with_pull_request_description(mut self, description: impl Into<String>) -> Self {
        self.pull_request_description = description.into();
        self
    }

    pub fn with_pull_request_id(mut self, id: PullRequestId) -> Self {
        self.pull_request_id = Some(id);
        self
    }

    pub fn with_pull_request_iid(mut self, iid: PrNumber) -> Self {
        self.pull_request_iid = Some(iid);
        self
    }

    pub fn with_pull_request_target_project_id(mut self, id: ProjectId) -> Self {
        self.pull_request_target_project_id = Some(id);
        self
    }

    pub fn with_target_repo_name(mut self, name: impl Into<String>) -> Self {
        self.target_repo_name = name.into();
        self
    }

    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = namespace.into();
        self
    }

    pub fn with_target_repo_ssh_url(mut self, url: impl Into<String>) -> Self {
        self.target_repo_ssh_url = url.into();
        self
    }

    pub fn with_target_repo_http_url(mut self, url: impl Into<String>) -> Self {
        self.target_repo_http_url = url.into();
        self
    }

    pub fn with_triggered_by_user(mut self, user: impl Into<String>) -> Self {
        self.triggered_by_user = user.into();
        self
    }

    pub fn with_last_commit(mut self, sha: Option<Sha>) -> Self {
        self.last_commit = sha;
        self
    }

    pub fn with_sha(mut self, sha: Option<Sha>) -> Self {
        self.sha = sha;
        self
    }

    pub fn with_after(mut self, sha: Option<Sha>) -> Self {
        self.after = sha;
        self
    }

    pub fn with_ref(mut self, ref_name: Option<String>) -> Self {
        self.ref_name = ref_name;
        self
    }

    pub fn with_target_project_url(mut self, url: impl Into<String>) -> Self {
        self.target_project_url = url.into();
        self
    }

    pub fn with_trigger_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.trigger_phrase = phrase.into();
        self
    }

    pub fn with_path_with_namespace(mut self, path: impl Into<String>) -> Self {
        self.path_with_namespace = path.into();
        self
    }

    /// Finishes the record.
    ///
    /// # Errors
    ///
    /// Returns the name of the first required field that was never set.
    pub fn build(self) -> Result<CauseData, CauseDataError> {
        Ok(CauseData {
            action_type: self.action_type.ok_or(CauseDataError("action_type"))?,
            source_project_id: self.source_project_id,
            target_project_id: self.target_project_id,
            branch: self.branch,
            source_branch: self.source_branch.ok_or(CauseDataError("source_branch"))?,
            user_name: self.user_name.ok_or(CauseDataError("user_name"))?,
            user_email: self.user_email,
            source_repo_homepage: self.source_repo_homepage,
            source_repo_name: self.source_repo_name,
            source_namespace: self.source_namespace,
            source_repo_url: self.source_repo_url,
            source_repo_ssh_url: self.source_repo_ssh_url,
            source_repo_http_url: self.source_repo_http_url,
            pull_request_title: self.pull_request_title,
            pull_request_description: self.pull_request_description,
            pull_request_id: self.pull_request_id,
            pull_request_iid: self.pull_request_iid,
            pull_request_target_project_id: self.pull_request_target_project_id,
            target_branch: self.target_branch.ok_or(CauseDataError("target_branch"))?,
            target_repo_name: self.target_repo_name,
            target_namespace: self.target_namespace,
            target_repo_ssh_url: self.target_repo_ssh_url,
            target_repo_http_url: self.target_repo_http_url,
            triggered_by_user: self.triggered_by_user,
            last_commit: self.last_commit,
            sha: self.sha,
            after: self.after,
            ref_name: self.ref_name,
            target_project_url: self.target_project_url,
            trigger_phrase: self.trigger_phrase,
            path_with_namespace: self.path_with_namespace,
        })
    }
}
