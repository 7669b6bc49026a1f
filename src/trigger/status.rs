//! Commit status updates reported for triggered builds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, PullRequestInfo, Sha};

/// Where a commit status should be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatusUpdate {
    pub project_id: ProjectId,
    pub sha: Option<Sha>,
    #[serde(rename = "ref")]
    pub ref_name: String,
}

impl BuildStatusUpdate {
    /// Status coordinates for a pull request: the source project, the merge
    /// commit and the target branch.
    pub fn from_pull_request(pr: &PullRequestInfo) -> Self {
        BuildStatusUpdate {
            project_id: pr.source_project_id(),
            sha: pr.merge_commit_sha.clone(),
            ref_name: pr.target_branch().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildState::Pending => "pending",
            BuildState::Running => "running",
            BuildState::Success => "success",
            BuildState::Failed => "failed",
            BuildState::Canceled => "canceled",
        };
        f.write_str(s)
    }
}
