//! Pull request snapshots carried by comment events.
//!
//! A [`PullRequestInfo`] is built fresh from each inbound event and never
//! mutated afterwards; it is dropped once the triggering decision completes.

use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, ProjectId, PullRequestId, Sha};
use super::repo::{RepoRef, User};

/// One side (head or base) of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchData {
    /// `owner:branch` style label.
    pub label: String,
    /// The branch name.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// The branch tip.
    pub sha: Option<Sha>,
    /// The user owning this side of the pull request.
    pub user: User,
    /// The repository this side lives in.
    pub repo: RepoRef,
}

/// Pull request context of a comment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub id: PullRequestId,
    pub number: PrNumber,
    pub title: String,
    /// The description. Checked for build instructions such as `[ci-skip]`.
    pub body: Option<String>,

    /// The speculative merge of source into target, when the host computed one.
    pub merge_commit_sha: Option<Sha>,

    /// Symbolic ref pointing at the merge state (e.g. `refs/pull/1/MERGE`).
    pub merge_reference_name: Option<String>,

    /// False when the host detected conflicts.
    pub mergeable: bool,

    /// Whether the pull request is flagged as requiring tests.
    pub need_test: bool,

    pub labels: Vec<String>,

    /// The source side.
    pub head: BranchData,

    /// The target side.
    pub base: BranchData,
}

impl PullRequestInfo {
    pub fn source_branch(&self) -> &str {
        &self.head.ref_name
    }

    pub fn target_branch(&self) -> &str {
        &self.base.ref_name
    }

    pub fn source(&self) -> &RepoRef {
        &self.head.repo
    }

    pub fn target(&self) -> &RepoRef {
        &self.base.repo
    }

    pub fn source_project_id(&self) -> ProjectId {
        self.head.repo.id
    }

    pub fn target_project_id(&self) -> ProjectId {
        self.base.repo.id
    }
}
