//! Choosing the revision a triggered build checks out.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Sha;
use crate::webhooks::NoteEvent;

/// What a build should check out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Revision {
    Commit(Sha),
    /// A symbolic ref such as `refs/pull/3/MERGE`.
    MergeRef(String),
}

impl Revision {
    pub fn as_str(&self) -> &str {
        match self {
            Revision::Commit(sha) => sha.as_str(),
            Revision::MergeRef(name) => name,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The event names nothing a build could check out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no revision to build")]
pub struct NoRevisionToBuild;

/// Picks the revision for `event`.
///
/// Preference order: the pull request's merge commit, its merge reference,
/// then the commented commit. Blank values count as absent.
pub fn resolve_revision(event: &NoteEvent) -> Result<Revision, NoRevisionToBuild> {
    if let Some(pr) = event.pull_request() {
        if let Some(sha) = pr.merge_commit_sha.as_ref().filter(|s| !s.is_blank()) {
            return Ok(Revision::Commit(sha.clone()));
        }
        if let Some(name) = pr
            .merge_reference_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
        {
            return Ok(Revision::MergeRef(name.to_string()));
        }
    }
    match event.comment().commit_id.as_ref() {
        Some(sha) if !sha.is_blank() => Ok(Revision::Commit(sha.clone())),
        _ => Err(NoRevisionToBuild),
    }
}
