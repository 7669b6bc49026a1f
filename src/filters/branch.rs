//! Branch filter.
//!
//! Restricts builds to target branches, either by comma-separated wildcard
//! name lists or by a regular expression.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{compile_full_match, split_list};

/// Decides whether a branch may be built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BranchFilter {
    /// Every branch is allowed.
    #[default]
    All,

    /// Comma-separated wildcard patterns (e.g. `master, release/*`).
    ///
    /// A branch is allowed if it matches no exclude pattern and, when the
    /// include list is non-empty, at least one include pattern.
    NameBased {
        #[serde(default)]
        include: String,
        #[serde(default)]
        exclude: String,
    },

    /// A regular expression that must match the whole branch name.
    RegexBased { pattern: String },
}

impl BranchFilter {
    /// Returns true if `branch` may be built.
    ///
    /// Events without a branch (commit comments) pass unless the filter
    /// names branches to include.
    pub fn is_branch_allowed(&self, branch: Option<&str>) -> bool {
        match self {
            BranchFilter::All => true,
            BranchFilter::NameBased { include, exclude } => {
                let Some(branch) = branch else {
                    return split_list(include).next().is_none();
                };
                !matches_any(exclude, branch) && {
                    let mut includes = split_list(include).peekable();
                    includes.peek().is_none() || includes.any(|p| matches_pattern(p, branch))
                }
            }
            BranchFilter::RegexBased { pattern } => {
                let Some(branch) = branch else {
                    return true;
                };
                if pattern.trim().is_empty() {
                    return true;
                }
                match compile_full_match(pattern) {
                    Ok(re) => re.is_match(branch),
                    Err(err) => {
                        warn!(pattern = %pattern, error = %err, "Invalid branch regex; rejecting branch");
                        false
                    }
                }
            }
        }
    }
}

fn matches_any(list: &str, branch: &str) -> bool {
    split_list(list).any(|pattern| matches_pattern(pattern, branch))
}

fn matches_pattern(pattern: &str, branch: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(pattern) => pattern.matches(branch),
        Err(err) => {
            warn!(pattern = %pattern, error = %err, "Invalid branch pattern; treating as literal");
            pattern == branch
        }
    }
}
