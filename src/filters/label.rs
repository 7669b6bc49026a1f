//! Pull request label filter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Decides whether a pull request's labels allow a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestLabelFilter {
    /// At least one of these must be present. Empty means no requirement.
    #[serde(default)]
    pub include: BTreeSet<String>,
    /// None of these may be present.
    #[serde(default)]
    pub exclude: BTreeSet<String>,
}

impl PullRequestLabelFilter {
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        PullRequestLabelFilter {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `labels` carry no excluded label and, when an include
    /// set is configured, at least one included label.
    pub fn is_allowed(&self, labels: &[String]) -> bool {
        let has_excluded = labels.iter().any(|l| self.exclude.contains(l));
        let has_included =
            self.include.is_empty() || labels.iter().any(|l| self.include.contains(l));
        !has_excluded && has_included
    }
}
