//! Trigger configuration.
//!
//! Loaded from a JSON file, optionally overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NOTE_TRIGGER_REGEX` | `note_regex` |
//! | `NOTE_TRIGGER_PENDING_BUILD_NAME` | `pending_build_name` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filters::{
    BranchFilter, BuildInstructionFilter, PullRequestLabelFilter, TriggerFilters,
    compile_full_match,
};

pub const DEFAULT_NOTE_REGEX: &str = "Jenkins please retry a build";

pub const ENV_NOTE_REGEX: &str = "NOTE_TRIGGER_REGEX";
pub const ENV_PENDING_BUILD_NAME: &str = "NOTE_TRIGGER_PENDING_BUILD_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid regex in `{field}`: {source}")]
    InvalidRegex {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Per-job settings for comment-triggered builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// A comment must match this pattern in full to trigger. Unset or blank
    /// disables comment triggering.
    pub note_regex: Option<String>,

    /// Skip pull requests the host marks as not needing tests.
    pub skip_builds_when_test_not_required: bool,

    /// Abort running builds of the same pull request before scheduling.
    pub cancel_incomplete_build_on_same_pull_request: bool,

    /// Skip commits that were already built. Comment events always build.
    pub skip_last_commit_has_been_built: bool,

    /// Name of the pending commit status posted once a build is queued.
    pub pending_build_name: Option<String>,

    pub build_instruction_filter: BuildInstructionFilter,
    pub branch_filter: BranchFilter,
    pub label_filter: PullRequestLabelFilter,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig {
            note_regex: Some(DEFAULT_NOTE_REGEX.to_string()),
            skip_builds_when_test_not_required: false,
            cancel_incomplete_build_on_same_pull_request: false,
            skip_last_commit_has_been_built: false,
            pending_build_name: None,
            build_instruction_filter: BuildInstructionFilter::default(),
            branch_filter: BranchFilter::default(),
            label_filter: PullRequestLabelFilter::default(),
        }
    }
}

impl TriggerConfig {
    /// Reads and validates a JSON config file. Missing fields take their
    /// defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TriggerConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(regex) = lookup(ENV_NOTE_REGEX) {
            self.note_regex = Some(regex);
        }
        if let Some(name) = lookup(ENV_PENDING_BUILD_NAME) {
            self.pending_build_name = Some(name).filter(|n| !n.trim().is_empty());
        }
        self
    }

    /// Checks that every configured regex compiles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pattern) = self.note_regex.as_deref().filter(|p| !p.trim().is_empty()) {
            compile_full_match(pattern).map_err(|source| ConfigError::InvalidRegex {
                field: "note_regex",
                source,
            })?;
        }
        if let BranchFilter::RegexBased { pattern } = &self.branch_filter
            && !pattern.trim().is_empty()
        {
            compile_full_match(pattern).map_err(|source| ConfigError::InvalidRegex {
                field: "branch_filter.pattern",
                source,
            })?;
        }
        Ok(())
    }

    pub fn filters(&self) -> TriggerFilters {
        TriggerFilters {
            build_instruction: self.build_instruction_filter,
            branch: self.branch_filter.clone(),
            label: self.label_filter.clone(),
        }
    }

    pub fn with_note_regex(mut self, regex: Option<impl Into<String>>) -> Self {
        self.note_regex = regex.map(Into::into);
        self
    }

    pub fn with_skip_builds_when_test_not_required(mut self, skip: bool) -> Self {
        self.skip_builds_when_test_not_required = skip;
        self
    }

    pub fn with_cancel_incomplete_build_on_same_pull_request(mut self, cancel: bool) -> Self {
        self.cancel_incomplete_build_on_same_pull_request = cancel;
        self
    }

    pub fn with_skip_last_commit_has_been_built(mut self, skip: bool) -> Self {
        self.skip_last_commit_has_been_built = skip;
        self
    }

    pub fn with_pending_build_name(mut self, name: impl Into<String>) -> Self {
        self.pending_build_name = Some(name.into());
        self
    }

    pub fn with_build_instruction_filter(mut self, filter: BuildInstructionFilter) -> Self {
        self.build_instruction_filter = filter;
        self
    }

    pub fn with_branch_filter(mut self, filter: BranchFilter) -> Self {
        self.branch_filter = filter;
        self
    }

    pub fn with_label_filter(mut self, filter: PullRequestLabelFilter) -> Self {
        self.label_filter = filter;
        self
    }
}
