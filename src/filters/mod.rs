//! Trigger filters.
//!
//! Each filter is an independent, side-effect-free predicate configured from
//! [`TriggerConfig`](crate::config::TriggerConfig). The trigger handler ANDs
//! them: any filter returning false suppresses the build.
//!
//! | Filter | Input | Rejects when |
//! |--------|-------|--------------|
//! | [`BuildInstructionFilter`] | pull request description | it carries a skip instruction |
//! | [`BranchFilter`] | target branch | the branch is excluded or not included |
//! | [`PullRequestLabelFilter`] | pull request labels | an excluded label is present, or no included one |

mod branch;
mod build_instruction;
mod label;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use branch::BranchFilter;
pub use build_instruction::{BuildInstructionFilter, CI_SKIP_INSTRUCTION};
pub use label::PullRequestLabelFilter;

/// The filters a job applies to comment events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFilters {
    #[serde(default)]
    pub build_instruction: BuildInstructionFilter,
    #[serde(default)]
    pub branch: BranchFilter,
    #[serde(default)]
    pub label: PullRequestLabelFilter,
}

/// Compiles `pattern` so that it only matches a whole input, not a substring.
pub(crate) fn compile_full_match(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Splits a comma-separated list, dropping blank entries.
pub(crate) fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_rejects_partial_matches() {
        let re = compile_full_match("retest").unwrap();
        assert!(re.is_match("retest"));
        assert!(!re.is_match("please retest"));
        assert!(!re.is_match("retest now"));
    }

    #[test]
    fn full_match_wraps_alternations() {
        // Without grouping, `^a|b$` would accept "ax" and "xb".
        let re = compile_full_match("a|b").unwrap();
        assert!(re.is_match("a"));
        assert!(re.is_match("b"));
        assert!(!re.is_match("ax"));
        assert!(!re.is_match("xb"));
    }

    #[test]
    fn split_list_trims_and_drops_blanks() {
        let items: Vec<_> = split_list(" master, ,release/*,").collect();
        assert_eq!(items, vec!["master", "release/*"]);
    }
}
