//! Build instruction filter.
//!
//! Looks for an explicit "do not build" instruction in free text, following
//! the `[ci-skip]` convention.

use serde::{Deserialize, Serialize};

/// The instruction that suppresses a build when found in a description.
pub const CI_SKIP_INSTRUCTION: &str = "[ci-skip]";

/// Decides whether free text allows a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildInstructionFilter {
    /// Never skip: every text allows a build.
    Never,
    /// Skip when the text contains `[ci-skip]` (case-insensitive).
    #[default]
    CiSkip,
}

impl BuildInstructionFilter {
    /// Returns true if `text` does not carry a skip instruction.
    ///
    /// Absent text never carries one.
    pub fn is_build_allow(&self, text: Option<&str>) -> bool {
        match (self, text) {
            (BuildInstructionFilter::Never, _) | (_, None) => true,
            (BuildInstructionFilter::CiSkip, Some(text)) => {
                !text.to_lowercase().contains(CI_SKIP_INSTRUCTION)
            }
        }
    }
}
