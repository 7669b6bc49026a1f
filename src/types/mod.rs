//! Core domain types shared by the parser, the filters and the trigger handler.

pub mod ids;
pub mod pr;
pub mod repo;

// Re-export commonly used types at the module level
pub use ids::{CommentId, PrNumber, ProjectId, PullRequestId, Sha};
pub use pr::{BranchData, PullRequestInfo};
pub use repo::{RepoRef, User};
