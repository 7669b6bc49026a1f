//! Turning comment events into builds.

mod cause;
mod handler;
mod revision;
mod status;

pub use cause::cause_for;
pub use handler::{
    MERGE_CONFLICT_NOTE, NoteTriggerHandler, ScheduledBuild, SkipReason, TriggerError,
    TriggerOutcome,
};
pub use revision::{NoRevisionToBuild, Revision, resolve_revision};
pub use status::{BuildState, BuildStatusUpdate};
