//! note-trigger - decides whether a Git host comment should start a CI build.
//!
//! A comment ("note") webhook is parsed into a [`webhooks::NoteEvent`], run
//! through the gates of [`trigger::NoteTriggerHandler`], and, when every gate
//! passes, scheduled on a [`jobs::BuildQueue`] together with a
//! [`cause::CauseData`] record explaining why the build exists.

pub mod cause;
pub mod config;
pub mod filters;
pub mod jobs;
pub mod trigger;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
