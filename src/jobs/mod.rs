//! Collaborator seams.
//!
//! The trigger handler never talks to a CI server or Git host directly. It
//! reads a [`Job`] and its [`Build`]s, asks a [`BuildQueue`] to schedule work
//! and a [`StatusReporter`] to publish commit statuses. A host wires real
//! implementations in; [`memory`] provides recording ones for dry runs and
//! tests.
//!
//! Calls are synchronous. Retry policy belongs to the implementation; the
//! handler logs failures and moves on.

pub mod memory;
pub mod remote;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cause::CauseData;
use crate::trigger::{BuildState, BuildStatusUpdate, Revision};
use crate::types::PullRequestInfo;

pub use memory::{MemoryBuild, MemoryJob, RecordingClient, RecordingQueue, RecordingStatusReporter};
pub use remote::{RemoteConfig, RemoteUrl, RemoteUrlError, RevisionMarker};

/// A collaborator call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct CollaboratorError {
    pub operation: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        CollaboratorError {
            operation,
            message: message.into(),
        }
    }
}

/// The build queue refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not schedule build of {job}: {reason}")]
pub struct QueueError {
    pub job: String,
    pub reason: String,
}

/// Identifier the queue assigns to a scheduled build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueId(pub u64);

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a queue needs to start a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub revision: Revision,
    /// Recorded on the build so later comments can find and abort it.
    pub marker: RevisionMarker,
    pub cause: CauseData,
}

/// A build of a job, finished or running.
pub trait Build: Send + Sync {
    fn number(&self) -> u64;

    fn is_building(&self) -> bool;

    /// The revision the build was started for, if it recorded one.
    fn revision_marker(&self) -> Option<&RevisionMarker>;

    /// Aborts the build.
    fn stop(&self) -> Result<(), CollaboratorError>;
}

/// Posts comments on the Git host.
pub trait GitHostClient: Send + Sync {
    fn create_pull_request_note(
        &self,
        pr: &PullRequestInfo,
        text: &str,
    ) -> Result<(), CollaboratorError>;
}

/// A job's configured result publisher.
///
/// Only its presence matters here: jobs without one get no warning notes.
pub trait MessagePublisher: Send + Sync {}

/// A CI job that comment events can trigger.
pub trait Job: Send + Sync {
    fn full_name(&self) -> &str;

    /// True while any build of the job is running.
    fn is_building(&self) -> bool;

    /// Builds, newest first.
    fn builds(&self) -> Vec<&dyn Build>;

    fn client(&self) -> Option<&dyn GitHostClient>;

    fn publisher(&self) -> Option<&dyn MessagePublisher>;
}

/// Starts builds.
pub trait BuildQueue: Send + Sync {
    fn schedule(&self, job: &dyn Job, request: &BuildRequest) -> Result<QueueId, QueueError>;
}

/// Publishes commit statuses.
pub trait StatusReporter: Send + Sync {
    fn report(
        &self,
        update: &BuildStatusUpdate,
        state: BuildState,
        name: &str,
    ) -> Result<(), CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = CollaboratorError::new("stop build", "connection reset");
        assert_eq!(err.to_string(), "stop build failed: connection reset");

        let err = QueueError {
            job: "acme/widgets".to_string(),
            reason: "queue is full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not schedule build of acme/widgets: queue is full"
        );
    }

    #[test]
    fn queue_id_display() {
        assert_eq!(QueueId(7).to_string(), "#7");
    }
}
