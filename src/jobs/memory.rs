//! In-memory collaborators that record every call.
//!
//! Used by the dry-run binary and by tests. Recorded calls serialize to JSON
//! so a dry run can print exactly what a real host would have been asked to
//! do.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{
    Build, BuildQueue, BuildRequest, CollaboratorError, GitHostClient, Job, MessagePublisher,
    QueueError, QueueId, RevisionMarker, StatusReporter,
};
use crate::trigger::{BuildState, BuildStatusUpdate};
use crate::types::{PrNumber, PullRequestInfo};

/// A build held in memory.
#[derive(Debug)]
pub struct MemoryBuild {
    number: u64,
    building: AtomicBool,
    marker: Option<RevisionMarker>,
    fail_stop: bool,
    stop_calls: AtomicU64,
}

impl MemoryBuild {
    pub fn new(number: u64, building: bool, marker: Option<RevisionMarker>) -> Self {
        MemoryBuild {
            number,
            building: AtomicBool::new(building),
            marker,
            fail_stop: false,
            stop_calls: AtomicU64::new(0),
        }
    }

    /// Makes every `stop` call fail.
    pub fn with_failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn stop_calls(&self) -> u64 {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl Build for MemoryBuild {
    fn number(&self) -> u64 {
        self.number
    }

    fn is_building(&self) -> bool {
        self.building.load(Ordering::SeqCst)
    }

    fn revision_marker(&self) -> Option<&RevisionMarker> {
        self.marker.as_ref()
    }

    fn stop(&self) -> Result<(), CollaboratorError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(CollaboratorError::new("stop build", "executor refused to abort"));
        }
        self.building.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A note posted through [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedNote {
    pub pull_request: PrNumber,
    pub text: String,
}

/// A Git host client that records notes instead of posting them.
#[derive(Debug, Default)]
pub struct RecordingClient {
    notes: Mutex<Vec<PostedNote>>,
    fail: bool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail (after recording it).
    pub fn failing() -> Self {
        RecordingClient {
            fail: true,
            ..Self::default()
        }
    }

    pub fn notes(&self) -> Vec<PostedNote> {
        self.notes.lock().clone()
    }
}

impl GitHostClient for RecordingClient {
    fn create_pull_request_note(
        &self,
        pr: &PullRequestInfo,
        text: &str,
    ) -> Result<(), CollaboratorError> {
        self.notes.lock().push(PostedNote {
            pull_request: pr.number,
            text: text.to_string(),
        });
        if self.fail {
            return Err(CollaboratorError::new("create note", "host unavailable"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PresentPublisher;

impl MessagePublisher for PresentPublisher {}

/// A job held in memory.
#[derive(Debug, Default)]
pub struct MemoryJob {
    full_name: String,
    builds: Vec<MemoryBuild>,
    client: Option<RecordingClient>,
    publisher: Option<PresentPublisher>,
}

impl MemoryJob {
    pub fn new(full_name: impl Into<String>) -> Self {
        MemoryJob {
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    /// Adds a build. Builds are listed in insertion order, so add the newest
    /// first.
    pub fn with_build(mut self, build: MemoryBuild) -> Self {
        self.builds.push(build);
        self
    }

    pub fn with_client(mut self, client: RecordingClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_publisher(mut self) -> Self {
        self.publisher = Some(PresentPublisher);
        self
    }

    pub fn build(&self, number: u64) -> Option<&MemoryBuild> {
        self.builds.iter().find(|b| b.number == number)
    }

    pub fn recording_client(&self) -> Option<&RecordingClient> {
        self.client.as_ref()
    }
}

impl Job for MemoryJob {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn is_building(&self) -> bool {
        self.builds.iter().any(|b| b.is_building())
    }

    fn builds(&self) -> Vec<&dyn Build> {
        self.builds.iter().map(|b| b as &dyn Build).collect()
    }

    fn client(&self) -> Option<&dyn GitHostClient> {
        self.client.as_ref().map(|c| c as &dyn GitHostClient)
    }

    fn publisher(&self) -> Option<&dyn MessagePublisher> {
        self.publisher.as_ref().map(|p| p as &dyn MessagePublisher)
    }
}

/// A request accepted by [`RecordingQueue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedBuild {
    pub id: QueueId,
    pub job: String,
    pub request: BuildRequest,
}

/// A build queue that records requests.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    queued: Mutex<Vec<QueuedBuild>>,
    next_id: AtomicU64,
    rejection: Option<String>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that refuses every request with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        RecordingQueue {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn queued(&self) -> Vec<QueuedBuild> {
        self.queued.lock().clone()
    }
}

impl BuildQueue for RecordingQueue {
    fn schedule(&self, job: &dyn Job, request: &BuildRequest) -> Result<QueueId, QueueError> {
        if let Some(reason) = &self.rejection {
            return Err(QueueError {
                job: job.full_name().to_string(),
                reason: reason.clone(),
            });
        }
        let id = QueueId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.queued.lock().push(QueuedBuild {
            id,
            job: job.full_name().to_string(),
            request: request.clone(),
        });
        Ok(id)
    }
}

/// A status report recorded by [`RecordingStatusReporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedStatus {
    pub update: BuildStatusUpdate,
    pub state: BuildState,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct RecordingStatusReporter {
    reports: Mutex<Vec<ReportedStatus>>,
    fail: bool,
}

impl RecordingStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail (after recording it).
    pub fn failing() -> Self {
        RecordingStatusReporter {
            fail: true,
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<ReportedStatus> {
        self.reports.lock().clone()
    }
}

impl StatusReporter for RecordingStatusReporter {
    fn report(
        &self,
        update: &BuildStatusUpdate,
        state: BuildState,
        name: &str,
    ) -> Result<(), CollaboratorError> {
        self.reports.lock().push(ReportedStatus {
            update: update.clone(),
            state,
            name: name.to_string(),
        });
        if self.fail {
            return Err(CollaboratorError::new("report status", "status API returned 502"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::pull_request;

    #[test]
    fn job_is_building_while_any_build_runs() {
        let job = MemoryJob::new("acme/widgets")
            .with_build(MemoryBuild::new(2, true, None))
            .with_build(MemoryBuild::new(1, false, None));
        assert!(job.is_building());
        job.builds()[0].stop().unwrap();
        assert!(!job.is_building());
        assert_eq!(job.build(2).unwrap().stop_calls(), 1);
    }

    #[test]
    fn failing_stop_leaves_build_running() {
        let build = MemoryBuild::new(1, true, None).with_failing_stop();
        assert!(build.stop().is_err());
        assert!(build.is_building());
    }

    #[test]
    fn client_and_publisher_are_optional() {
        let job = MemoryJob::new("acme/widgets");
        assert!(job.client().is_none());
        assert!(job.publisher().is_none());

        let job = job.with_client(RecordingClient::new()).with_publisher();
        assert!(job.client().is_some());
        assert!(job.publisher().is_some());
    }

    #[test]
    fn client_records_notes() {
        let client = RecordingClient::failing();
        assert!(client.create_pull_request_note(&pull_request(), "hello").is_err());
        assert_eq!(
            client.notes(),
            vec![PostedNote {
                pull_request: PrNumber(3),
                text: "hello".to_string()
            }]
        );
    }

    #[test]
    fn reporter_records_calls() {
        let reporter = RecordingStatusReporter::new();
        let update = BuildStatusUpdate::from_pull_request(&pull_request());
        reporter.report(&update, BuildState::Pending, "ci").unwrap();
        assert_eq!(reporter.reports().len(), 1);
        assert_eq!(reporter.reports()[0].state, BuildState::Pending);
    }
}
