//! The comment trigger handler.
//!
//! [`NoteTriggerHandler::handle`] runs a comment event through a fixed
//! sequence of gates and stops at the first one that says no:
//!
//! | Gate | Skips when |
//! |------|------------|
//! | trigger phrase | action is not `comment`, or the body does not fully match the configured regex |
//! | mergeability | the pull request has conflicts (a warning note is posted) |
//! | test requirement | enabled, and the pull request does not need tests |
//! | build instruction | the pull request description asks to skip CI |
//! | commit skip | never, for comment events |
//! | branch / label | the target branch or the labels are filtered out |
//!
//! Before the filters, running builds of the same pull request may be
//! aborted. A build that passes every gate is handed to the [`BuildQueue`]
//! with a revision marker and a cause record.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use super::cause::cause_for;
use super::revision::{NoRevisionToBuild, Revision, resolve_revision};
use super::status::{BuildState, BuildStatusUpdate};
use crate::cause::{CauseData, CauseDataError};
use crate::config::TriggerConfig;
use crate::filters::{TriggerFilters, compile_full_match};
use crate::jobs::{
    BuildQueue, BuildRequest, Job, QueueError, QueueId, RemoteConfig, RemoteUrl, RevisionMarker,
    StatusReporter,
};
use crate::webhooks::{NoteEvent, PullRequestCommentEvent};

/// Posted on a pull request that cannot be merged.
pub const MERGE_CONFLICT_NOTE: &str = ":bangbang: This pull request can not be merge! The build will not be triggered. Please manual merge conflict.";

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("no revision to build")]
    NoRevisionToBuild,

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Cause(#[from] CauseDataError),
}

impl From<NoRevisionToBuild> for TriggerError {
    fn from(_: NoRevisionToBuild) -> Self {
        TriggerError::NoRevisionToBuild
    }
}

/// The gate that stopped an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidTrigger,
    NotMergeable,
    TestNotRequired,
    CiSkip,
    CommitSkip,
    BranchNotAllowed,
    LabelNotAllowed,
}

/// A build handed to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledBuild {
    pub queue_id: QueueId,
    pub revision: Revision,
    pub cause: CauseData,
    /// Numbers of running builds aborted in favour of this one.
    pub aborted_builds: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    Skipped { reason: SkipReason },
    Scheduled(ScheduledBuild),
}

impl TriggerOutcome {
    fn skipped(reason: SkipReason) -> Self {
        TriggerOutcome::Skipped { reason }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, TriggerOutcome::Scheduled(_))
    }
}

/// Decides what a comment event does to a job.
#[derive(Debug, Clone)]
pub struct NoteTriggerHandler {
    note_pattern: Option<Regex>,
    skip_when_test_not_required: bool,
    cancel_incomplete_builds: bool,
    skip_last_commit_has_been_built: bool,
    pending_build_name: Option<String>,
}

impl NoteTriggerHandler {
    /// Creates a handler. An unset, blank or invalid comment regex disables
    /// triggering.
    pub fn new(config: &TriggerConfig) -> Self {
        let note_pattern = match config.note_regex.as_deref() {
            Some(pattern) if !pattern.trim().is_empty() => match compile_full_match(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern, error = %e, "Invalid comment regex, comment triggering disabled");
                    None
                }
            },
            _ => {
                debug!("No comment regex configured, comment triggering disabled");
                None
            }
        };
        NoteTriggerHandler {
            note_pattern,
            skip_when_test_not_required: config.skip_builds_when_test_not_required,
            cancel_incomplete_builds: config.cancel_incomplete_build_on_same_pull_request,
            skip_last_commit_has_been_built: config.skip_last_commit_has_been_built,
            pending_build_name: config
                .pending_build_name
                .clone()
                .filter(|n| !n.trim().is_empty()),
        }
    }

    /// True when the event is a posted comment whose whole body matches the
    /// trigger phrase.
    pub fn is_valid_trigger(&self, event: &NoteEvent) -> bool {
        event.action().is_comment()
            && self
                .note_pattern
                .as_ref()
                .is_some_and(|re| re.is_match(&event.comment().body))
    }

    /// Runs `event` through the gates and schedules a build if all pass.
    ///
    /// # Arguments
    ///
    /// * `job` - The job the event was delivered to
    /// * `event` - The parsed comment event
    /// * `filters` - The job's branch, label and build-instruction filters
    /// * `queue` - Where builds are scheduled
    /// * `status` - Where the pending status is reported
    ///
    /// # Errors
    ///
    /// Returns an error when no revision can be determined, the cause record
    /// cannot be built, or the queue rejects the request. Failures of other
    /// collaborators are logged and do not change the outcome.
    pub fn handle(
        &self,
        job: &dyn Job,
        event: &NoteEvent,
        filters: &TriggerFilters,
        queue: &dyn BuildQueue,
        status: &dyn StatusReporter,
    ) -> Result<TriggerOutcome, TriggerError> {
        let span = info_span!(
            "note_trigger",
            job = job.full_name(),
            pr = ?event.pull_request().map(|pr| pr.number.0),
        );
        let _enter = span.enter();

        if !self.is_valid_trigger(event) {
            debug!("Comment is not a trigger phrase");
            return Ok(TriggerOutcome::skipped(SkipReason::InvalidTrigger));
        }

        if let Some(pr) = event.pull_request()
            && !pr.mergeable
        {
            info!("Pull request is not mergeable, not triggering");
            if job.publisher().is_some()
                && let Some(client) = job.client()
                && let Err(e) = client.create_pull_request_note(pr, MERGE_CONFLICT_NOTE)
            {
                warn!(error = %e, "Failed to post merge conflict note");
            }
            return Ok(TriggerOutcome::skipped(SkipReason::NotMergeable));
        }

        if self.skip_when_test_not_required
            && event.pull_request().is_some_and(|pr| !pr.need_test)
        {
            info!("Pull request does not need tests, skipping");
            return Ok(TriggerOutcome::skipped(SkipReason::TestNotRequired));
        }

        if self.is_ci_skip(event, filters) {
            info!("Skipping due to build instruction in pull request description");
            return Ok(TriggerOutcome::skipped(SkipReason::CiSkip));
        }

        if self.is_commit_skip(event) {
            info!("Commit was already built, skipping");
            return Ok(TriggerOutcome::skipped(SkipReason::CommitSkip));
        }

        let aborted_builds = match event {
            NoteEvent::PullRequestComment(e) if self.cancel_incomplete_builds => {
                cancel_incomplete_builds(job, e)
            }
            _ => Vec::new(),
        };

        let target_branch = event.target_branch();
        if !filters.branch.is_branch_allowed(target_branch) {
            info!(branch = ?target_branch, "Branch is not allowed");
            return Ok(TriggerOutcome::skipped(SkipReason::BranchNotAllowed));
        }
        if !filters.label.is_allowed(event.labels()) {
            info!(labels = ?event.labels(), "Labels are not allowed");
            return Ok(TriggerOutcome::skipped(SkipReason::LabelNotAllowed));
        }

        let revision = resolve_revision(event).inspect_err(|_| {
            warn!("Unable to determine a revision to build");
        })?;
        let cause = cause_for(event)?;
        let request = BuildRequest {
            marker: RevisionMarker::new(revision.as_str(), origin_of(event)),
            revision: revision.clone(),
            cause: cause.clone(),
        };

        let queue_id = queue.schedule(job, &request)?;
        info!(
            revision = %revision,
            queue_id = %queue_id,
            cause = %cause.short_description(),
            "Scheduled build"
        );

        if let (Some(name), Some(pr)) = (&self.pending_build_name, event.pull_request()) {
            let update = BuildStatusUpdate::from_pull_request(pr);
            if let Err(e) = status.report(&update, BuildState::Pending, name) {
                warn!(error = %e, "Failed to report pending status");
            }
        }

        Ok(TriggerOutcome::Scheduled(ScheduledBuild {
            queue_id,
            revision,
            cause,
            aborted_builds,
        }))
    }

    fn is_ci_skip(&self, event: &NoteEvent, filters: &TriggerFilters) -> bool {
        event
            .pull_request()
            .is_some_and(|pr| !filters.build_instruction.is_build_allow(pr.body.as_deref()))
    }

    /// Comment events are explicit requests, so they always build, even when
    /// the job skips commits it has already built.
    fn is_commit_skip(&self, _event: &NoteEvent) -> bool {
        if self.skip_last_commit_has_been_built {
            debug!("Ignoring last-commit skip for comment event");
        }
        false
    }
}

/// The remote a new build's revision comes from.
fn origin_of(event: &NoteEvent) -> Option<RemoteUrl> {
    let repository = event.repository();
    RemoteUrl::parse(&repository.http_url)
        .inspect_err(|e| warn!(error = %e, "Parsing repo url error"))
        .ok()
}

/// Aborts running builds started for the pull request's current merge
/// reference. Returns the numbers of the builds that were stopped.
fn cancel_incomplete_builds(job: &dyn Job, event: &PullRequestCommentEvent) -> Vec<u64> {
    let Some(merge_ref) = event.pull_request.merge_reference_name.as_deref() else {
        return Vec::new();
    };
    let repository = &event.repository;
    let remotes = match RemoteConfig::new(&repository.name, &repository.http_url) {
        Ok(remote) => vec![remote],
        Err(e) => {
            warn!(error = %e, "Parsing repo url error");
            return Vec::new();
        }
    };

    let mut aborted = Vec::new();
    for build in job.builds() {
        if !job.is_building() {
            break;
        }
        if !build.is_building() {
            continue;
        }
        let Some(marker) = build.revision_marker() else {
            continue;
        };
        if marker.can_originate_from(&remotes) && marker.commit == merge_ref {
            warn!(build = build.number(), revision = merge_ref, "Abort incomplete build");
            match build.stop() {
                Ok(()) => aborted.push(build.number()),
                Err(e) => {
                    warn!(build = build.number(), error = %e, "Unable to abort incomplete build");
                }
            }
        }
    }
    aborted
}
