//! Cause records for comment-triggered builds.

use crate::cause::{ActionType, CauseData, CauseDataError};
use crate::webhooks::{CommitCommentEvent, NoteEvent, PullRequestCommentEvent};

/// Builds the cause record for `event`.
pub fn cause_for(event: &NoteEvent) -> Result<CauseData, CauseDataError> {
    match event {
        NoteEvent::PullRequestComment(e) => pull_request_cause(e),
        NoteEvent::CommitComment(e) => commit_comment_cause(e),
    }
}

fn commit_comment_cause(event: &CommitCommentEvent) -> Result<CauseData, CauseDataError> {
    let project = &event.project;
    let author = &event.comment.user;
    CauseData::builder()
        .with_action_type(ActionType::CommitComment)
        .with_source_project_id(project.id)
        .with_target_project_id(project.id)
        .with_branch("")
        .with_source_branch("")
        .with_target_branch("")
        .with_user_name(&author.username)
        .with_user_email(&author.email)
        .with_source_repo_homepage(&project.homepage)
        .with_source_repo_name(&project.name)
        .with_source_namespace(&project.namespace)
        .with_source_repo_url(&project.url)
        .with_source_repo_ssh_url(&project.ssh_url)
        .with_source_repo_http_url(&project.http_url)
        .with_pull_request_title("")
        .with_target_repo_name(&project.name)
        .with_target_namespace(&project.namespace)
        .with_target_repo_ssh_url(&project.ssh_url)
        .with_target_repo_http_url(&project.http_url)
        .with_triggered_by_user(&author.name)
        .with_sha(event.comment.commit_id.clone())
        .with_trigger_phrase(&event.comment.body)
        .with_path_with_namespace(&project.path_with_namespace)
        .build()
}

fn pull_request_cause(event: &PullRequestCommentEvent) -> Result<CauseData, CauseDataError> {
    let pr = &event.pull_request;
    let source = pr.source();
    let target = pr.target();
    let owner = &pr.head.user;
    CauseData::builder()
        .with_action_type(ActionType::Note)
        .with_source_project_id(pr.source_project_id())
        .with_target_project_id(pr.target_project_id())
        .with_branch(pr.source_branch())
        .with_source_branch(pr.source_branch())
        .with_target_branch(pr.target_branch())
        .with_user_name(&owner.name)
        .with_user_email(&owner.email)
        .with_source_repo_homepage(&source.homepage)
        .with_source_repo_name(&source.name)
        .with_source_namespace(&source.namespace)
        .with_source_repo_url(&source.url)
        .with_source_repo_ssh_url(&source.ssh_url)
        .with_source_repo_http_url(&source.http_url)
        .with_pull_request_title(&pr.title)
        .with_pull_request_description(pr.body.as_deref().unwrap_or_default())
        .with_pull_request_id(pr.id)
        .with_pull_request_iid(pr.number)
        .with_pull_request_target_project_id(pr.target_project_id())
        .with_target_repo_name(&target.name)
        .with_target_namespace(&target.namespace)
        .with_target_repo_ssh_url(&target.ssh_url)
        .with_target_repo_http_url(&target.http_url)
        .with_triggered_by_user(&owner.name)
        .with_last_commit(pr.merge_commit_sha.clone())
        .with_sha(pr.merge_commit_sha.clone())
        .with_after(pr.merge_commit_sha.clone())
        .with_ref(pr.merge_reference_name.clone())
        .with_target_project_url(&target.url)
        .with_trigger_phrase(&event.comment.body)
        .with_path_with_namespace(&target.path_with_namespace)
        .build()
}
