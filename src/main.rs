//! Dry-run driver: feeds one comment webhook payload through the trigger
//! handler against an in-memory job and prints what would have happened.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use note_trigger::config::TriggerConfig;
use note_trigger::jobs::{
    MemoryBuild, MemoryJob, RecordingClient, RecordingQueue, RecordingStatusReporter, RemoteUrl,
    RevisionMarker,
};
use note_trigger::trigger::NoteTriggerHandler;
use note_trigger::webhooks::parse_note_hook;

#[derive(Debug, Parser)]
#[command(name = "note-trigger", version, about)]
struct Args {
    /// JSON trigger configuration. Defaults apply when omitted.
    #[arg(long, env = "NOTE_TRIGGER_CONFIG")]
    config: Option<PathBuf>,

    /// The note hook payload to evaluate.
    #[arg(long)]
    event: PathBuf,

    /// Name of the simulated job.
    #[arg(long, default_value = "dry-run")]
    job: String,

    /// A running build of the job, as NUMBER=REVISION. May be repeated;
    /// list the newest build first.
    #[arg(long = "building-build", value_parser = parse_building_build)]
    building_builds: Vec<(u64, String)>,
}

fn parse_building_build(s: &str) -> Result<(u64, String), String> {
    let (number, revision) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NUMBER=REVISION, got `{s}`"))?;
    let number = number
        .trim()
        .parse()
        .map_err(|e| format!("invalid build number `{number}`: {e}"))?;
    Ok((number, revision.trim().to_string()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,note_trigger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TriggerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TriggerConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    let payload = std::fs::read(&args.event)
        .with_context(|| format!("reading event from {}", args.event.display()))?;
    let Some(event) = parse_note_hook(&payload).context("parsing note hook")? else {
        println!("{}", json!({ "outcome": "ignored" }));
        return Ok(());
    };

    let origin = RemoteUrl::parse(&event.repository().http_url).ok();
    let job = args.building_builds.iter().fold(
        MemoryJob::new(&args.job)
            .with_client(RecordingClient::new())
            .with_publisher(),
        |job, (number, revision)| {
            job.with_build(MemoryBuild::new(
                *number,
                true,
                Some(RevisionMarker::new(revision, origin.clone())),
            ))
        },
    );

    let handler = NoteTriggerHandler::new(&config);
    let queue = RecordingQueue::new();
    let status = RecordingStatusReporter::new();
    let outcome = handler.handle(&job, &event, &config.filters(), &queue, &status)?;

    let report = json!({
        "result": outcome,
        "notes": job.recording_client().map(RecordingClient::notes).unwrap_or_default(),
        "queued": queue.queued(),
        "statuses": status.reports(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_build_argument() {
        assert_eq!(
            parse_building_build("7=refs/pull/3/MERGE"),
            Ok((7, "refs/pull/3/MERGE".to_string()))
        );
        assert!(parse_building_build("refs/pull/3/MERGE").is_err());
        assert!(parse_building_build("x=abc").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "note-trigger",
            "--event",
            "hook.json",
            "--building-build",
            "2=abc",
            "--building-build",
            "1=def",
        ])
        .unwrap();
        assert_eq!(args.event, PathBuf::from("hook.json"));
        assert_eq!(args.job, "dry-run");
        assert_eq!(args.building_builds.len(), 2);
    }
}
