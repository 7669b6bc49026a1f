//! Webhook handling for comment ("note") events.
//!
//! This module provides:
//! - Typed note hook events, split by whether the comment has pull request context
//! - A payload parser producing those events

pub mod events;
pub mod parser;

pub use events::{
    Comment, CommitCommentEvent, NoteAction, NoteEvent, PullRequestCommentEvent,
};
pub use parser::{ParseError, parse_note_hook};
