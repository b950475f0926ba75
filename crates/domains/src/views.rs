//! # Outward Views
//!
//! Sanitized projections of the domain models. These are the only board types
//! that implement `Serialize`; neither the delete password nor the reported
//! flag has a field here, so they cannot reach a client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Reply, Thread};

/// Number of threads returned by the board listing.
pub const RECENT_THREADS_LIMIT: usize = 10;

/// Number of trailing replies kept on each thread in the board listing.
pub const RECENT_REPLIES_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<&Reply> for ReplyView {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id(),
            text: reply.text().to_owned(),
            created_on: reply.created_on(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
    /// Total replies on the thread, even when `replies` is truncated
    pub replycount: usize,
}

/// Board listing entry: the thread with only its most recent replies.
pub type ThreadSummary = ThreadView;

/// Thread page: the thread with every reply.
pub type ThreadDetail = ThreadView;

impl ThreadView {
    /// Projects a thread keeping every reply.
    pub fn detail(thread: &Thread) -> ThreadDetail {
        Self::with_replies(thread, thread.replies())
    }

    /// Projects a thread keeping the last `RECENT_REPLIES_LIMIT` replies,
    /// oldest of those first.
    pub fn summary(thread: &Thread) -> ThreadSummary {
        let replies = thread.replies();
        let start = replies.len().saturating_sub(RECENT_REPLIES_LIMIT);
        Self::with_replies(thread, &replies[start..])
    }

    fn with_replies(thread: &Thread, replies: &[Reply]) -> Self {
        Self {
            id: thread.id(),
            board: thread.board().to_owned(),
            text: thread.text().to_owned(),
            created_on: thread.created_on(),
            bumped_on: thread.bumped_on(),
            replies: replies.iter().map(ReplyView::from).collect(),
            replycount: thread.replies().len(),
        }
    }
}

/// Result of a password-gated action.
///
/// A wrong password is a routine answer, not a failure, so it lives here
/// rather than in [`crate::AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    IncorrectSecret,
}

impl Outcome {
    /// Plain-text marker understood by existing clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::IncorrectSecret => "incorrect password",
        }
    }
}

/// Plain-text marker for a successful report.
pub const REPORTED: &str = "reported";
