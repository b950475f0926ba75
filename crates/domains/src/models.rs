//! # Domain Models
//!
//! These structs represent the core entities of the board: a `Thread` and the
//! ordered `Reply` records it owns. We use UUID v7 for time-ordered, globally
//! unique identification.
//!
//! Fields are private. A thread can only be built through [`Thread::new`]
//! (validated input) or [`Thread::restore`] (already-persisted state), and can
//! only change through the mutators below, so the lifecycle invariants hold
//! for every value of these types:
//!
//! - `bumped_on >= created_on`, and `bumped_on` never moves backward
//! - `reported` only ever goes from `false` to `true`
//! - delete secrets are fixed at creation and have no outward representation
//! - a soft-deleted reply keeps its id; only its text becomes [`DELETED_TEXT`]

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Text that replaces a reply body once it has been soft-deleted.
pub const DELETED_TEXT: &str = "[deleted]";

/// The current time cut to whole microseconds, the finest precision a
/// Postgres `TIMESTAMPTZ` keeps. Stamping with this makes stored timestamps
/// read back equal to what was returned at write time.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The plaintext password a poster supplies to later prove ownership of a post.
///
/// Never serialized and redacted in `Debug` output.
pub struct DeleteSecret(SecretString);

impl DeleteSecret {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::ValidationError(
                "delete_password must not be empty".into(),
            ));
        }
        Ok(Self(SecretString::from(raw)))
    }

    /// Constant-time comparison against a candidate supplied by a client.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0
            .expose_secret()
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }

    /// Raw value, for storage adapters only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for DeleteSecret {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.0.expose_secret().to_owned()))
    }
}

impl fmt::Debug for DeleteSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeleteSecret([REDACTED])")
    }
}

/// A reply inside a thread. Never exists outside of its parent thread.
#[derive(Debug, Clone)]
pub struct Reply {
    id: Uuid,
    text: String,
    created_on: DateTime<Utc>,
    delete_password: DeleteSecret,
    reported: bool,
}

impl Reply {
    /// Builds a fresh, unreported reply stamped with `now`.
    pub fn new(text: impl Into<String>, delete_password: &str, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            text: non_empty("text", text.into())?,
            created_on: now,
            delete_password: DeleteSecret::new(delete_password)?,
            reported: false,
        })
    }

    /// Rebuilds a reply from persisted fields.
    pub fn restore(
        id: Uuid,
        text: String,
        created_on: DateTime<Utc>,
        delete_password: DeleteSecret,
        reported: bool,
    ) -> Self {
        Self {
            id,
            text,
            created_on,
            delete_password,
            reported,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn delete_password(&self) -> &DeleteSecret {
        &self.delete_password
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn is_deleted(&self) -> bool {
        self.text == DELETED_TEXT
    }

    /// Sets the reported flag. Returns `true` if the flag changed.
    pub fn mark_reported(&mut self) -> bool {
        !std::mem::replace(&mut self.reported, true)
    }

    /// Replaces the body with [`DELETED_TEXT`]. Returns `true` if the text changed.
    pub fn soft_delete(&mut self) -> bool {
        if self.is_deleted() {
            return false;
        }
        self.text = DELETED_TEXT.to_string();
        true
    }
}

/// A Thread is the aggregate root: it owns its replies in arrival order.
#[derive(Debug, Clone)]
pub struct Thread {
    id: Uuid,
    board: String,
    text: String,
    created_on: DateTime<Utc>,
    /// The timestamp used for sorting threads by activity
    bumped_on: DateTime<Utc>,
    delete_password: DeleteSecret,
    reported: bool,
    replies: Vec<Reply>,
    /// Store-managed optimistic concurrency counter
    revision: u64,
    /// Store-assigned arrival order, breaks `bumped_on` ties
    sequence: u64,
}

impl Thread {
    /// Builds a new thread with `created_on == bumped_on == now` and no replies.
    pub fn new(
        board: impl Into<String>,
        text: impl Into<String>,
        delete_password: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            board: non_empty("board", board.into())?,
            text: non_empty("text", text.into())?,
            created_on: now,
            bumped_on: now,
            delete_password: DeleteSecret::new(delete_password)?,
            reported: false,
            replies: Vec::new(),
            revision: 0,
            sequence: 0,
        })
    }

    /// Rebuilds a thread from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        board: String,
        text: String,
        created_on: DateTime<Utc>,
        bumped_on: DateTime<Utc>,
        delete_password: DeleteSecret,
        reported: bool,
        replies: Vec<Reply>,
        revision: u64,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            board,
            text,
            created_on,
            bumped_on: bumped_on.max(created_on),
            delete_password,
            reported,
            replies,
            revision,
            sequence,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn bumped_on(&self) -> DateTime<Utc> {
        self.bumped_on
    }

    pub fn delete_password(&self) -> &DeleteSecret {
        &self.delete_password
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    pub fn reply(&self, reply_id: Uuid) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == reply_id)
    }

    pub fn reply_mut(&mut self, reply_id: Uuid) -> Option<&mut Reply> {
        self.replies.iter_mut().find(|r| r.id == reply_id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Appends a reply and bumps the thread. The bump never moves backward.
    pub fn push_reply(&mut self, reply: Reply, bumped_on: DateTime<Utc>) {
        self.bump(bumped_on);
        self.replies.push(reply);
    }

    pub fn bump(&mut self, at: DateTime<Utc>) {
        self.bumped_on = self.bumped_on.max(at);
    }

    /// Sets the reported flag. Returns `true` if the flag changed.
    pub fn mark_reported(&mut self) -> bool {
        !std::mem::replace(&mut self.reported, true)
    }

    /// Store hook: records a committed write.
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Store hook: records the arrival position assigned on insert.
    pub fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(value)
}
