//! # Core Traits (Ports)
//!
//! Any storage adapter must implement these traits to be used by the service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Reply, Thread};

/// What a write aimed at one reply of one thread found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyWrite {
    Applied,
    ThreadMissing,
    ReplyMissing,
}

/// Data persistence contract for threads and the replies they own.
///
/// Every method is atomic for a single thread document. Nothing here spans
/// more than one thread, and the service never relies on it.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Stores a new thread and assigns its arrival sequence.
    async fn insert(&self, thread: &Thread) -> Result<(), StoreError>;

    /// Loads a whole thread, replies included.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Thread>, StoreError>;

    /// Threads of `board`, most recently bumped first, ties in arrival order.
    async fn find_recent(&self, board: &str, limit: usize) -> Result<Vec<Thread>, StoreError>;

    /// Whole-document replace of the mutable thread and reply fields.
    ///
    /// Fails with [`StoreError::Conflict`] when the stored revision differs
    /// from `thread.revision()`, so a read-modify-write can never drop a reply
    /// appended after the read. Returns `false` if the thread no longer exists.
    ///
    /// Single-field changes go through the targeted writes below instead,
    /// which apply in place and never conflict.
    async fn update(&self, thread: &Thread) -> Result<bool, StoreError>;

    /// Appends `reply` and bumps the thread to `bumped_on` as one mutation.
    ///
    /// Returns `false` if the thread does not exist.
    async fn append_reply(
        &self,
        thread_id: Uuid,
        reply: &Reply,
        bumped_on: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Sets the thread's reported flag in place. Returns `false` if absent.
    async fn mark_thread_reported(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Sets one reply's reported flag in place, leaving every other field and
    /// reply untouched.
    async fn mark_reply_reported(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
    ) -> Result<ReplyWrite, StoreError>;

    /// Replaces one reply's text with [`crate::DELETED_TEXT`] in place.
    async fn soft_delete_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
    ) -> Result<ReplyWrite, StoreError>;

    /// Removes the thread and all of its replies. Returns `false` if absent.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
