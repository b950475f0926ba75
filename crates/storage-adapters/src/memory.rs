//! # In-memory thread store
//!
//! `DashMap`-backed implementation of `ThreadRepository`. Each thread is one
//! map entry, so the shard lock held by `get_mut` makes every mutation atomic
//! per document. Data lives as long as the process.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{Reply, ReplyWrite, StoreError, Thread, ThreadRepository};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryThreadRepository {
    threads: DashMap<Uuid, Thread>,
    next_sequence: AtomicU64,
}

impl MemoryThreadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Applies `change` to one reply while holding the thread's entry lock.
    /// `change` reports whether it modified anything.
    fn with_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        change: impl FnOnce(&mut Reply) -> bool,
    ) -> ReplyWrite {
        let Some(mut stored) = self.threads.get_mut(&thread_id) else {
            return ReplyWrite::ThreadMissing;
        };
        let Some(reply) = stored.reply_mut(reply_id) else {
            return ReplyWrite::ReplyMissing;
        };
        if change(reply) {
            let revision = stored.revision() + 1;
            stored.set_revision(revision);
        }
        ReplyWrite::Applied
    }
}

#[async_trait]
impl ThreadRepository for MemoryThreadRepository {
    async fn insert(&self, thread: &Thread) -> Result<(), StoreError> {
        match self.threads.entry(thread.id()) {
            Entry::Occupied(_) => Err(anyhow!("thread {} already exists", thread.id()).into()),
            Entry::Vacant(slot) => {
                let mut stored = thread.clone();
                stored.set_sequence(self.next_sequence.fetch_add(1, Ordering::Relaxed));
                stored.set_revision(0);
                slot.insert(stored);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Thread>, StoreError> {
        Ok(self.threads.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_recent(&self, board: &str, limit: usize) -> Result<Vec<Thread>, StoreError> {
        let mut threads: Vec<Thread> = self
            .threads
            .iter()
            .filter(|entry| entry.board() == board)
            .map(|entry| entry.value().clone())
            .collect();

        threads.sort_by(|a, b| {
            b.bumped_on()
                .cmp(&a.bumped_on())
                .then_with(|| a.sequence().cmp(&b.sequence()))
        });
        threads.truncate(limit);
        Ok(threads)
    }

    async fn update(&self, thread: &Thread) -> Result<bool, StoreError> {
        let Some(mut stored) = self.threads.get_mut(&thread.id()) else {
            return Ok(false);
        };
        if stored.revision() != thread.revision() {
            return Err(StoreError::Conflict(thread.id()));
        }

        let mut next = thread.clone();
        next.set_sequence(stored.sequence());
        next.set_revision(stored.revision() + 1);
        *stored = next;
        Ok(true)
    }

    async fn append_reply(
        &self,
        thread_id: Uuid,
        reply: &Reply,
        bumped_on: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(mut stored) = self.threads.get_mut(&thread_id) else {
            return Ok(false);
        };
        stored.push_reply(reply.clone(), bumped_on);
        let revision = stored.revision() + 1;
        stored.set_revision(revision);
        Ok(true)
    }

    async fn mark_thread_reported(&self, id: Uuid) -> Result<bool, StoreError> {
        let Some(mut stored) = self.threads.get_mut(&id) else {
            return Ok(false);
        };
        if stored.mark_reported() {
            let revision = stored.revision() + 1;
            stored.set_revision(revision);
        }
        Ok(true)
    }

    async fn mark_reply_reported(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
    ) -> Result<ReplyWrite, StoreError> {
        Ok(self.with_reply(thread_id, reply_id, Reply::mark_reported))
    }

    async fn soft_delete_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
    ) -> Result<ReplyWrite, StoreError> {
        Ok(self.with_reply(thread_id, reply_id, Reply::soft_delete))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.threads.remove(&id).is_some())
    }
}
