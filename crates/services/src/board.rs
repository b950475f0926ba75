//! # BoardService
//!
//! Thread and reply lifecycle rules: creation, bump-on-reply, listing and
//! detail projections, password-gated deletion and report flagging.
//!
//! Deleting means two different things here and both are intentional:
//! `delete_thread` removes the whole aggregate, while `delete_reply` only
//! blanks the reply text and keeps the reply in place.

use std::sync::Arc;

use domains::{
    now_micros, AppError, Outcome, Reply, ReplyView, ReplyWrite, Result, Thread, ThreadDetail,
    ThreadRepository, ThreadSummary, ThreadView, RECENT_THREADS_LIMIT,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct BoardService {
    repo: Arc<dyn ThreadRepository>,
}

impl BoardService {
    pub fn new(repo: Arc<dyn ThreadRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, text, delete_password))]
    pub async fn create_thread(
        &self,
        board: &str,
        text: &str,
        delete_password: &str,
    ) -> Result<ThreadView> {
        let thread = Thread::new(board, text, delete_password, now_micros())?;
        self.repo.insert(&thread).await?;

        info!(thread_id = %thread.id(), "thread created");
        Ok(ThreadView::detail(&thread))
    }

    /// Appends a reply and bumps the thread in a single store mutation.
    ///
    /// The board is advisory; the thread is looked up by id alone.
    #[instrument(skip(self, text, delete_password))]
    pub async fn add_reply(
        &self,
        board: &str,
        thread_id: Uuid,
        text: &str,
        delete_password: &str,
    ) -> Result<ReplyView> {
        let now = now_micros();
        let reply = Reply::new(text, delete_password, now)?;

        if !self.repo.append_reply(thread_id, &reply, now).await? {
            return Err(AppError::thread_not_found(thread_id));
        }

        info!(reply_id = %reply.id(), "reply added");
        Ok(ReplyView::from(&reply))
    }

    /// The ten most recently bumped threads, each with its last three replies.
    #[instrument(skip(self))]
    pub async fn list_recent_threads(&self, board: &str) -> Result<Vec<ThreadSummary>> {
        let threads = self.repo.find_recent(board, RECENT_THREADS_LIMIT).await?;
        debug!(count = threads.len(), "listing threads");

        Ok(threads
            .iter()
            .take(RECENT_THREADS_LIMIT)
            .map(ThreadView::summary)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_thread(&self, board: &str, thread_id: Uuid) -> Result<ThreadDetail> {
        let thread = self.load(board, thread_id).await?;
        Ok(ThreadView::detail(&thread))
    }

    /// Hard delete: the thread and every reply are gone on success.
    #[instrument(skip(self, delete_password))]
    pub async fn delete_thread(
        &self,
        board: &str,
        thread_id: Uuid,
        delete_password: &str,
    ) -> Result<Outcome> {
        let thread = self.load(board, thread_id).await?;

        if !thread.delete_password().matches(delete_password) {
            warn!("incorrect password for thread delete");
            return Ok(Outcome::IncorrectSecret);
        }

        if !self.repo.delete(thread_id).await? {
            return Err(AppError::thread_not_found(thread_id));
        }

        info!("thread deleted");
        Ok(Outcome::Success)
    }

    /// Soft delete: the reply stays, its text becomes `[deleted]`.
    ///
    /// The password is checked against a read; the blanking itself is a
    /// single in-place store write, so a reply added meanwhile is unaffected.
    #[instrument(skip(self, delete_password))]
    pub async fn delete_reply(
        &self,
        board: &str,
        thread_id: Uuid,
        reply_id: Uuid,
        delete_password: &str,
    ) -> Result<Outcome> {
        let thread = self.load(board, thread_id).await?;
        let reply = thread
            .reply(reply_id)
            .ok_or_else(|| AppError::reply_not_found(reply_id))?;

        if !reply.delete_password().matches(delete_password) {
            warn!("incorrect password for reply delete");
            return Ok(Outcome::IncorrectSecret);
        }

        if reply.is_deleted() {
            debug!("reply already deleted");
            return Ok(Outcome::Success);
        }

        let written = self.repo.soft_delete_reply(thread_id, reply_id).await?;
        reply_written(written, thread_id, reply_id)?;
        info!("reply soft-deleted");
        Ok(Outcome::Success)
    }

    /// Flags a thread for moderators. Reporting twice is not an error.
    #[instrument(skip(self))]
    pub async fn report_thread(&self, board: &str, thread_id: Uuid) -> Result<Outcome> {
        if !self.repo.mark_thread_reported(thread_id).await? {
            return Err(AppError::thread_not_found(thread_id));
        }

        info!("thread reported");
        Ok(Outcome::Success)
    }

    /// Flags a reply for moderators. Reporting twice is not an error.
    #[instrument(skip(self))]
    pub async fn report_reply(
        &self,
        board: &str,
        thread_id: Uuid,
        reply_id: Uuid,
    ) -> Result<Outcome> {
        let written = self.repo.mark_reply_reported(thread_id, reply_id).await?;
        reply_written(written, thread_id, reply_id)?;

        info!("reply reported");
        Ok(Outcome::Success)
    }

    async fn load(&self, board: &str, thread_id: Uuid) -> Result<Thread> {
        let thread = self
            .repo
            .find_by_id(thread_id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(thread_id))?;

        if thread.board() != board {
            debug!(stored_board = thread.board(), "thread requested under another board");
        }
        Ok(thread)
    }
}

fn reply_written(written: ReplyWrite, thread_id: Uuid, reply_id: Uuid) -> Result<()> {
    match written {
        ReplyWrite::Applied => Ok(()),
        ReplyWrite::ThreadMissing => Err(AppError::thread_not_found(thread_id)),
        ReplyWrite::ReplyMissing => Err(AppError::reply_not_found(reply_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockThreadRepository, StoreError, DELETED_TEXT};
    use storage_adapters::MemoryThreadRepository;

    fn service() -> BoardService {
        BoardService::new(Arc::new(MemoryThreadRepository::new()))
    }

    #[tokio::test]
    async fn create_thread_returns_sanitized_view() {
        let svc = service();
        let view = svc.create_thread("b", "hello", "p1").await.unwrap();
        assert_eq!(view.board, "b");
        assert_eq!(view.text, "hello");
        assert_eq!(view.created_on, view.bumped_on);
        assert!(view.replies.is_empty());
    }

    #[tokio::test]
    async fn create_thread_rejects_empty_fields() {
        let svc = service();
        for (board, text, pw) in [("", "t", "p"), ("b", "", "p"), ("b", "t", "")] {
            let err = svc.create_thread(board, text, pw).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{err:?}");
        }
        assert!(svc.list_recent_threads("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_reply_to_missing_thread_is_not_found() {
        let svc = service();
        let err = svc.add_reply("b", Uuid::now_v7(), "hi", "p").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("thread", _)));
    }

    #[tokio::test]
    async fn add_reply_rejects_empty_text() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let err = svc.add_reply("b", thread.id, "", "p2").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let err = svc.add_reply("b", thread.id, "hi", "").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(svc.get_thread("b", thread.id).await.unwrap().replycount, 0);
    }

    #[tokio::test]
    async fn bumped_is_non_decreasing_across_replies() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let mut last = thread.bumped_on;
        for n in 1..=5 {
            svc.add_reply("b", thread.id, &format!("r{n}"), "p").await.unwrap();
            let detail = svc.get_thread("b", thread.id).await.unwrap();
            assert!(detail.bumped_on >= last);
            assert_eq!(detail.replies.len(), n);
            last = detail.bumped_on;
        }
    }

    #[tokio::test]
    async fn wrong_password_leaves_thread_intact() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let outcome = svc.delete_thread("b", thread.id, "nope").await.unwrap();
        assert_eq!(outcome, Outcome::IncorrectSecret);
        assert_eq!(svc.get_thread("b", thread.id).await.unwrap(), thread);
    }

    #[tokio::test]
    async fn hard_delete_removes_thread() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        svc.add_reply("b", thread.id, "hi", "p2").await.unwrap();

        assert_eq!(svc.delete_thread("b", thread.id, "p1").await.unwrap(), Outcome::Success);
        assert!(matches!(
            svc.get_thread("b", thread.id).await,
            Err(AppError::NotFound("thread", _))
        ));
        assert!(matches!(
            svc.delete_thread("b", thread.id, "p1").await,
            Err(AppError::NotFound("thread", _))
        ));
        assert!(matches!(
            svc.delete_thread("b", Uuid::now_v7(), "p1").await,
            Err(AppError::NotFound("thread", _))
        ));
    }

    #[tokio::test]
    async fn soft_delete_twice_is_safe() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let reply = svc.add_reply("b", thread.id, "hi", "p2").await.unwrap();

        for _ in 0..2 {
            let outcome = svc.delete_reply("b", thread.id, reply.id, "p2").await.unwrap();
            assert_eq!(outcome, Outcome::Success);
            let detail = svc.get_thread("b", thread.id).await.unwrap();
            assert_eq!(detail.replies[0].text, DELETED_TEXT);
            assert_eq!(detail.replies[0].id, reply.id);
        }
    }

    #[tokio::test]
    async fn delete_reply_checks_reply_password_not_thread_password() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let reply = svc.add_reply("b", thread.id, "hi", "p2").await.unwrap();

        let outcome = svc.delete_reply("b", thread.id, reply.id, "p1").await.unwrap();
        assert_eq!(outcome, Outcome::IncorrectSecret);
        assert_eq!(svc.get_thread("b", thread.id).await.unwrap().replies[0].text, "hi");
    }

    #[tokio::test]
    async fn missing_reply_is_not_found() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let missing = Uuid::now_v7();
        assert!(matches!(
            svc.delete_reply("b", thread.id, missing, "p").await,
            Err(AppError::NotFound("reply", _))
        ));
        assert!(matches!(
            svc.report_reply("b", thread.id, missing).await,
            Err(AppError::NotFound("reply", _))
        ));
        assert!(matches!(
            svc.delete_reply("b", Uuid::now_v7(), missing, "p").await,
            Err(AppError::NotFound("thread", _))
        ));
        assert!(matches!(
            svc.report_reply("b", Uuid::now_v7(), missing).await,
            Err(AppError::NotFound("thread", _))
        ));
    }

    #[tokio::test]
    async fn reporting_is_idempotent() {
        let repo = Arc::new(MemoryThreadRepository::new());
        let svc = BoardService::new(repo.clone());
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let reply = svc.add_reply("b", thread.id, "hi", "p2").await.unwrap();

        for _ in 0..2 {
            svc.report_thread("b", thread.id).await.unwrap();
            svc.report_reply("b", thread.id, reply.id).await.unwrap();
            let stored = repo.find_by_id(thread.id).await.unwrap().unwrap();
            assert!(stored.is_reported());
            assert!(stored.reply(reply.id).unwrap().is_reported());
        }
    }

    #[tokio::test]
    async fn report_missing_thread_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.report_thread("b", Uuid::now_v7()).await,
            Err(AppError::NotFound("thread", _))
        ));
    }

    #[tokio::test]
    async fn store_failure_on_append_is_surfaced() {
        let mut repo = MockThreadRepository::new();
        repo.expect_append_reply()
            .returning(|_, _, _| Err(StoreError::Backend(anyhow::anyhow!("pool timed out"))));
        let svc = BoardService::new(Arc::new(repo));

        let err = svc.add_reply("b", Uuid::now_v7(), "hi", "p").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn failed_write_is_not_reported_as_success() {
        let mut repo = MockThreadRepository::new();
        repo.expect_mark_thread_reported()
            .times(1)
            .returning(|_| Err(StoreError::Backend(anyhow::anyhow!("connection reset"))));
        let svc = BoardService::new(Arc::new(repo));

        let err = svc.report_thread("b", Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn reply_writes_never_go_through_whole_document_update() {
        let now = Utc::now();
        let mut thread = Thread::new("b", "hello", "p1", now).unwrap();
        let reply = Reply::new("hi", "p2", now).unwrap();
        let (thread_id, reply_id) = (thread.id(), reply.id());
        thread.push_reply(reply, now);

        let mut repo = MockThreadRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_update().times(0);
        repo.expect_mark_thread_reported()
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_mark_reply_reported()
            .times(1)
            .returning(|_, _| Ok(ReplyWrite::Applied));
        repo.expect_soft_delete_reply()
            .times(1)
            .returning(|_, _| Ok(ReplyWrite::Applied));
        let svc = BoardService::new(Arc::new(repo));

        assert_eq!(svc.report_thread("b", thread_id).await.unwrap(), Outcome::Success);
        assert_eq!(
            svc.report_reply("b", thread_id, reply_id).await.unwrap(),
            Outcome::Success
        );
        assert_eq!(
            svc.delete_reply("b", thread_id, reply_id, "p2").await.unwrap(),
            Outcome::Success
        );
    }

    #[tokio::test]
    async fn thread_removed_between_read_and_write_is_not_found() {
        let now = Utc::now();
        let mut thread = Thread::new("b", "hello", "p1", now).unwrap();
        let reply = Reply::new("hi", "p2", now).unwrap();
        let (thread_id, reply_id) = (thread.id(), reply.id());
        thread.push_reply(reply, now);

        let mut repo = MockThreadRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_soft_delete_reply()
            .returning(|_, _| Ok(ReplyWrite::ThreadMissing));
        let svc = BoardService::new(Arc::new(repo));

        assert!(matches!(
            svc.delete_reply("b", thread_id, reply_id, "p2").await,
            Err(AppError::NotFound("thread", _))
        ));
    }

    #[tokio::test]
    async fn incorrect_password_never_writes() {
        let now = Utc::now();
        let mut thread = Thread::new("b", "hello", "p1", now).unwrap();
        let reply = Reply::new("hi", "p2", now).unwrap();
        let (id, reply_id) = (thread.id(), reply.id());
        thread.push_reply(reply, now);

        let mut repo = MockThreadRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(thread.clone())));
        repo.expect_delete().times(0);
        repo.expect_update().times(0);
        repo.expect_soft_delete_reply().times(0);
        let svc = BoardService::new(Arc::new(repo));

        assert_eq!(
            svc.delete_thread("b", id, "guess").await.unwrap(),
            Outcome::IncorrectSecret
        );
        assert_eq!(
            svc.delete_reply("b", id, reply_id, "p1").await.unwrap(),
            Outcome::IncorrectSecret
        );
    }

    #[tokio::test]
    async fn timestamps_are_whole_microseconds() {
        let svc = service();
        let thread = svc.create_thread("b", "hello", "p1").await.unwrap();
        let reply = svc.add_reply("b", thread.id, "hi", "p2").await.unwrap();
        assert_eq!(thread.created_on.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(reply.created_on.timestamp_subsec_nanos() % 1_000, 0);
        let detail = svc.get_thread("b", thread.id).await.unwrap();
        assert_eq!(detail.bumped_on.timestamp_subsec_nanos() % 1_000, 0);
        assert!(detail.bumped_on >= reply.created_on);
    }
}
