//! Shared fixtures for the cross-crate test suites.

use std::sync::Arc;
use std::time::Duration;

use services::BoardService;
use storage_adapters::MemoryThreadRepository;

pub const BOARD: &str = "test";

/// A service wired to a fresh in-memory store, plus a handle on the store
/// for asserting on fields the service never exposes.
pub fn memory_service() -> (Arc<MemoryThreadRepository>, BoardService) {
    let repo = Arc::new(MemoryThreadRepository::new());
    (repo.clone(), BoardService::new(repo))
}

/// Lets the wall clock advance so consecutive bumps get distinct timestamps.
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}
