//! # storage-adapters
//!
//! Implementations of the `ThreadRepository` port.
//!
//! - [`MemoryThreadRepository`]: always compiled, the default backend
//! - [`PgThreadRepository`]: PostgreSQL via sqlx, behind the `db-postgres` feature

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryThreadRepository;
#[cfg(feature = "db-postgres")]
pub use postgres::PgThreadRepository;
