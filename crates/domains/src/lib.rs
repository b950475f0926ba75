//! The central domain types and interface definitions for the board.

pub mod error;
pub mod models;
pub mod traits;
pub mod views;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
pub use views::*;
