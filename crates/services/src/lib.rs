//! Business rules of the board, written against the `domains` ports.

pub mod board;

pub use board::BoardService;
