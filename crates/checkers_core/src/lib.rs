// Core checkers game logic modules
pub mod board;
pub mod error;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod position;
mod rays;

// Re-export main types for convenience
pub use board::{Board, Grid, HistoryEntry};
pub use error::{BoardError, MoveRejection};
pub use movegen::{legal_moves, piece_moves, MoveList};
pub use moves::Move;
pub use piece::{Color, Piece, Rank};
pub use position::Position;
