//! Error types shared by game implementations.

use thiserror::Error;

/// Errors raised by the checked game operations.
///
/// The unchecked operations (`Game::apply_move`, `Game::undo_move`) treat the
/// same conditions as contract violations and panic instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Move {mv} is outside a {rows}x{cols} board")]
    OutOfBounds { mv: String, rows: usize, cols: usize },

    #[error("Invalid player id: {0} (expected 1 or 2)")]
    InvalidPlayer(u8),
}
