//! Core traits and types for the Dots-and-Boxes engine
//!
//! This crate provides the abstractions shared by the game and search crates:
//! - `Game`: typed trait for a mutable two-player position and its rules
//! - `Player`: the two seats, with their numeric ids
//! - `Outcome`: loss / draw / win from a fixed perspective
//! - `GameError`: failures of the checked move operations

pub mod board_game;
pub mod error;
pub mod typed;

// Re-export main types for convenience
pub use board_game::{Outcome, Player};
pub use error::GameError;
pub use typed::Game;
