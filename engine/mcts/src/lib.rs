//! Monte Carlo Tree Search (MCTS) with a wall-clock budget.
//!
//! This crate provides a game-agnostic UCB1 search that works with any
//! game implementing the `engine-core` Game trait.
//!
//! # Overview
//!
//! MCTS builds a search tree by repeating one cycle until the time budget is
//! spent. Each cycle consists of four phases:
//!
//! 1. **Selection**: Descend from the root with UCB1 while the current node has
//!    a child for every legal move
//! 2. **Expansion**: Add a child for one randomly chosen unexpanded move
//! 3. **Simulation**: Play uniformly random moves until the game has a result
//! 4. **Backpropagation**: Update visits and scores from the new node up to
//!    the root
//!
//! The move returned is the one leading to the most visited root child.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use engine_core::Player;
//! use games_dotsandboxes::State;
//! use mcts::select_move;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let state = State::new(2, 2, Player::One);
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//!
//! let mv = select_move(&state, Duration::from_millis(20), &mut rng).unwrap();
//! assert!(state.is_legal(mv));
//! ```
//!
//! # Configuration
//!
//! The [`SearchConfig`] struct controls search behavior:
//!
//! - `time_budget`: Wall-clock time per move (default: 1s)
//! - `exploration`: UCB1 exploration constant (default: √2)
//! - `max_rollout_plies`: Rollout length after which a simulation counts as a
//!   draw (default: 1000)
//!
//! # Clocks
//!
//! The deadline is read through the [`Clock`] trait. [`SystemClock`] is the
//! wall clock; [`StepClock`] advances by a fixed tick per reading, which makes
//! a seeded search fully reproducible.

pub mod clock;
pub mod config;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use clock::{Clock, StepClock, SystemClock};
pub use config::SearchConfig;
pub use node::{MctsNode, NodeId};
pub use search::{
    run_mcts, select_move, select_move_with_clock, MctsSearch, SearchError, SearchResult,
};
pub use tree::{MctsTree, TreeStats};
