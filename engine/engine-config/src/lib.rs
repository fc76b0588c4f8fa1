//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! by the agent binary and its tests.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`DOTS_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! DOTS_<SECTION>_<KEY>=value
//!
//! Examples:
//!     DOTS_COMMON_LOG_LEVEL=debug
//!     DOTS_GAME_ROWS=4
//!     DOTS_SEARCH_TIME_BUDGET_MS=250
//!     DOTS_ARENA_OPPONENT=mcts
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
