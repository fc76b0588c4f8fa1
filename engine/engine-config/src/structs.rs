//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_rows() -> usize {
    defaults::rows()
}
fn d_cols() -> usize {
    defaults::cols()
}
fn d_time_budget_ms() -> u64 {
    defaults::time_budget_ms()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_max_rollout_plies() -> u32 {
    defaults::max_rollout_plies()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_opponent() -> String {
    defaults::opponent().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Board dimensions, in boxes
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    #[serde(default = "d_rows")]
    pub rows: usize,
    #[serde(default = "d_cols")]
    pub cols: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: defaults::rows(),
            cols: defaults::cols(),
        }
    }
}

/// MCTS search settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per move
    #[serde(default = "d_time_budget_ms")]
    pub time_budget_ms: u64,
    /// UCB1 exploration constant
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    /// Rollout length after which a simulation is scored as a draw
    #[serde(default = "d_max_rollout_plies")]
    pub max_rollout_plies: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: defaults::time_budget_ms(),
            exploration: defaults::exploration(),
            max_rollout_plies: defaults::max_rollout_plies(),
        }
    }
}

/// Agent-vs-agent match settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// Opponent of the MCTS agent: "random" or "mcts"
    #[serde(default = "d_opponent")]
    pub opponent: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            seed: defaults::seed(),
            opponent: defaults::opponent().into(),
        }
    }
}
