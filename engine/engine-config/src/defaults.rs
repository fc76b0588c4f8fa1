//! Default configuration values loaded from config.defaults.toml.
//!
//! This module loads defaults from the shared TOML file at compile time, so
//! the documented defaults file and the binaries can never disagree.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    game: GameDefaults,
    search: SearchDefaults,
    arena: ArenaDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct GameDefaults {
    rows: usize,
    cols: usize,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    time_budget_ms: u64,
    exploration: f64,
    max_rollout_plies: u32,
}

#[derive(Debug, Deserialize)]
struct ArenaDefaults {
    games: u32,
    seed: u64,
    opponent: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Game
pub fn rows() -> usize {
    DEFAULTS.game.rows
}
pub fn cols() -> usize {
    DEFAULTS.game.cols
}

// Search
pub fn time_budget_ms() -> u64 {
    DEFAULTS.search.time_budget_ms
}
pub fn exploration() -> f64 {
    DEFAULTS.search.exploration
}
pub fn max_rollout_plies() -> u32 {
    DEFAULTS.search.max_rollout_plies
}

// Arena
pub fn games() -> u32 {
    DEFAULTS.arena.games
}
pub fn seed() -> u64 {
    DEFAULTS.arena.seed
}
pub fn opponent() -> &'static str {
    &DEFAULTS.arena.opponent
}
