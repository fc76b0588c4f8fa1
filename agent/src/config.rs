//! Command-line configuration for the agent binary
//!
//! Defaults come from config.toml with DOTS_* environment variable overrides.
//! CLI arguments take highest priority.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use engine_config::{load_config, CentralConfig};
use engine_core::Player;
use mcts::SearchConfig;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

use crate::player::AgentKind;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_rows() -> usize {
    CENTRAL_CONFIG.game.rows
}

fn default_cols() -> usize {
    CENTRAL_CONFIG.game.cols
}

fn default_time_ms() -> u64 {
    CENTRAL_CONFIG.search.time_budget_ms
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.search.exploration
}

fn default_max_rollout_plies() -> u32 {
    CENTRAL_CONFIG.search.max_rollout_plies
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.arena.games
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.arena.seed
}

fn default_opponent() -> AgentKind {
    match CENTRAL_CONFIG.arena.opponent.parse() {
        Ok(kind) => kind,
        Err(_) => AgentKind::Random,
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "dots-agent")]
#[command(version, about = "Dots-and-Boxes MCTS agent")]
#[command(
    long_about = "Chooses Dots-and-Boxes moves with a time-bounded Monte Carlo Tree Search,
either for a single position or over a series of agent-vs-agent games.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    /// Seed for every random number generator
    #[arg(long, global = true, default_value_t = default_seed())]
    pub seed: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replay a move history and print the move chosen for the next player
    Select(SelectArgs),

    /// Play a series of games between the MCTS agent and an opponent
    Arena(ArenaArgs),
}

/// Board dimensions, in boxes
#[derive(Args, Debug, Clone)]
pub struct BoardArgs {
    /// Rows of boxes
    #[arg(long, default_value_t = default_rows())]
    pub rows: usize,

    /// Columns of boxes
    #[arg(long, default_value_t = default_cols())]
    pub cols: usize,
}

/// Search settings
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Time budget per move in milliseconds
    #[arg(long, default_value_t = default_time_ms())]
    pub time_ms: u64,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Random plies per rollout before it is scored as a draw
    #[arg(long, default_value_t = default_max_rollout_plies())]
    pub max_rollout_plies: u32,
}

impl SearchArgs {
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_time_budget(Duration::from_millis(self.time_ms))
            .with_exploration(self.exploration)
            .with_max_rollout_plies(self.max_rollout_plies)
    }
}

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Player the agent moves for (1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    pub player: u8,

    /// Moves played so far, e.g. "0,0,h;1,0,v"
    #[arg(long, default_value = "")]
    pub moves: String,
}

impl SelectArgs {
    pub fn player(&self) -> Result<Player> {
        Ok(Player::from_id(self.player)?)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ArenaArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Number of games to play
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Opponent of the MCTS agent
    #[arg(long, value_enum, default_value_t = default_opponent())]
    pub opponent: AgentKind,

    /// Write a JSON summary of the match to this path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        match &self.command {
            Command::Select(args) => {
                args.board.validate()?;
                args.search.validate()?;
            }
            Command::Arena(args) => {
                args.board.validate()?;
                args.search.validate()?;
                if args.games == 0 {
                    return Err(anyhow!("games must be greater than 0"));
                }
            }
        }

        Ok(())
    }
}

impl BoardArgs {
    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(anyhow!(
                "board must have at least one box, got {}x{}",
                self.rows,
                self.cols
            ));
        }
        Ok(())
    }
}

impl SearchArgs {
    fn validate(&self) -> Result<()> {
        if self.time_ms == 0 {
            return Err(anyhow!("time_ms must be greater than 0"));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["dots-agent"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    fn base_search() -> SearchArgs {
        SearchArgs {
            time_ms: 100,
            exploration: 1.4,
            max_rollout_plies: 1000,
        }
    }

    fn base_config() -> Config {
        Config {
            log_level: "info".into(),
            seed: 42,
            command: Command::Arena(ArenaArgs {
                board: BoardArgs { rows: 3, cols: 3 },
                search: base_search(),
                games: 4,
                opponent: AgentKind::Random,
                output: None,
            }),
        }
    }

    fn arena_args(cfg: &mut Config) -> &mut ArenaArgs {
        match &mut cfg.command {
            Command::Arena(args) => args,
            Command::Select(_) => unreachable!(),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_empty_board() {
        let mut cfg = base_config();
        arena_args(&mut cfg).board.rows = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("at least one box"));
    }

    #[test]
    fn validate_rejects_zero_time_budget() {
        let mut cfg = base_config();
        arena_args(&mut cfg).search.time_ms = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("time_ms"));
    }

    #[test]
    fn validate_rejects_negative_exploration() {
        let mut cfg = base_config();
        arena_args(&mut cfg).search.exploration = -1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("exploration"));
    }

    #[test]
    fn validate_rejects_zero_games() {
        let mut cfg = base_config();
        arena_args(&mut cfg).games = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("games"));
    }

    #[test]
    fn search_config_uses_arguments() {
        let config = base_search().search_config();
        assert_eq!(config.time_budget, Duration::from_millis(100));
        assert!((config.exploration - 1.4).abs() < 1e-12);
        assert_eq!(config.max_rollout_plies, 1000);
    }

    #[test]
    fn parses_select_command() {
        let cfg = parse(&[
            "select", "--rows", "2", "--cols", "4", "--player", "2", "--moves", "0,0,h;1,0,v",
            "--time-ms", "50", "--seed", "9",
        ]);
        assert_eq!(cfg.seed, 9);
        let Command::Select(args) = cfg.command else {
            panic!("expected select");
        };
        assert_eq!(args.board.rows, 2);
        assert_eq!(args.board.cols, 4);
        assert_eq!(args.player().unwrap(), Player::Two);
        assert_eq!(args.moves, "0,0,h;1,0,v");
        assert_eq!(args.search.time_ms, 50);
    }

    #[test]
    fn parses_arena_command() {
        let cfg = parse(&[
            "--log-level",
            "debug",
            "arena",
            "--games",
            "6",
            "--opponent",
            "mcts",
            "--output",
            "match.json",
        ]);
        assert_eq!(cfg.log_level, "debug");
        let Command::Arena(args) = cfg.command else {
            panic!("expected arena");
        };
        assert_eq!(args.games, 6);
        assert_eq!(args.opponent, AgentKind::Mcts);
        assert_eq!(args.output, Some(PathBuf::from("match.json")));
    }

    #[test]
    fn rejects_player_out_of_range() {
        let result = Config::try_parse_from(["dots-agent", "select", "--player", "3"]);
        assert!(result.is_err());
    }
}
