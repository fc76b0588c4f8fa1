//! dots-agent - Dots-and-Boxes move selection
//!
//! Two modes:
//! 1. `select`: replay a move history and print the MCTS choice for the next move
//! 2. `arena`: play a series of games against a random or MCTS opponent

use anyhow::{Context, Result};
use clap::Parser;
use games_dotsandboxes::{parse_moves, State};
use mcts::run_mcts;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, warn};

mod arena;
mod config;
mod player;
mod stats;

use crate::arena::{Arena, ArenaConfig};
use crate::config::{ArenaArgs, Command, Config, SelectArgs};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, seed = config.seed, "Tracing initialized");

    match &config.command {
        Command::Select(args) => run_select(args, config.seed),
        Command::Arena(args) => run_arena(args, config.seed),
    }
}

fn run_select(args: &SelectArgs, seed: u64) -> Result<()> {
    let player = args.player()?;
    let moves = parse_moves(&args.moves)?;
    let state = State::replay(args.board.rows, args.board.cols, player, &moves)?;

    if state.next_player() != player {
        warn!(
            player = %player,
            to_move = %state.next_player(),
            "Selecting a move for a player that is not to move"
        );
    }
    if state.terminal_value().is_some() {
        warn!("Game is already decided, searching anyway");
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let result = run_mcts(&state, args.search.search_config(), &mut rng)
        .context("move selection failed")?;

    info!(
        mv = %result.mv,
        iterations = result.iterations,
        win_rate = format!("{:.3}", result.win_rate),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "Move selected"
    );
    println!("{}", result.mv);

    Ok(())
}

fn run_arena(args: &ArenaArgs, seed: u64) -> Result<()> {
    let arena = Arena::new(ArenaConfig {
        rows: args.board.rows,
        cols: args.board.cols,
        games: args.games,
        opponent: args.opponent,
        search: args.search.search_config(),
        seed,
        step_tick: None,
    });

    let stats = arena.run()?;

    if let Some(path) = &args.output {
        stats.write_snapshot(path)?;
        info!(path = %path.display(), "Match stats written");
    }

    Ok(())
}
