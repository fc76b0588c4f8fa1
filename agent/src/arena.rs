//! Agent-vs-agent match runner
//!
//! Plays a series of games between the MCTS agent and an opponent, swapping
//! the first mover every game. A referee board checks every move before both
//! agents are told about it.

use std::time::Duration;

use anyhow::{Context, Result};
use engine_core::{Outcome, Player};
use games_dotsandboxes::State;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::SearchConfig;
use tracing::{debug, info};

use crate::player::AgentKind;
use crate::stats::{GameRecord, MatchStats};

/// Settings for one match.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub rows: usize,
    pub cols: usize,
    pub games: u32,
    pub opponent: AgentKind,
    pub search: SearchConfig,
    pub seed: u64,
    /// Run MCTS agents on a step clock with this tick
    pub step_tick: Option<Duration>,
}

pub struct Arena {
    config: ArenaConfig,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        Self { config }
    }

    /// Play every game of the match.
    pub fn run(&self) -> Result<MatchStats> {
        let cfg = &self.config;
        let mut stats = MatchStats::new(cfg.rows, cfg.cols, &cfg.opponent.to_string());

        info!(
            rows = cfg.rows,
            cols = cfg.cols,
            games = cfg.games,
            opponent = %cfg.opponent,
            time_budget_ms = cfg.search.time_budget.as_millis() as u64,
            "Starting match"
        );

        // Progress bar only when stderr is a TTY
        let progress = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            let pb = ProgressBar::new(u64::from(cfg.games));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        for index in 0..cfg.games {
            let record = self
                .play_game(index)
                .with_context(|| format!("game {} failed", index + 1))?;
            stats.record_game(&record);

            let log = || {
                debug!(
                    game = index + 1,
                    mcts_first = record.mcts_first,
                    outcome = %record.outcome,
                    plies = record.plies,
                    "Game finished"
                )
            };
            match &progress {
                Some(pb) => {
                    pb.suspend(log);
                    pb.inc(1);
                }
                None => log(),
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let snapshot = stats.snapshot();
        info!(
            games = snapshot.games,
            wins = snapshot.totals.wins,
            draws = snapshot.totals.draws,
            losses = snapshot.totals.losses,
            first_wins = snapshot.as_first.wins,
            second_wins = snapshot.as_second.wins,
            win_rate = format!("{:.3}", snapshot.win_rate),
            avg_iterations_per_move = format!("{:.1}", snapshot.avg_iterations_per_move),
            "Match complete"
        );

        Ok(stats)
    }

    /// Play game `index`. The MCTS agent moves first on even games.
    pub fn play_game(&self, index: u32) -> Result<GameRecord> {
        let cfg = &self.config;
        let mcts_first = index % 2 == 0;
        let mcts_player = if mcts_first { Player::One } else { Player::Two };
        let opponent_player = mcts_player.opponent();

        let seed = cfg.seed.wrapping_add(u64::from(index).wrapping_mul(2));
        let mut mcts = AgentKind::Mcts.create(
            mcts_player,
            cfg.rows,
            cfg.cols,
            &cfg.search,
            seed,
            cfg.step_tick,
        );
        let mut opponent = cfg.opponent.create(
            opponent_player,
            cfg.rows,
            cfg.cols,
            &cfg.search,
            seed.wrapping_add(1),
            cfg.step_tick,
        );

        let mut referee = State::new(cfg.rows, cfg.cols, mcts_player);
        let mut plies = 0u32;

        let outcome = loop {
            if let Some(outcome) = referee.terminal_value() {
                break outcome;
            }

            let mover = if referee.next_player() == mcts_player {
                &mut mcts
            } else {
                &mut opponent
            };
            let mv = mover.next_move()?;
            referee
                .try_apply_move(mv)
                .with_context(|| format!("{} agent played {}", mover.name(), mv))?;

            mcts.register_move(mv)?;
            opponent.register_move(mv)?;
            plies += 1;
        };

        debug_assert_eq!(
            outcome,
            Outcome::from_scores(referee.score(mcts_player), referee.score(opponent_player))
        );

        Ok(GameRecord {
            mcts_first,
            outcome,
            plies,
            mcts_moves: mcts.moves_made(),
            mcts_iterations: mcts.iterations(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(games: u32, opponent: AgentKind) -> ArenaConfig {
        ArenaConfig {
            rows: 2,
            cols: 2,
            games,
            opponent,
            search: SearchConfig::for_testing().with_time_budget(Duration::from_millis(10)),
            seed: 42,
            step_tick: Some(Duration::from_millis(1)),
        }
    }

    #[test]
    fn test_totals_equal_games_played() {
        let stats = Arena::new(test_config(4, AgentKind::Random)).run().unwrap();
        assert_eq!(stats.games(), 4);
        assert_eq!(stats.totals().games(), 4);
    }

    #[test]
    fn test_first_mover_alternates_evenly() {
        let stats = Arena::new(test_config(6, AgentKind::Random)).run().unwrap();
        assert_eq!(stats.as_first().games(), 3);
        assert_eq!(stats.as_second().games(), 3);
    }

    #[test]
    fn test_play_game_records_moves() {
        let arena = Arena::new(test_config(1, AgentKind::Random));

        let first = arena.play_game(0).unwrap();
        assert!(first.mcts_first);
        assert!(first.plies > 0 && first.plies <= 12);
        assert!(first.mcts_moves > 0);
        // 10ms budget on a 1ms step clock gives 9 cycles per search
        assert_eq!(first.mcts_iterations, u64::from(first.mcts_moves) * 9);

        let second = arena.play_game(1).unwrap();
        assert!(!second.mcts_first);
    }

    #[test]
    fn test_mcts_vs_mcts_match() {
        let stats = Arena::new(test_config(2, AgentKind::Mcts)).run().unwrap();
        assert_eq!(stats.games(), 2);
        assert_eq!(stats.snapshot().opponent, "mcts");
    }

    #[test]
    fn test_match_is_reproducible() {
        let run = || {
            let stats = Arena::new(test_config(4, AgentKind::Random)).run().unwrap();
            (stats.as_first(), stats.as_second(), stats.snapshot().avg_game_length)
        };
        assert_eq!(run(), run());
    }
}
