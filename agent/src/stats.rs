//! Match statistics tracking and persistence.
//!
//! Results are kept from the MCTS agent's point of view and split by which
//! side moved first. A snapshot can be written to a JSON file.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use engine_core::Outcome;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wins, draws and losses for one side of the match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    fn merged(self, other: OutcomeCounts) -> OutcomeCounts {
        OutcomeCounts {
            wins: self.wins + other.wins,
            draws: self.draws + other.draws,
            losses: self.losses + other.losses,
        }
    }
}

/// One finished game, seen from the MCTS agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRecord {
    pub mcts_first: bool,
    pub outcome: Outcome,
    /// Moves played by both sides
    pub plies: u32,
    pub mcts_moves: u32,
    pub mcts_iterations: u64,
}

/// Aggregated match statistics.
#[derive(Debug)]
pub struct MatchStats {
    rows: usize,
    cols: usize,
    opponent: String,
    as_first: OutcomeCounts,
    as_second: OutcomeCounts,
    total_plies: u64,
    mcts_moves: u64,
    mcts_iterations: u64,
    start_time: Instant,
}

/// Serializable stats for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub opponent: String,
    pub games: u32,
    pub totals: OutcomeCounts,
    pub as_first: OutcomeCounts,
    pub as_second: OutcomeCounts,
    pub win_rate: f64,
    pub avg_game_length: f64,
    pub avg_iterations_per_move: f64,
    pub runtime_seconds: f64,
    pub timestamp: u64,
}

impl MatchStats {
    pub fn new(rows: usize, cols: usize, opponent: &str) -> Self {
        Self {
            rows,
            cols,
            opponent: opponent.to_string(),
            as_first: OutcomeCounts::default(),
            as_second: OutcomeCounts::default(),
            total_plies: 0,
            mcts_moves: 0,
            mcts_iterations: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a completed game.
    pub fn record_game(&mut self, game: &GameRecord) {
        if game.mcts_first {
            self.as_first.record(game.outcome);
        } else {
            self.as_second.record(game.outcome);
        }
        self.total_plies += u64::from(game.plies);
        self.mcts_moves += u64::from(game.mcts_moves);
        self.mcts_iterations += game.mcts_iterations;
    }

    pub fn games(&self) -> u32 {
        self.as_first.games() + self.as_second.games()
    }

    pub fn as_first(&self) -> OutcomeCounts {
        self.as_first
    }

    pub fn as_second(&self) -> OutcomeCounts {
        self.as_second
    }

    pub fn totals(&self) -> OutcomeCounts {
        self.as_first.merged(self.as_second)
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> MatchSnapshot {
        let games = self.games();
        let totals = self.totals();

        // Draws count as half a win
        let win_rate = if games > 0 {
            (f64::from(totals.wins) + 0.5 * f64::from(totals.draws)) / f64::from(games)
        } else {
            0.0
        };

        let avg_game_length = if games > 0 {
            self.total_plies as f64 / f64::from(games)
        } else {
            0.0
        };

        let avg_iterations_per_move = if self.mcts_moves > 0 {
            self.mcts_iterations as f64 / self.mcts_moves as f64
        } else {
            0.0
        };

        MatchSnapshot {
            rows: self.rows,
            cols: self.cols,
            opponent: self.opponent.clone(),
            games,
            totals,
            as_first: self.as_first,
            as_second: self.as_second,
            win_rate,
            avg_game_length,
            avg_iterations_per_move,
            runtime_seconds: self.start_time.elapsed().as_secs_f64(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write a snapshot to `path` as JSON (atomic write-then-rename).
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())
            .context("Failed to serialize match stats")?;

        let mut temp_path = path.as_os_str().to_owned();
        temp_path.push(".tmp");
        let temp_path = Path::new(&temp_path);

        let mut file = fs::File::create(temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;

        if let Err(e) = fs::rename(temp_path, path) {
            let _ = fs::remove_file(temp_path);
            return Err(e).with_context(|| format!("Failed to rename stats to {}", path.display()));
        }

        debug!("Wrote match stats to {}", path.display());
        Ok(())
    }
}
