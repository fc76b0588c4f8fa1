//! Move selection agents
//!
//! An agent follows one game from a fixed seat. Every move of the game, its
//! own included, is reported through `register_move`, and `next_move` is
//! only called when the agent is to move.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use engine_core::Player;
use games_dotsandboxes::{Move, State};
use mcts::{
    run_mcts, select_move_with_clock, SearchConfig, SearchError, SearchResult, StepClock,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, warn};

/// A player of one game.
pub trait Agent {
    /// Short label for logs and match summaries.
    fn name(&self) -> &'static str;

    /// Apply a move made by either player to the agent's own board.
    fn register_move(&mut self, mv: Move) -> Result<()>;

    /// Choose a move for the current position.
    fn next_move(&mut self) -> Result<Move>;

    /// Search cycles run so far (0 for agents that do not search).
    fn iterations(&self) -> u64 {
        0
    }

    /// Moves chosen so far.
    fn moves_made(&self) -> u32;
}

/// Kinds of agents the arena can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Random,
    Mcts,
}

impl AgentKind {
    /// Build an agent of this kind for `player` on a `rows x cols` board.
    ///
    /// With `step_tick` set, MCTS agents measure their budget on a
    /// [`StepClock`].
    pub fn create(
        self,
        player: Player,
        rows: usize,
        cols: usize,
        search: &SearchConfig,
        seed: u64,
        step_tick: Option<Duration>,
    ) -> Box<dyn Agent> {
        match self {
            AgentKind::Random => Box::new(RandomAgent::new(rows, cols, player, seed)),
            AgentKind::Mcts => {
                let agent = MctsAgent::new(rows, cols, player, search.clone(), seed);
                match step_tick {
                    Some(tick) => Box::new(agent.with_step_clock(tick)),
                    None => Box::new(agent),
                }
            }
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Random => write!(f, "random"),
            AgentKind::Mcts => write!(f, "mcts"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(AgentKind::Random),
            "mcts" => Ok(AgentKind::Mcts),
            other => Err(anyhow!(
                "unknown agent '{}', expected random or mcts",
                other
            )),
        }
    }
}

/// Agent that picks a uniformly random free edge.
#[derive(Debug)]
pub struct RandomAgent {
    state: State,
    rng: ChaCha20Rng,
    moves: u32,
}

impl RandomAgent {
    pub fn new(rows: usize, cols: usize, player: Player, seed: u64) -> Self {
        Self {
            state: State::new(rows, cols, player),
            rng: ChaCha20Rng::seed_from_u64(seed),
            moves: 0,
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "random"
    }

    fn register_move(&mut self, mv: Move) -> Result<()> {
        self.state.try_apply_move(mv)?;
        Ok(())
    }

    fn next_move(&mut self) -> Result<Move> {
        let mv = self
            .state
            .random_move(&mut self.rng)
            .ok_or_else(|| anyhow!("no legal moves left"))?;
        self.moves += 1;
        Ok(mv)
    }

    fn moves_made(&self) -> u32 {
        self.moves
    }
}

/// Agent that runs a fresh time-bounded MCTS for every move.
#[derive(Debug)]
pub struct MctsAgent {
    state: State,
    config: SearchConfig,
    rng: ChaCha20Rng,
    /// Search on a deterministic clock advancing by this tick per reading
    step_tick: Option<Duration>,
    iterations: u64,
    moves: u32,
}

impl MctsAgent {
    pub fn new(rows: usize, cols: usize, player: Player, config: SearchConfig, seed: u64) -> Self {
        Self {
            state: State::new(rows, cols, player),
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
            step_tick: None,
            iterations: 0,
            moves: 0,
        }
    }

    /// Measure the time budget with a [`StepClock`] instead of the wall
    /// clock, making every search reproducible.
    pub fn with_step_clock(mut self, tick: Duration) -> Self {
        self.step_tick = Some(tick);
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    fn search(&mut self) -> Result<SearchResult<Move>, SearchError> {
        match self.step_tick {
            Some(tick) => select_move_with_clock(
                &self.state,
                self.config.clone(),
                StepClock::new(tick),
                &mut self.rng,
            ),
            None => run_mcts(&self.state, self.config.clone(), &mut self.rng),
        }
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn register_move(&mut self, mv: Move) -> Result<()> {
        self.state.try_apply_move(mv)?;
        Ok(())
    }

    fn next_move(&mut self) -> Result<Move> {
        let mv = match self.search() {
            Ok(result) => {
                self.iterations += u64::from(result.iterations);
                debug!(
                    mv = %result.mv,
                    iterations = result.iterations,
                    win_rate = result.win_rate,
                    "MCTS move selected"
                );
                result.mv
            }
            Err(SearchError::NoCompletedCycles) => {
                warn!(
                    budget_ms = self.config.time_budget.as_millis() as u64,
                    "No search cycle completed, playing a random move"
                );
                self.state
                    .random_move(&mut self.rng)
                    .ok_or_else(|| anyhow!("no legal moves left"))?
            }
            Err(e) => return Err(e.into()),
        };

        self.moves += 1;
        Ok(mv)
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn moves_made(&self) -> u32 {
        self.moves
    }
}
