//! MCTS search implementation.
//!
//! Implements the core MCTS cycle:
//! 1. Selection: Descend with UCB1 while a node is fully expanded
//! 2. Expansion: Add one child for a random pending move
//! 3. Simulation: Play random moves until the game has a result
//! 4. Backpropagation: Update statistics along the path to the root
//!
//! The search owns one working copy of the root position. Every cycle plays
//! the selected path and the rollout forward on that copy and then takes all
//! of those moves back, so the copy is at the root again before the next
//! cycle starts.

use std::time::Duration;

use engine_core::{Game, Outcome, Player};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::SearchConfig;
use crate::node::NodeId;
use crate::tree::{MctsTree, TreeStats};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Time budget expired before any search cycle completed")]
    NoCompletedCycles,
}

/// Result of an MCTS search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<M> {
    /// Move of the most visited root child
    pub mv: M,

    /// Cycles completed
    pub iterations: u32,

    /// Visits of the root node
    pub root_visits: u32,

    /// Mean score of the chosen child
    pub win_rate: f64,

    /// Time spent, as measured by the search clock
    pub elapsed: Duration,
}

/// MCTS search state.
pub struct MctsSearch<G: Game, C: Clock = SystemClock> {
    tree: MctsTree<G::Move>,
    /// Working copy, at the root position between cycles
    state: G,
    perspective: Player,
    config: SearchConfig,
    clock: C,
    iterations: u32,
}

impl<G: Game> MctsSearch<G, SystemClock> {
    /// Create a new MCTS search from the given position using the wall clock.
    pub fn new(root: &G, config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_clock(root, config, SystemClock::new())
    }
}

impl<G: Game, C: Clock> MctsSearch<G, C> {
    /// Create a new MCTS search that measures its budget with `clock`.
    pub fn with_clock(root: &G, config: SearchConfig, clock: C) -> Result<Self, SearchError> {
        let legal_moves = root.legal_moves();
        if legal_moves.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        Ok(Self {
            tree: MctsTree::new(root.next_player(), legal_moves),
            state: root.clone(),
            perspective: root.perspective(),
            config,
            clock,
            iterations: 0,
        })
    }

    /// Run cycles until the configured time budget is spent.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult<G::Move>, SearchError> {
        let start = self.clock.now();
        let deadline = start + self.config.time_budget;

        let end = loop {
            let now = self.clock.now();
            if now >= deadline {
                break now;
            }
            self.simulate(rng);
        };

        self.result(end.saturating_sub(start))
    }

    /// Run exactly `n` cycles, ignoring the time budget.
    pub fn run_cycles(
        &mut self,
        n: u32,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult<G::Move>, SearchError> {
        let start = self.clock.now();
        for _ in 0..n {
            self.simulate(rng);
        }
        let elapsed = self.clock.now().saturating_sub(start);
        self.result(elapsed)
    }

    /// Run a single cycle (select -> expand -> simulate -> backpropagate).
    fn simulate(&mut self, rng: &mut ChaCha20Rng) {
        // Every move played on the working copy this cycle, in order
        let mut line: Vec<G::Move> = Vec::new();

        let selected = self.select(&mut line);
        let leaf = self.expand(selected, &mut line, rng);
        let path_len = line.len();
        let outcome = self.rollout(&mut line, rng);

        while let Some(mv) = line.pop() {
            self.state.undo_move(mv);
        }

        self.tree.backpropagate(leaf, outcome, self.perspective);
        self.iterations += 1;

        trace!(
            leaf = leaf.0,
            path_len,
            outcome = %outcome,
            "MCTS cycle complete"
        );
    }

    /// Descend from the root while the node is fully expanded and has
    /// children, playing each chosen move on the working copy.
    fn select(&mut self, line: &mut Vec<G::Move>) -> NodeId {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);
            if !node.is_fully_expanded() || node.is_leaf() {
                return current;
            }

            let Some(child_id) = self.tree.select_child_ucb(current, self.config.exploration)
            else {
                return current;
            };

            if let Some(mv) = self.tree.get(child_id).mv {
                self.state.apply_move(mv);
                line.push(mv);
            }
            current = child_id;
        }
    }

    /// Expand one pending move of `node_id` chosen uniformly at random.
    /// Returns the new child, or `node_id` itself if nothing is pending.
    fn expand(&mut self, node_id: NodeId, line: &mut Vec<G::Move>, rng: &mut ChaCha20Rng) -> NodeId {
        let pending = &mut self.tree.get_mut(node_id).pending;
        if pending.is_empty() {
            return node_id;
        }

        let pick = rng.gen_range(0..pending.len());
        let mv = pending.swap_remove(pick);
        self.state.apply_move(mv);
        line.push(mv);

        let to_move = self.state.next_player();
        let legal_moves = self.state.legal_moves();
        self.tree.add_child(node_id, mv, to_move, legal_moves)
    }

    /// Play uniformly random moves on the working copy until the game has a
    /// result. Hitting the ply cap counts as a draw.
    fn rollout(&mut self, line: &mut Vec<G::Move>, rng: &mut ChaCha20Rng) -> Outcome {
        let mut plies = 0u32;

        loop {
            if let Some(outcome) = self.state.terminal_value() {
                return outcome;
            }
            if plies >= self.config.max_rollout_plies {
                trace!(plies, "Rollout cap reached, scoring as draw");
                return Outcome::Draw;
            }

            match self.state.random_move(rng) {
                Some(mv) => {
                    self.state.apply_move(mv);
                    line.push(mv);
                    plies += 1;
                }
                // Undecided position without moves; only a broken game gets here.
                None => return Outcome::Draw,
            }
        }
    }

    fn result(&self, elapsed: Duration) -> Result<SearchResult<G::Move>, SearchError> {
        let best_id = self
            .tree
            .best_child()
            .ok_or(SearchError::NoCompletedCycles)?;
        let best = self.tree.get(best_id);
        let mv = best.mv.ok_or(SearchError::NoCompletedCycles)?;

        let stats = self.tree.stats();
        debug!(
            iterations = self.iterations,
            nodes = stats.total_nodes,
            max_depth = stats.max_depth,
            visits = best.visits,
            win_rate = best.mean_score(),
            elapsed_ms = elapsed.as_millis() as u64,
            "MCTS search complete"
        );

        Ok(SearchResult {
            mv,
            iterations: self.iterations,
            root_visits: stats.root_visits,
            win_rate: best.mean_score(),
            elapsed,
        })
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree<G::Move> {
        &self.tree
    }

    /// Cycles completed so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// The working copy. Between cycles it equals the root position.
    pub fn state(&self) -> &G {
        &self.state
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

/// Convenience function to run a single MCTS search on the wall clock.
pub fn run_mcts<G: Game>(
    state: &G,
    config: SearchConfig,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult<G::Move>, SearchError> {
    let mut search = MctsSearch::new(state, config)?;
    search.run(rng)
}

/// Choose a move for the player to move in `state` within `time_budget`.
///
/// Builds a fresh tree and returns the most visited root move, which is
/// always legal in `state`.
pub fn select_move<G: Game>(
    state: &G,
    time_budget: Duration,
    rng: &mut ChaCha20Rng,
) -> Result<G::Move, SearchError> {
    let config = SearchConfig::default().with_time_budget(time_budget);
    run_mcts(state, config, rng).map(|result| result.mv)
}

/// [`select_move`] with a full config and an explicit clock.
pub fn select_move_with_clock<G: Game, C: Clock>(
    state: &G,
    config: SearchConfig,
    clock: C,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult<G::Move>, SearchError> {
    let mut search = MctsSearch::with_clock(state, config, clock)?;
    search.run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::StepClock;
    use games_dotsandboxes::{Move, State};
    use rand::SeedableRng;

    fn step_clock() -> StepClock {
        StepClock::new(Duration::from_millis(1))
    }

    #[test]
    fn test_root_visits_equal_cycles() {
        let state = State::new(2, 2, Player::One);
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&state, SearchConfig::for_testing()).unwrap();

        let result = search.run_cycles(100, &mut rng).unwrap();

        assert_eq!(result.iterations, 100);
        assert_eq!(result.root_visits, 100);
        assert_eq!(search.iterations(), 100);
        assert!(state.is_legal(result.mv));
    }

    #[test]
    fn test_children_visits_sum_to_parent() {
        let state = State::new(2, 2, Player::One);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut search = MctsSearch::new(&state, SearchConfig::for_testing()).unwrap();
        search.run_cycles(500, &mut rng).unwrap();

        let tree = search.tree();
        let root = tree.get(tree.root());
        assert!(root.is_fully_expanded());
        assert_eq!(root.children.len(), 12);

        for node in tree.arena() {
            if node.is_fully_expanded() && !node.is_leaf() {
                let sum: u32 = node.children.iter().map(|&id| tree.get(id).visits).sum();
                assert!(
                    sum == node.visits || sum + 1 == node.visits,
                    "children {} vs node {}",
                    sum,
                    node.visits
                );
            }
        }

        let root_sum: u32 = root.children.iter().map(|&id| tree.get(id).visits).sum();
        assert_eq!(root_sum, root.visits);
    }

    #[test]
    fn test_every_child_visited_after_expansion() {
        let state = State::new(2, 2, Player::One);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut search = MctsSearch::new(&state, SearchConfig::for_testing()).unwrap();
        search.run_cycles(200, &mut rng).unwrap();

        for node in search.tree().arena() {
            assert!(node.visits >= 1);
            assert!(node.score >= 0.0 && node.score <= f64::from(node.visits));
        }
    }

    #[test]
    fn test_working_state_restored_after_cycles() {
        let moves = [Move::horizontal(0, 0), Move::vertical(0, 0)];
        let state = State::replay(2, 3, Player::Two, &moves).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut search = MctsSearch::new(&state, SearchConfig::for_testing()).unwrap();

        for _ in 0..5 {
            search.run_cycles(20, &mut rng).unwrap();
            assert_eq!(search.state(), &state);
        }
    }

    #[test]
    fn test_result_is_legal_for_many_positions() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let mut state = State::new(3, 3, Player::One);

        while state.terminal_value().is_none() {
            let mut search = MctsSearch::new(&state, SearchConfig::for_testing()).unwrap();
            let result = search.run_cycles(50, &mut rng).unwrap();
            assert!(state.is_legal(result.mv), "{} is not legal", result.mv);
            state.apply_move(result.mv);
        }
    }

    #[test]
    fn test_time_budget_with_step_clock() {
        let state = State::new(3, 3, Player::One);
        let config = SearchConfig::for_testing().with_time_budget(Duration::from_millis(100));
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let result = select_move_with_clock(&state, config, step_clock(), &mut rng).unwrap();

        // Readings at 1..=99ms run a cycle, the reading at 100ms stops.
        assert_eq!(result.iterations, 99);
        assert_eq!(result.root_visits, 99);
        assert_eq!(result.elapsed, Duration::from_millis(100));
    }

    #[test]
    fn test_deterministic_with_seed_and_step_clock() {
        let config = SearchConfig::for_testing().with_time_budget(Duration::from_millis(80));

        let play = |seed: u64| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut state = State::new(2, 3, Player::One);
            let mut line = Vec::new();
            while state.terminal_value().is_none() {
                let result =
                    select_move_with_clock(&state, config.clone(), step_clock(), &mut rng).unwrap();
                state.apply_move(result.mv);
                line.push(result.mv);
            }
            line
        };

        assert_eq!(play(5), play(5));
    }

    #[test]
    fn test_zero_budget_completes_no_cycles() {
        let state = State::new(2, 2, Player::One);
        let config = SearchConfig::for_testing().with_time_budget(Duration::ZERO);
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        let err = select_move_with_clock(&state, config, step_clock(), &mut rng).unwrap_err();
        assert_eq!(err, SearchError::NoCompletedCycles);

        let err = select_move(&state, Duration::ZERO, &mut rng).unwrap_err();
        assert_eq!(err, SearchError::NoCompletedCycles);
    }

    #[test]
    fn test_no_legal_moves() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut state = State::new(1, 1, Player::One);
        for mv in state.legal_moves() {
            state.apply_move(mv);
        }

        assert!(matches!(
            MctsSearch::new(&state, SearchConfig::for_testing()),
            Err(SearchError::NoLegalMoves)
        ));
        assert_eq!(
            select_move(&state, Duration::from_millis(10), &mut rng),
            Err(SearchError::NoLegalMoves)
        );
    }

    #[test]
    fn test_single_legal_move_is_chosen() {
        let moves = [
            Move::horizontal(0, 0),
            Move::horizontal(1, 0),
            Move::vertical(0, 0),
        ];
        let state = State::replay(1, 1, Player::Two, &moves).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2);

        let mv = select_move(&state, Duration::from_millis(5), &mut rng).unwrap();
        assert_eq!(mv, Move::vertical(0, 1));
    }

    #[test]
    fn test_rollout_cap_scores_draw() {
        let state = State::new(3, 3, Player::One);
        let config = SearchConfig::for_testing().with_max_rollout_plies(0);
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&state, config).unwrap();

        let result = search.run_cycles(30, &mut rng).unwrap();

        // No position within two plies of the empty 3x3 board is decided, so
        // every cycle is cut off immediately.
        assert!((result.win_rate - 0.5).abs() < 1e-12);
        for node in search.tree().arena() {
            assert!((node.mean_score() - 0.5).abs() < 1e-12);
        }
        assert_eq!(search.state(), &state);
    }

    #[test]
    fn test_win_rate_is_mean_score() {
        let state = State::new(2, 2, Player::One);
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let mut search = MctsSearch::new(&state, SearchConfig::for_testing()).unwrap();
        let result = search.run_cycles(120, &mut rng).unwrap();

        let tree = search.tree();
        let best = tree.get(tree.best_child().unwrap());
        assert_eq!(best.mv, Some(result.mv));
        assert!((result.win_rate - best.mean_score()).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&result.win_rate));
    }

    #[test]
    fn test_wall_clock_search_completes_cycles() {
        let state = State::new(3, 3, Player::One);
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let result = run_mcts(&state, SearchConfig::for_testing(), &mut rng).unwrap();

        assert!(result.iterations > 0);
        assert_eq!(result.iterations, result.root_visits);
        assert!(result.elapsed >= SearchConfig::for_testing().time_budget);
        assert!(state.is_legal(result.mv));
    }
}
