//! MCTS configuration parameters.

use std::time::Duration;

/// Configuration for a time-bounded search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Wall-clock budget per move selection. Polled between whole cycles, so
    /// a search may overrun by at most one cycle.
    pub time_budget: Duration,

    /// Exploration constant `c` in `mean + c * sqrt(ln N / n)`.
    /// The default √2 gives the textbook UCB1 term `sqrt(2 ln N / n)`.
    pub exploration: f64,

    /// Random plies a rollout may play before it is cut off and scored as a
    /// draw.
    pub max_rollout_plies: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_millis(1000),
            exploration: std::f64::consts::SQRT_2,
            max_rollout_plies: 1000,
        }
    }
}

impl SearchConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            time_budget: Duration::from_millis(50),
            ..Self::default()
        }
    }

    /// Builder pattern: set the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the rollout safety cap.
    pub fn with_max_rollout_plies(mut self, plies: u32) -> Self {
        self.max_rollout_plies = plies;
        self
    }
}
