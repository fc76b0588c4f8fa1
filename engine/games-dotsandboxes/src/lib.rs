//! Dots-and-Boxes game implementation for the engine
//!
//! This crate provides the exact rule model used by the search: legal move
//! enumeration, move application with box completion and the extra-turn
//! rule, the inverse of a move, and the (possibly early) terminal verdict.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Outcome, Player};
//! use games_dotsandboxes::{Move, State};
//!
//! let mut state = State::new(1, 1, Player::One);
//! assert_eq!(state.legal_moves().len(), 4);
//!
//! state.apply_move(Move::horizontal(0, 0)); // player 1
//! state.apply_move(Move::horizontal(1, 0)); // player 2
//! state.apply_move(Move::vertical(0, 0)); // player 1
//! let boxes = state.apply_move(Move::vertical(0, 1)); // player 2 closes the box
//!
//! assert_eq!(boxes, 1);
//! assert_eq!(state.score(Player::Two), 1);
//! assert_eq!(state.terminal_value(), Some(Outcome::Loss));
//! ```

use std::fmt;
use std::str::FromStr;

use engine_core::{Game, GameError, Outcome, Player};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    /// Edge from dot (r, c) to dot (r, c+1)
    Horizontal,
    /// Edge from dot (r, c) to dot (r+1, c)
    Vertical,
}

impl Orientation {
    /// Single-letter form used in the move text format.
    pub fn symbol(self) -> char {
        match self {
            Orientation::Horizontal => 'h',
            Orientation::Vertical => 'v',
        }
    }
}

/// A move: drawing the edge at (row, col) with the given orientation.
///
/// Rows and columns index dots, so a board of `rows x cols` boxes has
/// `(rows + 1) x (cols + 1)` dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub orientation: Orientation,
}

impl Move {
    pub fn new(row: usize, col: usize, orientation: Orientation) -> Self {
        Self {
            row,
            col,
            orientation,
        }
    }

    pub fn horizontal(row: usize, col: usize) -> Self {
        Self::new(row, col, Orientation::Horizontal)
    }

    pub fn vertical(row: usize, col: usize) -> Self {
        Self::new(row, col, Orientation::Vertical)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.row, self.col, self.orientation.symbol())
    }
}

/// Errors from parsing the `row,col,h|v` move format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Expected `row,col,orientation` but got {0} field(s)")]
    FieldCount(usize),

    #[error("Invalid index: {0:?}")]
    InvalidIndex(String),

    #[error("Invalid orientation: {0:?} (expected h or v)")]
    InvalidOrientation(String),
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(MoveParseError::FieldCount(fields.len()));
        }

        let index = |field: &str| {
            field
                .parse::<usize>()
                .map_err(|_| MoveParseError::InvalidIndex(field.to_string()))
        };
        let row = index(fields[0])?;
        let col = index(fields[1])?;

        let orientation = match fields[2] {
            "h" | "H" => Orientation::Horizontal,
            "v" | "V" => Orientation::Vertical,
            other => return Err(MoveParseError::InvalidOrientation(other.to_string())),
        };

        Ok(Move::new(row, col, orientation))
    }
}

/// Parse a move history such as `"0,0,h; 1,0,v"`.
///
/// Moves are separated by `;` or whitespace. An empty string is an empty
/// history.
pub fn parse_moves(s: &str) -> Result<Vec<Move>, MoveParseError> {
    s.split(|c: char| c == ';' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

/// Edge slots stored at one dot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cell {
    horizontal: Option<Player>,
    vertical: Option<Player>,
}

/// Dots-and-Boxes position
///
/// Holds the board, both scores, the player to move and the fixed
/// perspective player that terminal values are reported for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    rows: usize,
    cols: usize,
    /// `(rows + 1) * (cols + 1)` dots, row-major
    cells: Vec<Cell>,
    /// Boxes completed, indexed by `Player::index`
    scores: [u32; 2],
    next_player: Player,
    perspective: Player,
    moves_played: usize,
}

impl State {
    /// Create an empty board of `rows x cols` boxes. Player 1 moves first.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, cols: usize, perspective: Player) -> Self {
        assert!(
            rows > 0 && cols > 0,
            "board must have at least one box, got {}x{}",
            rows,
            cols
        );

        Self {
            rows,
            cols,
            cells: vec![Cell::default(); (rows + 1) * (cols + 1)],
            scores: [0; 2],
            next_player: Player::One,
            perspective,
            moves_played: 0,
        }
    }

    /// Build a position by replaying a move history from the empty board.
    pub fn replay(
        rows: usize,
        cols: usize,
        perspective: Player,
        moves: &[Move],
    ) -> Result<Self, GameError> {
        let mut state = Self::new(rows, cols, perspective);
        for &mv in moves {
            state.try_apply_move(mv)?;
        }
        Ok(state)
    }

    /// The same position, evaluated for another player.
    pub fn with_perspective(&self, perspective: Player) -> Self {
        Self {
            perspective,
            ..self.clone()
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of boxes on the board.
    pub fn total_boxes(&self) -> u32 {
        (self.rows * self.cols) as u32
    }

    /// Number of edges on the board.
    pub fn total_edges(&self) -> usize {
        self.rows * (self.cols + 1) + self.cols * (self.rows + 1)
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn perspective(&self) -> Player {
        self.perspective
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    /// Whether every edge has been drawn.
    pub fn is_full(&self) -> bool {
        self.moves_played == self.total_edges()
    }

    #[inline]
    fn cell_index(&self, row: usize, col: usize) -> usize {
        row * (self.cols + 1) + col
    }

    /// Whether `mv` names an edge of this board. Outer-frame edges never
    /// point past the last row or column of dots.
    pub fn in_bounds(&self, mv: Move) -> bool {
        match mv.orientation {
            Orientation::Horizontal => mv.row <= self.rows && mv.col < self.cols,
            Orientation::Vertical => mv.row < self.rows && mv.col <= self.cols,
        }
    }

    #[inline]
    fn slot(&self, row: usize, col: usize, orientation: Orientation) -> Option<Player> {
        let cell = &self.cells[self.cell_index(row, col)];
        match orientation {
            Orientation::Horizontal => cell.horizontal,
            Orientation::Vertical => cell.vertical,
        }
    }

    fn set_slot(&mut self, mv: Move, owner: Option<Player>) {
        let index = self.cell_index(mv.row, mv.col);
        let cell = &mut self.cells[index];
        match mv.orientation {
            Orientation::Horizontal => cell.horizontal = owner,
            Orientation::Vertical => cell.vertical = owner,
        }
    }

    /// Player who drew `mv`, or `None` if it is still free or off the board.
    pub fn owner(&self, mv: Move) -> Option<Player> {
        if !self.in_bounds(mv) {
            return None;
        }
        self.slot(mv.row, mv.col, mv.orientation)
    }

    /// Whether `mv` is on the board and not yet drawn.
    pub fn is_legal(&self, mv: Move) -> bool {
        self.in_bounds(mv) && self.slot(mv.row, mv.col, mv.orientation).is_none()
    }

    /// All edges of the board in scan order: row-major over dots, vertical
    /// edge before horizontal edge at each dot.
    fn edges(&self) -> impl Iterator<Item = Move> + '_ {
        (0..=self.rows).flat_map(move |row| {
            (0..=self.cols).flat_map(move |col| {
                let vertical = (row < self.rows).then(|| Move::vertical(row, col));
                let horizontal = (col < self.cols).then(|| Move::horizontal(row, col));
                vertical.into_iter().chain(horizontal)
            })
        })
    }

    fn free_edges(&self) -> impl Iterator<Item = Move> + '_ {
        self.edges()
            .filter(move |mv| self.slot(mv.row, mv.col, mv.orientation).is_none())
    }

    /// Every edge not yet drawn.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.free_edges().collect()
    }

    /// Number of edges not yet drawn.
    pub fn legal_move_count(&self) -> usize {
        self.total_edges() - self.moves_played
    }

    /// A uniformly chosen free edge, or `None` on a full board.
    pub fn random_move<R: Rng>(&self, rng: &mut R) -> Option<Move> {
        let count = self.legal_move_count();
        if count == 0 {
            return None;
        }
        let pick = rng.gen_range(0..count);
        self.free_edges().nth(pick)
    }

    /// Boxes (by top-left dot) that have `mv` as one of their sides.
    fn adjacent_boxes(&self, mv: Move) -> impl Iterator<Item = (usize, usize)> {
        let (row, col) = (mv.row, mv.col);
        let (before, after) = match mv.orientation {
            // above and below
            Orientation::Horizontal => (
                (row > 0).then(|| (row - 1, col)),
                (row < self.rows).then_some((row, col)),
            ),
            // left and right
            Orientation::Vertical => (
                (col > 0).then(|| (row, col - 1)),
                (col < self.cols).then_some((row, col)),
            ),
        };
        before.into_iter().chain(after)
    }

    /// Whether all four sides of the box with top-left dot (row, col) are drawn.
    fn box_complete(&self, row: usize, col: usize) -> bool {
        self.slot(row, col, Orientation::Horizontal).is_some()
            && self.slot(row + 1, col, Orientation::Horizontal).is_some()
            && self.slot(row, col, Orientation::Vertical).is_some()
            && self.slot(row, col + 1, Orientation::Vertical).is_some()
    }

    fn complete_boxes_around(&self, mv: Move) -> u8 {
        self.adjacent_boxes(mv)
            .filter(|&(row, col)| self.box_complete(row, col))
            .count() as u8
    }

    /// Draw `mv` for the player to move and return the number of boxes it
    /// completed (0, 1 or 2).
    ///
    /// Completed boxes are credited to the mover. The turn passes to the
    /// other player only when no box was completed.
    ///
    /// # Panics
    ///
    /// Panics if `mv` is off the board or already drawn.
    pub fn apply_move(&mut self, mv: Move) -> u8 {
        assert!(
            self.is_legal(mv),
            "illegal move {} on a {}x{} board",
            mv,
            self.rows,
            self.cols
        );

        let mover = self.next_player;
        self.set_slot(mv, Some(mover));

        // The edge was free until now, so every adjacent box that is complete
        // was completed by this move.
        let completed = self.complete_boxes_around(mv);
        self.scores[mover.index()] += u32::from(completed);
        self.moves_played += 1;

        if completed == 0 {
            self.next_player = mover.opponent();
        }

        completed
    }

    /// Checked form of [`State::apply_move`] for moves from outside the engine.
    pub fn try_apply_move(&mut self, mv: Move) -> Result<u8, GameError> {
        if !self.in_bounds(mv) {
            return Err(GameError::OutOfBounds {
                mv: mv.to_string(),
                rows: self.rows,
                cols: self.cols,
            });
        }
        if let Some(owner) = self.owner(mv) {
            return Err(GameError::IllegalMove(format!(
                "{} was already drawn by player {}",
                mv, owner
            )));
        }
        Ok(self.apply_move(mv))
    }

    /// Take back `mv`. It must be the most recently applied move.
    ///
    /// The edge's owner is the player who drew it, and every box around the
    /// edge that is complete now was completed by that move.
    ///
    /// # Panics
    ///
    /// Panics if `mv` has not been drawn.
    pub fn undo_move(&mut self, mv: Move) {
        let mover = match self.owner(mv) {
            Some(player) => player,
            None => panic!("cannot undo {}: edge has not been drawn", mv),
        };

        let completed = self.complete_boxes_around(mv);
        self.scores[mover.index()] -= u32::from(completed);
        self.set_slot(mv, None);
        self.moves_played -= 1;
        self.next_player = mover;
    }

    /// Whether one player already holds more than half of all boxes.
    fn is_decided(&self) -> bool {
        let half = self.total_boxes() / 2;
        self.scores.iter().any(|&score| score > half)
    }

    /// Result from the perspective player's point of view.
    ///
    /// The game is over as soon as either player holds more than half of the
    /// boxes, even with edges left to draw. Otherwise it is over when the board
    /// is full. Returns `None` while the result is still open.
    pub fn terminal_value(&self) -> Option<Outcome> {
        if !self.is_decided() && !self.is_full() {
            return None;
        }
        let own = self.score(self.perspective);
        let other = self.score(self.perspective.opponent());
        Some(Outcome::from_scores(own, other))
    }
}

impl fmt::Display for State {
    /// ASCII board: `.` for dots, `__` for horizontal and `|` for vertical
    /// edges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..=self.rows {
            for col in 0..=self.cols {
                f.write_str(".")?;
                if col < self.cols {
                    let drawn = self.slot(row, col, Orientation::Horizontal).is_some();
                    f.write_str(if drawn { "__" } else { "  " })?;
                }
            }
            writeln!(f)?;

            if row < self.rows {
                for col in 0..=self.cols {
                    let drawn = self.slot(row, col, Orientation::Vertical).is_some();
                    f.write_str(if drawn { "|" } else { " " })?;
                    if col < self.cols {
                        f.write_str("  ")?;
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl Game for State {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        State::legal_moves(self)
    }

    fn is_legal(&self, mv: Move) -> bool {
        State::is_legal(self, mv)
    }

    fn apply_move(&mut self, mv: Move) -> u32 {
        u32::from(State::apply_move(self, mv))
    }

    fn undo_move(&mut self, mv: Move) {
        State::undo_move(self, mv)
    }

    fn terminal_value(&self) -> Option<Outcome> {
        State::terminal_value(self)
    }

    fn random_move(&self, rng: &mut ChaCha20Rng) -> Option<Move> {
        State::random_move(self, rng)
    }

    fn next_player(&self) -> Player {
        self.next_player
    }

    fn perspective(&self) -> Player {
        self.perspective
    }
}
