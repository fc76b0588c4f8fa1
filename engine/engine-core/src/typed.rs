//! Typed game trait consumed by the search.
//!
//! A `Game` value is one mutable position of a two-player game together with
//! its rules. The search only ever talks to positions through this trait, so
//! it stays independent of any particular board representation.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use crate::board_game::{Outcome, Player};

/// A position of a two-player, perfect-information game.
///
/// Positions are mutated in place. `apply_move` and `undo_move` must be exact
/// inverses when undone in LIFO order: the search replays a path forward from
/// the root every cycle and rewinds it afterwards instead of copying a
/// position per tree node.
///
/// # Example
///
/// ```rust
/// # use engine_core::{Game, Outcome, Player};
/// #[derive(Debug, Clone)]
/// struct Countdown {
///     left: u8,
///     to_move: Player,
/// }
///
/// impl Game for Countdown {
///     type Move = u8;
///
///     fn legal_moves(&self) -> Vec<u8> {
///         (1..=self.left.min(2)).collect()
///     }
///     fn apply_move(&mut self, take: u8) -> u32 {
///         self.left -= take;
///         self.to_move = self.to_move.opponent();
///         0
///     }
///     fn undo_move(&mut self, take: u8) {
///         self.left += take;
///         self.to_move = self.to_move.opponent();
///     }
///     fn terminal_value(&self) -> Option<Outcome> {
///         (self.left == 0).then(|| {
///             if self.to_move == Player::One { Outcome::Loss } else { Outcome::Win }
///         })
///     }
///     fn next_player(&self) -> Player { self.to_move }
///     fn perspective(&self) -> Player { Player::One }
/// }
/// ```
pub trait Game: Clone + std::fmt::Debug {
    /// Move type. Small and `Copy`; the tree stores one per node.
    type Move: Copy + Eq + std::fmt::Debug;

    /// Every move that is legal in this position, in a deterministic order.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Whether `mv` is currently legal.
    fn is_legal(&self, mv: Self::Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    /// Play `mv` for the player to move.
    ///
    /// Returns the points the mover scored with this move (0 for games without
    /// scoring).
    ///
    /// # Panics
    ///
    /// Implementations panic when `mv` is not legal.
    fn apply_move(&mut self, mv: Self::Move) -> u32;

    /// Take back `mv`, which must be the most recently applied move.
    ///
    /// # Panics
    ///
    /// Implementations panic when `mv` was never played.
    fn undo_move(&mut self, mv: Self::Move);

    /// Outcome from the perspective player's point of view, or `None` while
    /// the game is undecided.
    fn terminal_value(&self) -> Option<Outcome>;

    /// A uniformly chosen legal move, or `None` when no moves remain.
    fn random_move(&self, rng: &mut ChaCha20Rng) -> Option<Self::Move> {
        self.legal_moves().choose(rng).copied()
    }

    /// Player whose turn it is.
    fn next_player(&self) -> Player;

    /// Player this position is evaluated for. Fixed for the whole game.
    fn perspective(&self) -> Player;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Take one or two stones; whoever takes the last stone wins.
    #[derive(Debug, Clone, PartialEq)]
    struct Countdown {
        left: u8,
        to_move: Player,
        perspective: Player,
    }

    impl Game for Countdown {
        type Move = u8;

        fn legal_moves(&self) -> Vec<u8> {
            (1..=self.left.min(2)).collect()
        }

        fn apply_move(&mut self, take: u8) -> u32 {
            assert!(self.is_legal(take), "illegal take {}", take);
            self.left -= take;
            self.to_move = self.to_move.opponent();
            0
        }

        fn undo_move(&mut self, take: u8) {
            self.left += take;
            self.to_move = self.to_move.opponent();
        }

        fn terminal_value(&self) -> Option<Outcome> {
            if self.left > 0 {
                return None;
            }
            let winner = self.to_move.opponent();
            Some(if winner == self.perspective {
                Outcome::Win
            } else {
                Outcome::Loss
            })
        }

        fn next_player(&self) -> Player {
            self.to_move
        }

        fn perspective(&self) -> Player {
            self.perspective
        }
    }

    fn countdown(left: u8) -> Countdown {
        Countdown {
            left,
            to_move: Player::One,
            perspective: Player::One,
        }
    }

    #[test]
    fn test_default_is_legal() {
        let game = countdown(1);
        assert!(game.is_legal(1));
        assert!(!game.is_legal(2));
    }

    #[test]
    fn test_default_random_move_is_legal() {
        let game = countdown(5);
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        for _ in 0..20 {
            let mv = game.random_move(&mut rng).unwrap();
            assert!(game.is_legal(mv));
        }
    }

    #[test]
    fn test_default_random_move_none_when_finished() {
        let game = countdown(0);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        assert!(game.random_move(&mut rng).is_none());
    }

    #[test]
    fn test_apply_undo_roundtrip() {
        let mut game = countdown(4);
        let before = game.clone();
        game.apply_move(2);
        game.apply_move(1);
        game.undo_move(1);
        game.undo_move(2);
        assert_eq!(game, before);
    }

    #[test]
    fn test_terminal_value_perspective() {
        let mut game = countdown(2);
        game.apply_move(2);
        assert_eq!(game.terminal_value(), Some(Outcome::Win));

        let mut game = Countdown {
            perspective: Player::Two,
            ..countdown(2)
        };
        game.apply_move(2);
        assert_eq!(game.terminal_value(), Some(Outcome::Loss));
    }
}
