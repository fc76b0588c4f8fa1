//! Shared types for two-player board games.
//!
//! Player identities and game outcomes are used by every game crate and by
//! the search, so they live here instead of being redefined per game.

use std::fmt;

use crate::error::GameError;

/// One of the two seats at the table.
///
/// The numeric ids (1 and 2) are part of the game's external vocabulary:
/// harnesses announce players by id and the search compares ids against
/// outcome values when scoring nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Both players in seat order.
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    /// Numeric id of the player (1 or 2).
    #[inline]
    pub fn id(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Zero-based index, handy for per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// The other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Parse a numeric player id.
    pub fn from_id(id: u8) -> Result<Player, GameError> {
        match id {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(GameError::InvalidPlayer(other)),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl TryFrom<u8> for Player {
    type Error = GameError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Player::from_id(id)
    }
}

/// Final result of a game, seen from a fixed perspective player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The perspective player's opponent wins.
    Loss,
    /// Equal scores on a finished board.
    Draw,
    /// The perspective player wins.
    Win,
}

impl Outcome {
    /// Outcome value on the 0.0 / 0.5 / 1.0 scale.
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
            Outcome::Win => 1.0,
        }
    }

    /// Compare two final scores, `own` belonging to the perspective player.
    pub fn from_scores(own: u32, other: u32) -> Outcome {
        match own.cmp(&other) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// The same result seen from the other player's side.
    pub fn flipped(self) -> Outcome {
        match self {
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
            Outcome::Win => Outcome::Loss,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
            Outcome::Win => "win",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_ids() {
        assert_eq!(Player::One.id(), 1);
        assert_eq!(Player::Two.id(), 2);
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
        assert_eq!(Player::Two.index(), 1);
    }

    #[test]
    fn test_player_from_id() {
        assert_eq!(Player::from_id(1).unwrap(), Player::One);
        assert_eq!(Player::try_from(2u8).unwrap(), Player::Two);
        assert!(matches!(
            Player::from_id(3),
            Err(GameError::InvalidPlayer(3))
        ));
        assert!(Player::from_id(0).is_err());
    }

    #[test]
    fn test_outcome_values() {
        assert_eq!(Outcome::Loss.value(), 0.0);
        assert_eq!(Outcome::Draw.value(), 0.5);
        assert_eq!(Outcome::Win.value(), 1.0);
    }

    #[test]
    fn test_outcome_from_scores() {
        assert_eq!(Outcome::from_scores(3, 1), Outcome::Win);
        assert_eq!(Outcome::from_scores(1, 3), Outcome::Loss);
        assert_eq!(Outcome::from_scores(2, 2), Outcome::Draw);
        assert_eq!(Outcome::Win.flipped(), Outcome::Loss);
        assert_eq!(Outcome::Draw.flipped(), Outcome::Draw);
    }
}
