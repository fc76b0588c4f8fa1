//! MCTS tree node representation.
//!
//! Each node stands for the position reached by playing `mv` from its parent.
//! Positions themselves are not stored: the search replays the path from the
//! root. Nodes only carry the statistics used for UCB selection.

use engine_core::{Outcome, Player};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode<M> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led to this node from parent (None for root)
    pub mv: Option<M>,

    /// Player to move at this node
    pub to_move: Player,

    /// Legal moves at this position that have no child yet
    pub pending: Vec<M>,

    /// Children in creation order
    pub children: Vec<NodeId>,

    /// Number of times this node has been visited
    pub visits: u32,

    /// Sum of backpropagated scores
    pub score: f64,
}

impl<M> MctsNode<M> {
    /// Create a new root node.
    pub fn new_root(to_move: Player, pending: Vec<M>) -> Self {
        Self {
            parent: NodeId::NONE,
            mv: None,
            to_move,
            pending,
            children: Vec::new(),
            visits: 0,
            score: 0.0,
        }
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, mv: M, to_move: Player, pending: Vec<M>) -> Self {
        Self {
            parent,
            mv: Some(mv),
            ..Self::new_root(to_move, pending)
        }
    }

    /// Mean score, 0.0 if never visited.
    #[inline]
    pub fn mean_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.score / f64::from(self.visits)
        }
    }

    /// UCB1 value of this node as seen from its parent:
    /// `score / visits + c * sqrt(ln(N_parent) / visits)`.
    ///
    /// Takes a pre-computed `ln(N_parent)` so siblings share one logarithm.
    #[inline]
    pub fn ucb_score(&self, ln_parent_visits: f64, exploration: f64) -> f64 {
        let n = f64::from(self.visits);
        self.score / n + exploration * (ln_parent_visits / n).sqrt()
    }

    /// Whether every legal move at this node already has a child.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.pending.is_empty()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Score this node receives for a rollout ending in `outcome`, where
    /// `outcome` is measured for `perspective`.
    ///
    /// A draw always counts 0.5. Otherwise the numeric id of the player to
    /// move (1 or 2) is compared with the raw outcome value (0.0 or 1.0),
    /// which only matches when player 1 is to move after a win. For
    /// perspective 1 a match scores 1.0 and anything else 0.0; for
    /// perspective 2 it is the other way round.
    pub fn backprop_score(&self, outcome: Outcome, perspective: Player) -> f64 {
        if outcome == Outcome::Draw {
            return Outcome::Draw.value();
        }

        let aligned = f64::from(self.to_move.id()) == outcome.value();
        match (perspective, aligned) {
            (Player::One, true) | (Player::Two, false) => 1.0,
            (Player::One, false) | (Player::Two, true) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(to_move: Player) -> MctsNode<u8> {
        MctsNode::new_root(to_move, vec![0, 1, 2])
    }

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let root = node(Player::One);
        assert!(root.parent.is_none());
        assert!(root.mv.is_none());
        assert_eq!(root.visits, 0);
        assert_eq!(root.pending, vec![0, 1, 2]);
        assert!(root.is_leaf());
        assert!(!root.is_fully_expanded());
    }

    #[test]
    fn test_new_child() {
        let child = MctsNode::new_child(NodeId(0), 7u8, Player::Two, vec![]);
        assert_eq!(child.parent, NodeId(0));
        assert_eq!(child.mv, Some(7));
        assert_eq!(child.to_move, Player::Two);
        assert!(child.is_fully_expanded());
    }

    #[test]
    fn test_mean_score() {
        let mut n = node(Player::One);
        assert!(n.mean_score().abs() < 1e-12);

        n.visits = 4;
        n.score = 3.0;
        assert!((n.mean_score() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_ucb_score() {
        let mut n = node(Player::One);
        n.visits = 10;
        n.score = 5.0;

        // 0.5 + sqrt(2) * sqrt(ln(100) / 10)
        let ln_parent = (100f64).ln();
        let expected = 0.5 + 2f64.sqrt() * (ln_parent / 10.0).sqrt();
        let ucb = n.ucb_score(ln_parent, std::f64::consts::SQRT_2);
        assert!((ucb - expected).abs() < 1e-12);

        // With c = sqrt(2) this is the sqrt(2 ln N / n) form.
        let textbook = 0.5 + (2.0 * ln_parent / 10.0).sqrt();
        assert!((ucb - textbook).abs() < 1e-12);
    }

    #[test]
    fn test_backprop_draw_is_half() {
        for to_move in Player::ALL {
            for perspective in Player::ALL {
                let score = node(to_move).backprop_score(Outcome::Draw, perspective);
                assert!((score - 0.5).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_backprop_perspective_one() {
        let p1 = node(Player::One);
        let p2 = node(Player::Two);

        assert_eq!(p1.backprop_score(Outcome::Win, Player::One), 1.0);
        assert_eq!(p1.backprop_score(Outcome::Loss, Player::One), 0.0);
        assert_eq!(p2.backprop_score(Outcome::Win, Player::One), 0.0);
        assert_eq!(p2.backprop_score(Outcome::Loss, Player::One), 0.0);
    }

    #[test]
    fn test_backprop_perspective_two() {
        let p1 = node(Player::One);
        let p2 = node(Player::Two);

        assert_eq!(p1.backprop_score(Outcome::Win, Player::Two), 0.0);
        assert_eq!(p1.backprop_score(Outcome::Loss, Player::Two), 1.0);
        assert_eq!(p2.backprop_score(Outcome::Win, Player::Two), 1.0);
        assert_eq!(p2.backprop_score(Outcome::Loss, Player::Two), 1.0);
    }
}
