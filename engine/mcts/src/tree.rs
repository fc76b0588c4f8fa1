//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices.

use engine_core::{Outcome, Player};

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<M> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<M>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl<M: Copy> MctsTree<M> {
    /// Create a new tree whose root has `to_move` to play and `legal_moves`
    /// still to expand.
    pub fn new(to_move: Player, legal_moves: Vec<M>) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(to_move, legal_moves)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<M> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<M> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode<M>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode<M>] {
        &self.nodes
    }

    /// Select the child of `node_id` with the highest UCB1 value.
    ///
    /// Ties go to the first child in creation order. Returns `None` if the
    /// node has no children.
    ///
    /// # Panics
    ///
    /// Panics if any child has never been visited. Selection only runs on
    /// fully expanded nodes, and every child is visited in the cycle that
    /// creates it.
    pub fn select_child_ucb(&self, node_id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        // One logarithm for all siblings
        let ln_parent_visits = f64::from(node.visits).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &node.children {
            let child = self.get(child_id);
            assert!(
                child.visits > 0,
                "UCB selection over unvisited child {:?} of node {:?}",
                child_id,
                node_id
            );

            let value = child.ucb_score(ln_parent_visits, exploration);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((child_id, value)),
            }
        }

        best.map(|(id, _)| id)
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        mv: M,
        to_move: Player,
        legal_moves: Vec<M>,
    ) -> NodeId {
        let child = MctsNode::new_child(parent_id, mv, to_move, legal_moves);
        let child_id = self.allocate(child);

        self.get_mut(parent_id).children.push(child_id);

        child_id
    }

    /// Credit a rollout result to `leaf_id` and every ancestor up to and
    /// including the root.
    ///
    /// Each node gets one visit plus its own [`MctsNode::backprop_score`].
    pub fn backpropagate(&mut self, leaf_id: NodeId, outcome: Outcome, perspective: Player) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            let gain = node.backprop_score(outcome, perspective);
            node.visits += 1;
            node.score += gain;
            current_id = node.parent;
        }
    }

    /// The root child with the most visits (robust child).
    /// Ties go to the first child. Returns None if the root has no children.
    pub fn best_child(&self) -> Option<NodeId> {
        let root = self.get(self.root);
        let mut best: Option<NodeId> = None;
        for &child_id in &root.children {
            match best {
                Some(best_id) if self.get(child_id).visits <= self.get(best_id).visits => {}
                _ => best = Some(child_id),
            }
        }
        best
    }

    /// Move and visit count of the robust child.
    pub fn best_move(&self) -> Option<(M, u32)> {
        let child = self.get(self.best_child()?);
        child.mv.map(|mv| (mv, child.visits))
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: self.get(self.root).visits,
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        self.get(node_id)
            .children
            .iter()
            .map(|id| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}
