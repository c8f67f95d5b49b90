//! Search Tree (C5).
//!
//! Node allocation and the PUCT selection primitive. Nodes live in a single
//! arena (`Vec<Node>`) indexed by `NodeId`; parent links are back-reference
//! indices, never owning pointers, per spec §9's recommendation.

use crate::board::{Position, Side};
use crate::move_codec::Move;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// One node of the search tree (spec §3).
pub struct Node {
    /// Lazily materialized position; absent until the selection walk first
    /// traverses into this node.
    position: Option<Position>,
    side_to_move: Side,
    /// Prior probability assigned by the parent's expansion.
    prior: f32,
    visits: u32,
    value_sum: f32,
    expanded: bool,
    /// `Some(v)` iff this node is terminal, `v` being the game result from
    /// this node's side-to-move perspective.
    terminal_value: Option<f32>,
    parent: Option<NodeId>,
    incoming_move: Option<Move>,
    /// One entry per legal move of this node's position, created together
    /// at expansion. Order is the enumeration order from `all_legal_moves`
    /// and is the tie-break order for PUCT selection.
    children: Vec<(Move, NodeId)>,
}

impl Node {
    fn root(position: Position, side_to_move: Side) -> Node {
        Node {
            position: Some(position),
            side_to_move,
            prior: 1.0,
            visits: 0,
            value_sum: 0.0,
            expanded: false,
            terminal_value: None,
            parent: None,
            incoming_move: None,
            children: Vec::new(),
        }
    }

    fn child(
        side_to_move: Side,
        prior: f32,
        parent: NodeId,
        incoming_move: Move,
    ) -> Node {
        Node {
            position: None,
            side_to_move,
            prior,
            visits: 0,
            value_sum: 0.0,
            expanded: false,
            terminal_value: None,
            parent: Some(parent),
            incoming_move: Some(incoming_move),
            children: Vec::new(),
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn prior(&self) -> f32 {
        self.prior
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Mean value Q = W/N, 0.0 for an unvisited node.
    pub fn q(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_value.is_some()
    }

    pub fn terminal_value(&self) -> Option<f32> {
        self.terminal_value
    }

    pub fn mark_terminal(&mut self, value: f32) {
        debug_assert!((-1.0..=1.0).contains(&value));
        self.terminal_value = Some(value);
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn incoming_move(&self) -> Option<Move> {
        self.incoming_move
    }

    pub fn children(&self) -> &[(Move, NodeId)] {
        &self.children
    }

    pub fn child_by_move(&self, mv: Move) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }
}

/// The search tree: an arena of nodes plus the root.
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build a brand-new single-node tree rooted at `position`.
    pub fn new(position: Position, side_to_move: Side) -> Tree {
        Tree {
            nodes: vec![Node::root(position, side_to_move)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root position and side to move, used by the engine's reuse check.
    pub fn root_identity(&self) -> (Position, Side) {
        let root = self.get(self.root());
        (
            root.position()
                .cloned()
                .expect("root node always has a materialized position"),
            root.side_to_move(),
        )
    }

    /// Expand `node_id` with one child per `(move, prior)` pair. Priors are
    /// assumed already normalized (spec §4.5); child positions are not
    /// materialized here (lazy, spec §9).
    pub fn expand(&mut self, node_id: NodeId, children: &[(Move, f32)]) {
        let side_to_move = self.get(node_id).side_to_move().opponent();
        for &(mv, prior) in children {
            let child_id = NodeId(self.nodes.len());
            self.nodes
                .push(Node::child(side_to_move, prior, node_id, mv));
            self.get_mut(node_id).children.push((mv, child_id));
        }
        self.get_mut(node_id).expanded = true;
    }

    /// PUCT selection (spec §4.5): pick the child of `node_id` maximizing
    /// `Q̂(c) + c_puct * P(c) * sqrt(N(n)) / (1 + N(c))`, with First-Play
    /// Urgency for unvisited children and ties broken by enumeration order.
    pub fn select_child(&self, node_id: NodeId, c_puct: f32, fpu_reduction: f32) -> NodeId {
        let node = self.get(node_id);
        debug_assert!(!node.children.is_empty());
        let parent_visits_sqrt = (node.visits() as f32).sqrt();
        let parent_q = node.q();

        let mut best: Option<(NodeId, f32)> = None;
        for &(_, child_id) in &node.children {
            let child = self.get(child_id);
            let q_hat = if child.visits() > 0 {
                -child.q()
            } else {
                -(parent_q - fpu_reduction)
            };
            let exploration =
                c_puct * child.prior() * parent_visits_sqrt / (1.0 + child.visits() as f32);
            let score = q_hat + exploration;
            if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
                best = Some((child_id, score));
            }
        }
        best.expect("node has at least one child").0
    }

    /// Backup (spec §4.5): apply `value` (from the leaf's perspective) up
    /// `path`, flipping sign at every step.
    pub fn backup(&mut self, path: &[NodeId], leaf_value: f32) {
        let mut v = leaf_value;
        for &node_id in path.iter().rev() {
            let node = self.get_mut(node_id);
            node.visits += 1;
            node.value_sum += v;
            v = -v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    fn fresh_tree() -> Tree {
        Tree::new(Position::initial(), Side::Attacker)
    }

    #[test]
    fn expand_creates_one_child_per_move_with_normalized_priors() {
        let mut tree = fresh_tree();
        let root = tree.root();
        let children = vec![
            (
                crate::move_codec::Move {
                    from_row: 0,
                    from_col: 3,
                    to_row: 1,
                    to_col: 3,
                },
                0.5,
            ),
            (
                crate::move_codec::Move {
                    from_row: 0,
                    from_col: 3,
                    to_row: 2,
                    to_col: 3,
                },
                0.5,
            ),
        ];
        tree.expand(root, &children);
        assert!(tree.get(root).is_expanded());
        assert_eq!(tree.get(root).children().len(), 2);
        let sum: f32 = tree
            .get(root)
            .children()
            .iter()
            .map(|(_, id)| tree.get(*id).prior())
            .sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn backup_updates_q_and_n_with_alternating_sign() {
        let mut tree = fresh_tree();
        let root = tree.root();
        let mv = crate::move_codec::Move {
            from_row: 0,
            from_col: 3,
            to_row: 1,
            to_col: 3,
        };
        tree.expand(root, &[(mv, 1.0)]);
        let child = tree.get(root).children()[0].1;
        tree.backup(&[root, child], 1.0);
        assert_eq!(tree.get(root).visits(), 1);
        assert_eq!(tree.get(child).visits(), 1);
        assert_eq!(tree.get(child).q(), 1.0);
        assert_eq!(tree.get(root).q(), -1.0);
    }

    #[test]
    fn fpu_makes_unvisited_children_slightly_worse_than_parent() {
        let mut tree = fresh_tree();
        let root = tree.root();
        let mv = crate::move_codec::Move {
            from_row: 0,
            from_col: 3,
            to_row: 1,
            to_col: 3,
        };
        tree.expand(root, &[(mv, 1.0)]);
        // Give the root some visits/value so its Q is nonzero.
        tree.get_mut(root).visits = 4;
        tree.get_mut(root).value_sum = 2.0; // Q = 0.5
        let selected = tree.select_child(root, 1.5, 0.25);
        assert_eq!(selected, tree.get(root).children()[0].1);
    }
}
