use chess_core::{Color, Move, Position};
use std::cmp::Ordering;

/// Index of a node in its [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One explored position.
///
/// `score` is the static evaluation of `position` and is never overwritten:
/// backed-up values travel as [`crate::Scored`] results instead.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// The side that made the move leading here.
    pub mover: Color,
    /// `None` only for the root.
    pub mv: Option<Move>,
    pub move_text: Option<String>,
    pub position: Position,
    pub score: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SearchNode {
    /// A node with no children is either unexpanded or terminal; only the
    /// caller's depth tells which.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.position == other.position
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.score.partial_cmp(&other.score)
    }
}

/// Arena owning every node of one search. Dropped with the search call.
#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Creates a tree holding only `position` as its root.
    pub fn with_root(position: Position, score: f64) -> (Self, NodeId) {
        let mut tree = Self::default();
        let root = tree.push(SearchNode {
            mover: !position.side_to_move(),
            mv: None,
            move_text: None,
            position,
            score,
            parent: None,
            children: Vec::new(),
        });
        (tree, root)
    }

    pub(crate) fn push(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Nodes allocated so far, including ones orphaned by re-expansion.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sorts a node's children by static score, best first for the maximizer
    /// when `descending`. The sort is stable so ties keep generation order.
    pub(crate) fn order_children(&mut self, id: NodeId, descending: bool) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|&a, &b| {
            let (a, b) = (self.nodes[a.0].score, self.nodes[b.0].score);
            if descending {
                b.total_cmp(&a)
            } else {
                a.total_cmp(&b)
            }
        });
        self.nodes[id.0].children = children;
    }
}
