use crate::expand::{expand, ExpandOptions};
use crate::node::{NodeId, SearchTree};

/// A score together with the node it was backed up through.
///
/// Serves both as a search bound and as the result of a search call.
/// `node` is `None` for the infinite sentinels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub score: f64,
    pub node: Option<NodeId>,
}

impl Scored {
    pub const NEG_INFINITY: Scored = Scored {
        score: f64::NEG_INFINITY,
        node: None,
    };

    pub const POS_INFINITY: Scored = Scored {
        score: f64::INFINITY,
        node: None,
    };

    /// A node's own static score.
    pub fn of(tree: &SearchTree, id: NodeId) -> Self {
        Scored {
            score: tree.node(id).score,
            node: Some(id),
        }
    }

    fn backed_up(score: f64, id: NodeId) -> Self {
        Scored {
            score,
            node: Some(id),
        }
    }
}

/// Diagnostics accumulated over one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Children visited (each one expanded before it is searched).
    pub nodes_expanded: u64,
    pub cutoffs: u64,
}

/// Maximizing half of the search.
///
/// Children are searched best-looking first. A result at or above `beta`
/// returns at once through that child; otherwise the best result above
/// `alpha` is returned, or `alpha` itself if nothing beat it.
pub fn maximize(
    tree: &mut SearchTree,
    id: NodeId,
    depth_left: u8,
    mut alpha: Scored,
    beta: Scored,
    options: ExpandOptions<'_>,
    stats: &mut SearchStats,
) -> Scored {
    if depth_left == 0 {
        return Scored::of(tree, id);
    }

    tree.order_children(id, true);
    let children = tree.children(id).to_vec();

    for child in children {
        stats.nodes_expanded += 1;
        expand(tree, child, options);
        let result = minimize(tree, child, depth_left - 1, alpha, beta, options, stats);

        if result.score >= beta.score {
            stats.cutoffs += 1;
            return Scored::backed_up(result.score, child);
        }
        if result.score > alpha.score {
            alpha = Scored::backed_up(result.score, child);
        }
    }

    alpha
}

/// Minimizing half of the search; the mirror of [`maximize`].
///
/// Unlike the maximizer, a node without children is a leaf here and
/// returns its own static score.
pub fn minimize(
    tree: &mut SearchTree,
    id: NodeId,
    depth_left: u8,
    alpha: Scored,
    mut beta: Scored,
    options: ExpandOptions<'_>,
    stats: &mut SearchStats,
) -> Scored {
    if depth_left == 0 || tree.node(id).is_leaf() {
        return Scored::of(tree, id);
    }

    tree.order_children(id, false);
    let children = tree.children(id).to_vec();

    for child in children {
        stats.nodes_expanded += 1;
        expand(tree, child, options);
        let result = maximize(tree, child, depth_left - 1, alpha, beta, options, stats);

        if result.score <= alpha.score {
            stats.cutoffs += 1;
            return Scored::backed_up(result.score, child);
        }
        if result.score < beta.score {
            beta = Scored::backed_up(result.score, child);
        }
    }

    beta
}
