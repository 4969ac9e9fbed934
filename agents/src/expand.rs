use crate::config::EvalWeights;
use crate::evaluation::evaluate_with;
use crate::node::{NodeId, SearchNode, SearchTree};
use chess_core::Color;
use tracing::trace;

/// Tuning for [`expand`].
#[derive(Debug, Clone, Copy)]
pub struct ExpandOptions<'a> {
    pub weights: &'a EvalWeights,
    pub swing_threshold: f64,
}

/// Replaces `id`'s children with its scored, swing-filtered continuations.
///
/// A child is kept unless its static score swings `swing_threshold` or more
/// in the mover's favour relative to the parent. Returns the number kept.
pub fn expand(tree: &mut SearchTree, id: NodeId, options: ExpandOptions<'_>) -> usize {
    let parent = tree.node(id);
    let parent_score = parent.score;
    let position = parent.position.clone();
    let mover = position.side_to_move();

    let mut kept = Vec::new();
    let mut generated = 0;

    for mv in position.legal_moves() {
        generated += 1;
        let result = position.apply_move(mv);
        let score = evaluate_with(&result, options.weights);

        if !within_swing(mover, score, parent_score, options.swing_threshold) {
            continue;
        }

        kept.push(tree.push(SearchNode {
            mover,
            mv: Some(mv),
            move_text: Some(position.move_text(mv)),
            position: result,
            score,
            parent: Some(id),
            children: Vec::new(),
        }));
    }

    trace!(node = id.index(), generated, kept = kept.len(), "expanded");
    let count = kept.len();
    tree.node_mut(id).children = kept;
    count
}

fn within_swing(mover: Color, score: f64, parent_score: f64, threshold: f64) -> bool {
    match mover {
        Color::White => score < parent_score + threshold,
        Color::Black => score > parent_score - threshold,
    }
}
