use crate::alphabeta::{maximize, minimize, Scored, SearchStats};
use crate::config::SearchConfig;
use crate::evaluation::evaluate_with;
use crate::expand::{expand, ExpandOptions};
use crate::node::SearchTree;
use chess_core::{Color, Move, Position, PositionError};
use std::fmt;
use tracing::debug;

/// Which way the engine pushes the score at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Objective {
    /// White wants high scores, Black low ones.
    pub fn for_side(color: Color) -> Self {
        match color {
            Color::White => Objective::Maximize,
            Color::Black => Objective::Minimize,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Maximize => write!(f, "maximize"),
            Objective::Minimize => write!(f, "minimize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// `None` at depth 0, or when no root move survived the search.
    pub best_move: Option<Move>,
    pub move_text: Option<String>,
    pub score: f64,
    pub stats: SearchStats,
}

/// Searches `depth` plies below `position` and returns the chosen move.
///
/// The root window is seeded on one side only with the root's static score:
/// a maximizing search runs with `(-inf, root]`, a minimizing one with
/// `[root, +inf)`. The first root move found to reach the root score on the
/// engine's side of the window is taken as soon as it is seen.
pub fn choose_move(
    position: &Position,
    depth: u8,
    objective: Objective,
    config: &SearchConfig,
) -> SearchOutcome {
    let options = ExpandOptions {
        weights: &config.weights,
        swing_threshold: config.swing_threshold,
    };
    let mut stats = SearchStats::default();

    let score = evaluate_with(position, &config.weights);
    let (mut tree, root) = SearchTree::with_root(position.clone(), score);
    expand(&mut tree, root, options);
    let root_bound = Scored::of(&tree, root);

    let result = match objective {
        Objective::Minimize => minimize(
            &mut tree,
            root,
            depth,
            root_bound,
            Scored::POS_INFINITY,
            options,
            &mut stats,
        ),
        Objective::Maximize => maximize(
            &mut tree,
            root,
            depth,
            Scored::NEG_INFINITY,
            root_bound,
            options,
            &mut stats,
        ),
    };

    let chosen = result.node.map(|id| tree.node(id));
    let outcome = SearchOutcome {
        best_move: chosen.and_then(|node| node.mv),
        move_text: chosen.and_then(|node| node.move_text.clone()),
        score: result.score,
        stats,
    };

    debug!(
        depth,
        %objective,
        score = outcome.score,
        best_move = outcome.move_text.as_deref().unwrap_or("none"),
        nodes = stats.nodes_expanded,
        cutoffs = stats.cutoffs,
        tree_size = tree.len(),
        "search complete"
    );

    outcome
}

/// [`choose_move`] on a position given in FEN.
pub fn choose_move_fen(
    fen: &str,
    depth: u8,
    objective: Objective,
    config: &SearchConfig,
) -> Result<SearchOutcome, PositionError> {
    let position = Position::from_fen(fen)?;
    Ok(choose_move(&position, depth, objective, config))
}
