pub mod alphabeta;
pub mod config;
pub mod engine;
pub mod evaluation;
pub mod expand;
pub mod node;
pub mod random;
pub mod search;

use chess_core::{Move, Position};

/// Core trait for chess agents
pub trait Agent {
    /// Get the move to play in `position`, `None` if there is none
    fn best_move(&mut self, position: &Position) -> Option<Move>;

    /// Get the agent's name
    fn name(&self) -> &str;
}

pub use alphabeta::{maximize, minimize, Scored, SearchStats};
pub use config::{ConfigError, EvalWeights, SearchConfig};
pub use engine::{AlphaBetaAgent, OPENING_BOOK};
pub use evaluation::{evaluate, evaluate_position, evaluate_with};
pub use expand::{expand, ExpandOptions};
pub use node::{NodeId, SearchNode, SearchTree};
pub use random::RandomAgent;
pub use search::{choose_move, choose_move_fen, Objective, SearchOutcome};
