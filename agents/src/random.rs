use crate::Agent;
use chess_core::{Move, Position};
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Uniformly random legal moves, a baseline opponent.
pub struct RandomAgent {
    name: String,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            name: "Random".to_string(),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn best_move(&mut self, position: &Position) -> Option<Move> {
        position.legal_moves().choose(&mut thread_rng()).copied()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
