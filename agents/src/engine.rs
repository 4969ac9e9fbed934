use crate::config::SearchConfig;
use crate::search::{choose_move, Objective};
use crate::Agent;
use chess_core::{Move, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Openings played at random from the start position instead of searching.
pub const OPENING_BOOK: [&str; 4] = ["e2e4", "c2c4", "d2d3", "g1f3"];

/// Plays the move chosen by [`choose_move`] for whichever side is to move.
pub struct AlphaBetaAgent {
    name: String,
    config: SearchConfig,
    rng: StdRng,
}

impl AlphaBetaAgent {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Fixed seed for the opening book, so games can be replayed.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SearchConfig, rng: StdRng) -> Self {
        AlphaBetaAgent {
            name: format!("AlphaBeta(depth={})", config.depth),
            config,
            rng,
        }
    }

    fn book_move(&mut self, position: &Position) -> Option<Move> {
        if !self.config.opening_book || *position != Position::new() {
            return None;
        }
        let moves: Vec<Move> = OPENING_BOOK
            .iter()
            .filter_map(|text| position.parse_move(text).ok())
            .collect();
        moves.choose(&mut self.rng).copied()
    }
}

impl Agent for AlphaBetaAgent {
    fn best_move(&mut self, position: &Position) -> Option<Move> {
        if let Some(mv) = self.book_move(position) {
            debug!(mv = %position.move_text(mv), "book move");
            return Some(mv);
        }

        let objective = Objective::for_side(position.side_to_move());
        let outcome = choose_move(position, self.config.depth, objective, &self.config);
        if outcome.best_move.is_some() {
            return outcome.best_move;
        }

        // Depth 0, or every move was dropped by the swing filter
        let fallback = position.legal_moves().first().copied();
        if let Some(mv) = fallback {
            warn!(
                fen = %position,
                mv = %position.move_text(mv),
                "search returned no move, playing first legal move"
            );
        }
        fallback
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::positions;
    use test_log::test;

    #[test]
    fn test_book_move_from_start() {
        let position = Position::new();
        for seed in 0..8 {
            let mut agent = AlphaBetaAgent::with_seed(SearchConfig::default(), seed);
            let mv = agent.best_move(&position).unwrap();
            assert!(OPENING_BOOK.contains(&position.move_text(mv).as_str()));
        }
    }

    #[test]
    fn test_book_disabled_searches_instead() {
        let config = SearchConfig {
            opening_book: false,
            ..SearchConfig::default()
        };
        let position = Position::new();
        let expected = choose_move(&position, 1, Objective::Maximize, &config);

        let mut agent = AlphaBetaAgent::with_seed(config, 7);
        assert_eq!(agent.best_move(&position), expected.best_move);
    }

    #[test]
    fn test_plays_for_black() {
        let open_game = Position::from_fen(positions::OPEN_GAME).unwrap();
        let position = open_game.apply_move(open_game.parse_move("g1f3").unwrap());
        let config = SearchConfig::with_depth(2);
        let expected = choose_move(&position, 2, Objective::Minimize, &config);

        let mut agent = AlphaBetaAgent::new(config);
        let mv = agent.best_move(&position);
        assert!(mv.is_some());
        assert_eq!(mv, expected.best_move);
    }

    #[test]
    fn test_depth_zero_falls_back_to_a_legal_move() {
        let position = Position::from_fen(positions::KIWIPETE).unwrap();
        let mut agent = AlphaBetaAgent::new(SearchConfig::with_depth(0));

        let mv = agent.best_move(&position).unwrap();
        assert!(position.legal_moves().contains(&mv));
    }

    #[test]
    fn test_no_move_when_mated() {
        let position =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let mut agent = AlphaBetaAgent::new(SearchConfig::default());
        assert_eq!(agent.best_move(&position), None);
        assert_eq!(agent.name(), "AlphaBeta(depth=1)");
    }
}
