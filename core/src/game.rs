use crate::position::{Position, PositionError};
use cozy_chess::{Color, Move, Piece};
use std::fmt;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    FivefoldRepetition,
    FiftyMoves,
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => {
                write!(f, "Checkmate! {} wins the game!", color_name(*winner))
            }
            Outcome::FivefoldRepetition => write!(
                f,
                "It's a draw! The same position has occurred five times."
            ),
            Outcome::InsufficientMaterial => write!(
                f,
                "It's a draw! Neither side has enough material to win."
            ),
            Outcome::FiftyMoves => write!(
                f,
                "It's a draw! 50 moves without a capture or pawn move."
            ),
            Outcome::Stalemate => write!(f, "It's a draw by stalemate!"),
        }
    }
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// A position plus the history needed for repetition detection.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    keys: Vec<u64>,
    history: Vec<String>,
}

impl Game {
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    pub fn from_position(position: Position) -> Self {
        Self {
            keys: vec![position.key()],
            position,
            history: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Moves played so far, as square-to-square text.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn play(&mut self, mv: Move) -> Result<(), PositionError> {
        let next = self.position.try_apply_move(mv)?;
        self.history.push(self.position.move_text(mv));
        self.keys.push(next.key());
        self.position = next;
        Ok(())
    }

    pub fn play_text(&mut self, text: &str) -> Result<(), PositionError> {
        let mv = self.position.parse_move(text)?;
        self.play(mv)
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let has_moves = self.position.has_legal_moves();

        if !has_moves && self.position.is_in_check() {
            return Some(Outcome::Checkmate {
                winner: !self.position.side_to_move(),
            });
        }
        if self.repetitions() >= 5 {
            return Some(Outcome::FivefoldRepetition);
        }
        if has_insufficient_material(&self.position) {
            return Some(Outcome::InsufficientMaterial);
        }
        // The rules crate caps the halfmove clock at 100
        if self.position.halfmove_clock() >= 100 {
            return Some(Outcome::FiftyMoves);
        }
        if !has_moves {
            return Some(Outcome::Stalemate);
        }
        None
    }

    /// How many times the current position has occurred, itself included.
    pub fn repetitions(&self) -> usize {
        let current = self.position.key();
        self.keys.iter().filter(|&&key| key == current).count()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Neither side can possibly mate: bare kings, a single minor piece, or
/// bishops that all stand on one square color.
pub fn has_insufficient_material(position: &Position) -> bool {
    let heavy = [Piece::Pawn, Piece::Rook, Piece::Queen];
    let count = |piece| {
        position.piece_count(Color::White, piece) + position.piece_count(Color::Black, piece)
    };

    if heavy.iter().any(|&piece| count(piece) > 0) {
        return false;
    }

    let knights = count(Piece::Knight);
    let bishops = count(Piece::Bishop);
    if knights + bishops <= 1 {
        return true;
    }
    if knights > 0 {
        return false;
    }

    let mut shades = position
        .piece_indices(Piece::Bishop)
        .into_iter()
        .map(|index| (index % 8 + index / 8) % 2);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn game_from(fen: &str) -> Game {
        Game::from_position(Position::from_fen(fen).unwrap())
    }

    #[test]
    fn test_new_game_is_ongoing() {
        let game = Game::new();
        assert_eq!(game.outcome(), None);
        assert_eq!(game.repetitions(), 1);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.play_text(mv).unwrap();
        }

        let outcome = game.outcome().unwrap();
        assert_eq!(outcome, Outcome::Checkmate { winner: Color::Black });
        assert_eq!(outcome.winner(), Some(Color::Black));
        assert_eq!(outcome.to_string(), "Checkmate! Black wins the game!");
        assert_eq!(game.history(), ["f2f3", "e7e5", "g2g4", "d8h4"]);
    }

    #[test]
    fn test_stalemate() {
        let game = game_from("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(game.outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    fn test_insufficient_material() {
        assert!(game_from("8/8/4k3/8/8/3K4/8/8 w - - 0 1").is_over());
        assert!(game_from("8/8/4k3/8/8/3KN3/8/8 w - - 0 1").is_over());
        // Same-shade bishops, c1 and f4
        assert!(has_insufficient_material(
            &Position::from_fen("8/8/4k3/8/5b2/3K4/8/2B5 w - - 0 1").unwrap()
        ));
        // Opposite-shade bishops can still mate
        assert!(!has_insufficient_material(
            &Position::from_fen("8/8/4k3/8/5b2/3K4/8/3B4 w - - 0 1").unwrap()
        ));
        assert!(!game_from("8/8/4k3/8/8/3K4/4P3/8 w - - 0 1").is_over());
    }

    #[test]
    fn test_fivefold_repetition() {
        let mut game = Game::new();
        for _ in 0..4 {
            for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                assert_eq!(game.outcome(), None);
                game.play_text(mv).unwrap();
            }
        }
        assert_eq!(game.repetitions(), 5);
        assert_eq!(game.outcome(), Some(Outcome::FivefoldRepetition));
    }

    #[test]
    fn test_fifty_move_rule() {
        let game = game_from("8/8/4k3/8/8/3K4/4R3/8 w - - 100 120");
        assert_eq!(game.outcome(), Some(Outcome::FiftyMoves));
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let mut game = Game::new();
        assert!(matches!(
            game.play_text("e2e5"),
            Err(PositionError::IllegalMove { .. })
        ));
        assert!(game.history().is_empty());
    }
}
