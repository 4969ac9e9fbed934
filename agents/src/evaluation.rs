use crate::config::EvalWeights;
use chess_core::{Color, Piece, Position, PositionError};

/// Evaluates a FEN position with the default weights.
/// Positive scores favor White, negative favor Black, whoever is to move.
pub fn evaluate(fen: &str) -> Result<f64, PositionError> {
    let position = Position::from_fen(fen)?;
    Ok(evaluate_position(&position))
}

/// Evaluates an already parsed position with the default weights.
pub fn evaluate_position(position: &Position) -> f64 {
    evaluate_with(position, &EvalWeights::default())
}

/// Material, pawn structure and mobility, all White minus Black.
pub fn evaluate_with(position: &Position, weights: &EvalWeights) -> f64 {
    let mut score = material(position, weights);

    score -= pawn_structure_penalty(position, Color::White, weights);
    score += pawn_structure_penalty(position, Color::Black, weights);

    score + mobility(position, weights)
}

fn material(position: &Position, weights: &EvalWeights) -> f64 {
    let pieces = [
        (Piece::King, weights.king),
        (Piece::Pawn, weights.pawn),
        (Piece::Knight, weights.knight),
        (Piece::Bishop, weights.bishop),
        (Piece::Rook, weights.rook),
        (Piece::Queen, weights.queen),
    ];

    pieces
        .iter()
        .map(|&(piece, value)| {
            let white = position.piece_count(Color::White, piece) as f64;
            let black = position.piece_count(Color::Black, piece) as f64;
            value * (white - black)
        })
        .sum()
}

/// Doubled, isolated and blocked pawn penalties for one side.
fn pawn_structure_penalty(position: &Position, color: Color, weights: &EvalWeights) -> f64 {
    let width = weights.board_width.max(1);
    let mut files: Vec<Vec<usize>> = vec![Vec::new(); width];

    // Indices arrive ascending, so each file's list runs from White's side upwards
    for index in position.pawn_indices(color) {
        files[index % width].push(index);
    }

    let mut penalty = 0.0;

    for (file, pawns) in files.iter().enumerate() {
        let (Some(&lowest), Some(&highest)) = (pawns.first(), pawns.last()) else {
            continue;
        };

        if pawns.len() > 1 {
            penalty += weights.doubled_pawn;
        }

        // Edge files have only one neighbour and are never counted as isolated
        if file >= 1 && file + 1 < width && files[file - 1].is_empty() && files[file + 1].is_empty()
        {
            penalty += weights.isolated_pawn;
        }

        let ahead = match color {
            Color::White => Some(highest + width),
            Color::Black => lowest.checked_sub(width),
        };
        if ahead.is_some_and(|index| position.is_occupied(index)) {
            penalty += weights.blocked_pawn;
        }
    }

    penalty
}

#[derive(Debug, Clone, Copy)]
struct Activity {
    moves: usize,
    captures: usize,
}

fn activity(position: &Position) -> Activity {
    let moves = position.legal_moves();
    Activity {
        captures: moves.iter().filter(|&&mv| position.is_capture(mv)).count(),
        moves: moves.len(),
    }
}

/// Capture and move count differences.
///
/// The side not to move is counted as if it were its turn, even when the side
/// to move is in check.
fn mobility(position: &Position, weights: &EvalWeights) -> f64 {
    let to_move = activity(position);
    let waiting = waiting_activity(position);

    let (white, black) = match position.side_to_move() {
        Color::White => (to_move, waiting),
        Color::Black => (waiting, to_move),
    };

    weights.capture * (white.captures as f64 - black.captures as f64)
        + weights.mobility * (white.moves as f64 - black.moves as f64)
}

fn waiting_activity(position: &Position) -> Activity {
    let moves = position.waiting_moves();
    let victim = position.side_to_move();
    Activity {
        captures: moves
            .iter()
            .filter(|mv| position.piece_at(mv.to).is_some_and(|(color, _)| color == victim))
            .count(),
        moves: moves.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::positions;
    use test_log::test;

    const EPSILON: f64 = 1e-9;

    fn static_weights() -> EvalWeights {
        EvalWeights {
            capture: 0.0,
            mobility: 0.0,
            ..EvalWeights::default()
        }
    }

    fn static_eval(fen: &str) -> f64 {
        evaluate_with(&Position::from_fen(fen).unwrap(), &static_weights())
    }

    #[test]
    fn test_starting_position_is_level() {
        assert_eq!(evaluate(positions::STARTING).unwrap(), 0.0);
    }

    #[test]
    fn test_open_game_is_level() {
        // e4 and e5 block each other, 29 moves each
        assert_eq!(evaluate(positions::OPEN_GAME).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_position() {
        assert!(matches!(
            evaluate("rnbqkbnr/pppppppp/8/8"),
            Err(PositionError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_material_weights() {
        let weights = static_weights();
        // Up a knight, but the f3 knight blocks the f2 pawn
        let up_a_knight = "rnbqkb1r/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 0 1";
        let eval = evaluate_with(&Position::from_fen(up_a_knight).unwrap(), &weights);
        assert!((eval - 2.5).abs() < EPSILON, "eval {eval}");

        // Queen against rook
        let eval = static_eval("4k3/8/8/4r3/4Q3/8/8/4K3 w - - 0 1");
        assert!((eval - 4.0).abs() < EPSILON, "eval {eval}");

        // Bishop against knight
        let eval = static_eval("4k3/8/8/4n3/4B3/8/8/4K3 w - - 0 1");
        assert!((eval - 0.5).abs() < EPSILON, "eval {eval}");
    }

    #[test]
    fn test_doubled_pawns() {
        // a2 and a3: doubled, edge file is never isolated, a4 is free
        let eval = static_eval("4k3/8/8/8/8/P7/P7/4K3 w - - 0 1");
        assert!((eval - 1.5).abs() < EPSILON, "eval {eval}");
    }

    #[test]
    fn test_isolated_pawn() {
        let eval = static_eval("4k3/8/8/8/8/8/3P4/4K3 w - - 0 1");
        assert!((eval - 0.5).abs() < EPSILON, "eval {eval}");

        let supported = static_eval("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1");
        assert!((supported - 2.0).abs() < EPSILON, "eval {supported}");
    }

    #[test]
    fn test_board_width_changes_file_buckets() {
        let position = Position::from_fen("4k3/8/8/8/8/8/3P3P/4K3 w - - 0 1").unwrap();
        let weights = EvalWeights {
            doubled_pawn: 1.0,
            isolated_pawn: 0.25,
            blocked_pawn: 0.0,
            ..static_weights()
        };

        // Eight files: d2 is isolated, h2 sits on the edge
        let eval = evaluate_with(&position, &weights);
        assert!((eval - 1.75).abs() < EPSILON, "eval {eval}");

        // Four files: indices 11 and 15 share a file, so the pawns are doubled
        let narrow = EvalWeights {
            board_width: 4,
            ..weights
        };
        let eval = evaluate_with(&position, &narrow);
        assert!((eval - 1.0).abs() < EPSILON, "eval {eval}");
    }

    #[test]
    fn test_blocked_pawns() {
        // White d2 blocked by a knight on d3: isolated and blocked, one pawn against a knight
        let eval = static_eval("4k3/8/8/8/8/3n4/3P4/7K w - - 0 1");
        assert!((eval + 3.0).abs() < EPSILON, "eval {eval}");

        // Black d7 blocked by a knight on d6
        let eval = static_eval("7k/3p4/3N4/8/8/8/8/7K w - - 0 1");
        assert!((eval - 3.0).abs() < EPSILON, "eval {eval}");
    }

    #[test]
    fn test_mobility_is_absolute() {
        // Rook a1 has 10 moves, kings 5 each; material +5, mobility 0.1 * (15 - 5)
        let white_to_move = evaluate("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let black_to_move = evaluate("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();

        assert!((white_to_move - 6.0).abs() < EPSILON, "eval {white_to_move}");
        assert!((black_to_move - 6.0).abs() < EPSILON, "eval {black_to_move}");
    }

    #[test]
    fn test_captures_counted_for_both_sides() {
        // Each rook can take the other; White 6 moves, Black 19
        let eval = evaluate("4k3/8/8/8/8/8/r7/R3K3 w - - 0 1").unwrap();
        assert!((eval + 1.3).abs() < EPSILON, "eval {eval}");
    }

    #[test]
    fn test_checking_side_moves_still_count() {
        // White in check: Kd1, Kf1 and Kxe2 against Black's 18 moves, one of them Rxe1
        let eval = evaluate("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        assert!((eval + 6.5).abs() < EPSILON, "eval {eval}");
    }

    #[test]
    fn test_color_symmetry() {
        let fens = [
            positions::STARTING,
            positions::OPEN_GAME,
            positions::KIWIPETE,
            "4k3/8/8/8/8/8/r7/R3K3 w - - 0 1",
            "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1",
            "7k/3p4/3N4/8/8/8/8/7K w - - 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
        ];

        for fen in fens {
            let position = Position::from_fen(fen).unwrap();
            let mirrored = position.mirrored().unwrap();
            let eval = evaluate_position(&position);
            let mirrored_eval = evaluate_position(&mirrored);
            assert!(
                (eval + mirrored_eval).abs() < EPSILON,
                "{fen}: {eval} vs mirrored {mirrored_eval}"
            );
        }
    }

    #[test]
    fn test_evaluation_leaves_position_untouched() {
        let position = Position::from_fen(positions::KIWIPETE).unwrap();
        let before = position.to_fen();
        let first = evaluate_position(&position);
        let second = evaluate_position(&position);

        assert_eq!(position.to_fen(), before);
        assert_eq!(position.side_to_move(), Color::White);
        assert_eq!(first, second);
    }
}
