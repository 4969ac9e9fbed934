use cozy_chess::{
    get_between_rays, get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks,
    get_pawn_quiets, get_rook_moves, BitBoard, Board, BoardBuilder, Color, File, Move, Piece,
    Rank, Square,
};
use std::fmt;
use thiserror::Error;

/// Well-known positions in FEN.
pub mod positions {
    pub const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    pub const OPEN_GAME: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid position '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move '{text}' in position '{fen}'")]
    IllegalMove { text: String, fen: String },
}

/// A legal chess position.
///
/// Wraps the rules crate's board so the rest of the workspace only deals in
/// FEN text, square-to-square move text and a handful of classification queries.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let board = Board::from_fen(fen.trim(), false).map_err(|e| PositionError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self { board })
    }

    pub fn to_fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn is_in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    pub fn halfmove_clock(&self) -> u8 {
        self.board.halfmove_clock()
    }

    /// Zobrist key of the position, used for repetition counting.
    pub fn key(&self) -> u64 {
        self.board.hash()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    pub fn legal_move_count(&self) -> usize {
        let mut count = 0;
        self.board.generate_moves(|piece_moves| {
            count += piece_moves.len();
            false
        });
        count
    }

    pub fn has_legal_moves(&self) -> bool {
        // Stops at the first piece with a move
        self.board.generate_moves(|piece_moves| !piece_moves.is_empty())
    }

    /// Returns the position after `mv`. The move must be legal here.
    pub fn apply_move(&self, mv: Move) -> Position {
        let mut board = self.board.clone();
        board.play_unchecked(mv);
        Position { board }
    }

    /// Checked variant of [`Position::apply_move`] for moves from outside the engine.
    pub fn try_apply_move(&self, mv: Move) -> Result<Position, PositionError> {
        let mut board = self.board.clone();
        board.try_play(mv).map_err(|_| PositionError::IllegalMove {
            text: self.move_text(mv),
            fen: self.to_fen(),
        })?;
        Ok(Position { board })
    }

    /// The same placement with the other side to move.
    ///
    /// Returns `None` when the side to move is in check: handing the move to
    /// the opponent would leave a king en prise. En passant rights are dropped.
    pub fn with_side_flipped(&self) -> Option<Position> {
        self.board.null_move().map(|board| Position { board })
    }

    /// Moves the side not to move would have if it were its turn.
    ///
    /// Follows null move rules: en passant rights lapse. When the side to
    /// move is in check no flipped board exists, so the moves come from the
    /// attack tables instead; taking the checked king then counts as a move.
    pub fn waiting_moves(&self) -> Vec<Move> {
        match self.with_side_flipped() {
            Some(flipped) => flipped.legal_moves(),
            None => self.waiting_moves_from_attacks(),
        }
    }

    fn waiting_moves_from_attacks(&self) -> Vec<Move> {
        let us = !self.side_to_move();
        let ours = self.board.colors(us);
        let theirs = self.board.colors(!us);
        let occupied = self.board.occupied();
        let last_rank = Rank::Eighth.relative_to(us);
        let mut moves = Vec::new();

        for from in ours {
            let Some(piece) = self.board.piece_on(from) else {
                continue;
            };
            let targets = match piece {
                Piece::Pawn => {
                    get_pawn_quiets(from, us, occupied) | (get_pawn_attacks(from, us) & theirs)
                }
                Piece::Knight => get_knight_moves(from) & !ours,
                Piece::Bishop => get_bishop_moves(from, occupied) & !ours,
                Piece::Rook => get_rook_moves(from, occupied) & !ours,
                Piece::Queen => {
                    (get_bishop_moves(from, occupied) | get_rook_moves(from, occupied)) & !ours
                }
                Piece::King => get_king_moves(from) & !ours,
            };

            for to in targets {
                let after = (occupied ^ from.bitboard()) | to.bitboard();
                let king = if piece == Piece::King {
                    to
                } else {
                    self.board.king(us)
                };
                if self.is_attacked(king, !us, after, to.bitboard()) {
                    continue;
                }

                if piece == Piece::Pawn && to.rank() == last_rank {
                    for promotion in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
                        moves.push(Move {
                            from,
                            to,
                            promotion: Some(promotion),
                        });
                    }
                } else {
                    moves.push(Move {
                        from,
                        to,
                        promotion: None,
                    });
                }
            }
        }

        moves.extend(self.waiting_castles(us));
        moves
    }

    /// Castling for `us`, encoded as the king capturing its own rook.
    fn waiting_castles(&self, us: Color) -> Vec<Move> {
        let occupied = self.board.occupied();
        let back_rank = Rank::First.relative_to(us);
        let king = self.board.king(us);
        let rights = self.board.castle_rights(us);
        let mut castles = Vec::new();

        for (rook_file, king_file, rook_to_file) in [
            (rights.short, File::G, File::F),
            (rights.long, File::C, File::D),
        ] {
            let Some(rook_file) = rook_file else {
                continue;
            };
            let rook = Square::new(rook_file, back_rank);
            let king_to = Square::new(king_file, back_rank);
            let rook_to = Square::new(rook_to_file, back_rank);

            let must_be_empty = (get_between_rays(king, rook)
                | get_between_rays(king, king_to)
                | king_to.bitboard()
                | rook_to.bitboard())
                & !(king.bitboard() | rook.bitboard());
            if !(occupied & must_be_empty).is_empty() {
                continue;
            }

            let king_path = get_between_rays(king, king_to) | king.bitboard() | king_to.bitboard();
            let attacked = king_path
                .into_iter()
                .any(|sq| self.is_attacked(sq, !us, occupied, BitBoard::EMPTY));
            if !attacked {
                castles.push(Move {
                    from: king,
                    to: rook,
                    promotion: None,
                });
            }
        }

        castles
    }

    /// Whether `attacker` hits `square` given `occupied`, ignoring its pieces on `removed`.
    fn is_attacked(
        &self,
        square: Square,
        attacker: Color,
        occupied: BitBoard,
        removed: BitBoard,
    ) -> bool {
        let pieces = |piece| self.board.colored_pieces(attacker, piece) & !removed;
        let diagonal = pieces(Piece::Bishop) | pieces(Piece::Queen);
        let orthogonal = pieces(Piece::Rook) | pieces(Piece::Queen);

        !(get_knight_moves(square) & pieces(Piece::Knight)).is_empty()
            || !(get_king_moves(square) & pieces(Piece::King)).is_empty()
            || !(get_pawn_attacks(square, !attacker) & pieces(Piece::Pawn)).is_empty()
            || !(get_bishop_moves(square, occupied) & diagonal).is_empty()
            || !(get_rook_moves(square, occupied) & orthogonal).is_empty()
    }

    pub fn is_castling(&self, mv: Move) -> bool {
        // Castling is encoded as the king capturing its own rook
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.side_to_move())
    }

    pub fn is_en_passant(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        self.board.color_on(mv.to) == Some(!self.side_to_move()) || self.is_en_passant(mv)
    }

    /// True if a pawn of the side to move on `from` would promote by reaching `to`.
    pub fn needs_promotion(&self, from: Square, to: Square) -> bool {
        self.board.piece_on(from) == Some(Piece::Pawn)
            && self.board.color_on(from) == Some(self.side_to_move())
            && matches!(to.rank(), Rank::First | Rank::Eighth)
    }

    /// Square-to-square text of a legal move: `e2e4`, `e7e8q`, castling as `e1g1`.
    pub fn move_text(&self, mv: Move) -> String {
        let to = if self.is_castling(mv) {
            let file = if mv.to.file() as usize > mv.from.file() as usize {
                File::G
            } else {
                File::C
            };
            Square::new(file, mv.from.rank())
        } else {
            mv.to
        };

        let mut text = format!("{}{}", mv.from, to);
        if let Some(piece) = mv.promotion {
            text.push(promotion_char(piece));
        }
        text
    }

    /// Parses square-to-square text against the legal moves of this position.
    pub fn parse_move(&self, text: &str) -> Result<Move, PositionError> {
        let wanted = text.trim().to_ascii_lowercase();
        self.legal_moves()
            .into_iter()
            .find(|&mv| self.move_text(mv) == wanted)
            .ok_or_else(|| PositionError::IllegalMove {
                text: text.to_string(),
                fen: self.to_fen(),
            })
    }

    pub fn piece_count(&self, color: Color, piece: Piece) -> u32 {
        self.board.colored_pieces(color, piece).len()
    }

    /// Raw `0..64` indices (a1 = 0, h8 = 63) of one side's pawns, ascending.
    pub fn pawn_indices(&self, color: Color) -> Vec<usize> {
        self.board
            .colored_pieces(color, Piece::Pawn)
            .into_iter()
            .map(|sq| sq as usize)
            .collect()
    }

    /// Raw `0..64` indices of the squares holding `piece` for either side.
    pub fn piece_indices(&self, piece: Piece) -> Vec<usize> {
        self.board
            .pieces(piece)
            .into_iter()
            .map(|sq| sq as usize)
            .collect()
    }

    /// Whether the square at raw index `index` holds a piece. Off-board indices are empty.
    pub fn is_occupied(&self, index: usize) -> bool {
        Square::try_index(index).is_some_and(|sq| self.board.occupied().has(sq))
    }

    pub fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        Some((self.board.color_on(square)?, self.board.piece_on(square)?))
    }

    /// Color-swapped mirror: ranks reversed, piece colors and side to move exchanged.
    pub fn mirrored(&self) -> Option<Position> {
        let mut builder = BoardBuilder::empty();
        for sq in self.board.occupied() {
            if let (Some(piece), Some(color)) = (self.board.piece_on(sq), self.board.color_on(sq)) {
                *builder.square_mut(sq.flip_rank()) = Some((piece, !color));
            }
        }
        builder.side_to_move = !self.side_to_move();
        for color in [Color::White, Color::Black] {
            let rights = self.board.castle_rights(color);
            builder.castle_rights_mut(!color).short = rights.short;
            builder.castle_rights_mut(!color).long = rights.long;
        }
        builder.en_passant = self
            .board
            .en_passant()
            .map(|file| Square::new(file, Rank::Third.relative_to(self.side_to_move())));
        builder.halfmove_clock = self.board.halfmove_clock();
        builder.fullmove_number = self.board.fullmove_number();

        builder.build().ok().map(|board| Position { board })
    }
}

fn promotion_char(piece: Piece) -> char {
    match piece {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        Piece::Pawn => 'p',
        Piece::King => 'k',
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.to_fen() == other.to_fen()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl std::str::FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}
