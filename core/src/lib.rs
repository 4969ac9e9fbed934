pub mod game;
pub mod position;

pub use cozy_chess::{Color, File, Move, Piece, Rank, Square};
pub use game::{color_name, has_insufficient_material, Game, Outcome};
pub use position::{positions, Position, PositionError};
