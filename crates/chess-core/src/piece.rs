//! Piece kinds.

use crate::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six kinds of chess piece, independent of side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Piece {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl Piece {
    /// All piece kinds, pawn first.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Pieces a pawn may promote to, in the order moves are generated.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    /// Returns a zero-based index (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Signed integer encoding: magnitude 1-6 names the kind, the sign the side.
    #[inline]
    pub const fn signed_code(self, color: Color) -> i8 {
        self as i8 * color.pawn_direction()
    }

    /// Inverse of [`signed_code`](Self::signed_code). Zero and out-of-range
    /// magnitudes yield `None`.
    pub const fn from_signed_code(code: i8) -> Option<(Piece, Color)> {
        let color = if code < 0 { Color::Black } else { Color::White };
        let piece = match code.unsigned_abs() {
            1 => Piece::Pawn,
            2 => Piece::Knight,
            3 => Piece::Bishop,
            4 => Piece::Rook,
            5 => Piece::Queen,
            6 => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }

    /// Upper-case letter used in algebraic notation. Pawns use `P`, which
    /// SAN omits.
    pub const fn san_char(self) -> char {
        match self {
            Piece::Pawn => 'P',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
            Piece::King => 'K',
        }
    }

    /// Parses an upper-case algebraic-notation letter.
    pub const fn from_san_char(c: char) -> Option<Piece> {
        match c {
            'P' => Some(Piece::Pawn),
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            'K' => Some(Piece::King),
            _ => None,
        }
    }

    /// FEN letter: upper case for White, lower case for Black.
    pub const fn to_fen_char(self, color: Color) -> char {
        let c = self.san_char();
        match color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parses a FEN letter into a kind and side.
    pub const fn from_fen_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Piece::from_san_char(c.to_ascii_uppercase()) {
            Some(piece) => Some((piece, color)),
            None => None,
        }
    }

    /// True for bishops, rooks and queens.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }

    /// True for the four kinds a pawn may become.
    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen
        )
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        f.write_str(name)
    }
}
