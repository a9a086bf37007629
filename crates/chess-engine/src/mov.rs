//! Move representation.

use chess_core::{Color, Piece, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a move does beyond relocating the moving piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Relocation to an empty square (including pawn double pushes).
    Quiet,
    /// Capture of the piece standing on the destination.
    Capture,
    /// Pawn capture of a pawn that just double-pushed past the destination.
    EnPassant,
    /// King two squares toward the h-file rook.
    CastleKingside,
    /// King two squares toward the a-file rook.
    CastleQueenside,
    /// Pawn reaching the last rank on an empty square.
    Promotion,
    /// Pawn reaching the last rank by capturing.
    PromotionCapture,
}

impl MoveKind {
    /// True for every kind that removes an enemy piece.
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(
            self,
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::PromotionCapture
        )
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        matches!(self, MoveKind::Promotion | MoveKind::PromotionCapture)
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }
}

/// A fully described move: who moves what, where, and how.
///
/// Moves are only ever produced by the move generator, so every `Move` a
/// caller holds was legal in the position it was generated for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    piece: Piece,
    color: Color,
    from: Square,
    to: Square,
    kind: MoveKind,
    promotion: Option<Piece>,
}

impl Move {
    /// Placeholder used to fill unused move-list slots.
    pub(crate) const NULL: Move = Move {
        piece: Piece::Pawn,
        color: Color::White,
        from: Square::A1,
        to: Square::A1,
        kind: MoveKind::Quiet,
        promotion: None,
    };

    #[inline]
    pub(crate) const fn new(
        piece: Piece,
        color: Color,
        from: Square,
        to: Square,
        kind: MoveKind,
        promotion: Option<Piece>,
    ) -> Self {
        Move {
            piece,
            color,
            from,
            to,
            kind,
            promotion,
        }
    }

    #[inline]
    pub const fn piece(self) -> Piece {
        self.piece
    }

    #[inline]
    pub const fn color(self) -> Color {
        self.color
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        self.kind
    }

    /// The piece a pawn becomes, for promotion kinds only.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        self.promotion
    }

    /// True for a pawn advancing two ranks from its start rank.
    #[inline]
    pub const fn is_double_push(self) -> bool {
        matches!(self.piece, Piece::Pawn)
            && self.from.rank().index().abs_diff(self.to.rank().index()) == 2
    }

    /// The square of the captured piece. Differs from [`to`](Self::to)
    /// only for en passant.
    pub fn capture_square(self) -> Option<Square> {
        match self.kind {
            MoveKind::EnPassant => Some(Square::new(self.to.file(), self.from.rank())),
            kind if kind.is_capture() => Some(self.to),
            _ => None,
        }
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion {
            Some(piece) => format!(
                "{}{}{}",
                self.from,
                self.to,
                piece.san_char().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {} {:?})", self.color, self.to_uci(), self.kind)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
