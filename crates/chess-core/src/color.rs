//! Side-to-move representation.

use crate::Rank;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides. White moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// Both sides, White first.
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Returns the other side.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Returns the index (0 for White, 1 for Black).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank delta of a pawn push for this side.
    ///
    /// Doubles as the sign of the signed piece encoding (see
    /// [`Piece::signed_code`](crate::Piece::signed_code)).
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The rank the king and rooks start on.
    #[inline]
    pub const fn back_rank(self) -> Rank {
        match self {
            Color::White => Rank::R1,
            Color::Black => Rank::R8,
        }
    }

    /// The rank this side's pawns promote on.
    #[inline]
    pub const fn promotion_rank(self) -> Rank {
        match self {
            Color::White => Rank::R8,
            Color::Black => Rank::R1,
        }
    }

    /// The rank this side's pawns may double-push from.
    #[inline]
    pub const fn pawn_start_rank(self) -> Rank {
        match self {
            Color::White => Rank::R2,
            Color::Black => Rank::R7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for color in Color::BOTH {
            assert_ne!(color.opposite(), color);
            assert_eq!(color.opposite().opposite(), color);
        }
    }

    #[test]
    fn ranks_mirror_each_other() {
        assert_eq!(Color::White.back_rank(), Rank::R1);
        assert_eq!(Color::Black.back_rank(), Rank::R8);
        assert_eq!(Color::White.promotion_rank(), Color::Black.back_rank());
        assert_eq!(Color::Black.promotion_rank(), Color::White.back_rank());
        assert_eq!(Color::White.pawn_start_rank(), Rank::R2);
        assert_eq!(Color::Black.pawn_start_rank(), Rank::R7);
    }

    #[test]
    fn pawn_direction_matches_sign() {
        assert_eq!(Color::White.pawn_direction(), 1);
        assert_eq!(Color::Black.pawn_direction(), -1);
    }

    #[test]
    fn serializes_by_name() {
        assert_eq!(serde_json::to_string(&Color::Black).unwrap(), "\"Black\"");
    }
}
