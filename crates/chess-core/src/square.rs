//! Board coordinates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// File letters in index order.
const FILE_LETTERS: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// Rank digits in index order.
const RANK_DIGITS: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];

/// A file (column), a through h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files, a first.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// Creates a file from its index (0-7).
    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Parses a lower-case file letter.
    pub fn from_char(c: char) -> Option<Self> {
        FILE_LETTERS
            .iter()
            .position(|&letter| letter == c)
            .map(|i| Self::ALL[i])
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the lower-case letter.
    #[inline]
    pub const fn to_char(self) -> char {
        FILE_LETTERS[self as usize]
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A rank (row), 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// All ranks, first rank first.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    /// Creates a rank from its index (0-7).
    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Parses a rank digit.
    pub fn from_char(c: char) -> Option<Self> {
        RANK_DIGITS
            .iter()
            .position(|&digit| digit == c)
            .map(|i| Self::ALL[i])
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the digit.
    #[inline]
    pub const fn to_char(self) -> char {
        RANK_DIGITS[self as usize]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A square, indexed 0-63 rank-major: a1 = 0, b1 = 1, ..., h8 = 63.
///
/// A `Square` is always on the board; the only fallible constructors are
/// the ones that parse or convert raw input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    /// Creates a square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank.index() * 8 + file.index())
    }

    /// Creates a square from its index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses algebraic notation such as `"e4"`.
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square::new(file, rank))
    }

    /// Iterates over all 64 squares, a1 first.
    pub fn all() -> impl DoubleEndedIterator<Item = Square> {
        (0..64).map(Square)
    }

    /// Returns the index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the file.
    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 % 8) as usize]
    }

    /// Returns the rank.
    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 / 8) as usize]
    }

    /// Steps by a file and rank delta, or `None` if that leaves the board.
    #[inline]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = (self.0 % 8) as i8 + file_delta;
        let rank = (self.0 / 8) as i8 + rank_delta;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Square((rank * 8 + file) as u8))
        }
    }

    /// True for light squares (h1 is light, a1 is dark).
    #[inline]
    pub const fn is_light(self) -> bool {
        (self.0 % 8 + self.0 / 8) % 2 == 1
    }

    /// Returns the algebraic name, e.g. `"e4"`.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_algebraic())
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Square::from_algebraic(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid square: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn coordinates() {
        let e4 = Square::new(File::E, Rank::R4);
        assert_eq!(e4.index(), 28);
        assert_eq!(e4.file(), File::E);
        assert_eq!(e4.rank(), Rank::R4);
        assert_eq!(e4.to_string(), "e4");
    }

    #[test]
    fn parse_algebraic() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square::A1));
        assert_eq!(Square::from_algebraic("h8"), Some(Square::H8));
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("e44"), None);
        assert_eq!(Square::from_algebraic(""), None);
        assert_eq!(Square::from_algebraic("E4"), None);
    }

    #[test]
    fn offsets_stay_on_board() {
        assert_eq!(Square::A1.offset(-1, 0), None);
        assert_eq!(Square::H8.offset(0, 1), None);
        assert_eq!(Square::A1.offset(1, 2), Square::from_algebraic("b3"));
        assert_eq!(Square::H1.offset(1, 0), None);
    }

    #[test]
    fn square_colors() {
        assert!(!Square::A1.is_light());
        assert!(Square::H1.is_light());
        assert!(Square::A8.is_light());
        assert!(!Square::H8.is_light());
    }

    #[test]
    fn all_squares_in_order() {
        let squares: Vec<Square> = Square::all().collect();
        assert_eq!(squares.len(), 64);
        assert_eq!(squares[0], Square::A1);
        assert_eq!(squares[63], Square::H8);
    }

    #[test]
    fn serde_uses_algebraic_names() {
        let json = serde_json::to_string(&Square::G1).unwrap();
        assert_eq!(json, "\"g1\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Square::G1);
        assert!(serde_json::from_str::<Square>("\"z9\"").is_err());
    }

    proptest! {
        #[test]
        fn algebraic_name_parses_back(index in 0u8..64) {
            let sq = Square::from_index(index).unwrap();
            prop_assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
        }
    }
}
