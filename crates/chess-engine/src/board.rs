//! Board state: piece placement plus the side-to-move, castling, en passant
//! and clock fields that together determine which moves are legal.

use chess_core::{Color, File, Piece, Rank, Square};

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    const fn kingside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    const fn queenside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_flag(color) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_flag(color) != 0
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !(Self::kingside_flag(color) | Self::queenside_flag(color));
    }

    /// Removes whichever right depends on a rook standing on `square`.
    pub fn remove_for_rook_square(&mut self, square: Square) {
        match square {
            Square::A1 => self.0 &= !Self::WHITE_QUEENSIDE,
            Square::H1 => self.0 &= !Self::WHITE_KINGSIDE,
            Square::A8 => self.0 &= !Self::BLACK_QUEENSIDE,
            Square::H8 => self.0 &= !Self::BLACK_KINGSIDE,
            _ => {}
        }
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// FEN castling field: some subset of `KQkq`, or `-`.
    pub fn to_fen(self) -> String {
        let mut field = String::with_capacity(4);
        for (flag, letter) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                field.push(letter);
            }
        }
        if field.is_empty() {
            field.push('-');
        }
        field
    }
}

/// Exact identity of a position for repetition counting.
///
/// Two positions are the same when placement, side to move, castling rights
/// and en passant target all agree. Clocks are deliberately left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    squares: [Option<(Piece, Color)>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
}

/// The mutable state of a chess game at one instant.
///
/// Every square holds at most one piece and each side has exactly one king.
/// Those two facts are established when a board is built and preserved by
/// every move the generator produces.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [Option<(Piece, Color)>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    kings: [Square; 2],
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

impl Board {
    /// The standard starting position.
    pub fn startpos() -> Self {
        let mut squares = [None; 64];
        for color in Color::BOTH {
            for file in File::ALL {
                let back = Square::new(file, color.back_rank());
                let pawn = Square::new(file, color.pawn_start_rank());
                squares[back.index() as usize] = Some((BACK_RANK[file.index() as usize], color));
                squares[pawn.index() as usize] = Some((Piece::Pawn, color));
            }
        }
        Board {
            squares,
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            kings: [Square::E1, Square::E8],
        }
    }

    /// Assembles a board from already-validated parts.
    pub(crate) fn from_parts(
        squares: [Option<(Piece, Color)>; 64],
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
        kings: [Square; 2],
    ) -> Self {
        Board {
            squares,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            kings,
        }
    }

    /// Returns the piece and its side on a square, if any.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.squares[square.index() as usize]
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    /// The piece on a square as a signed code: positive for White, negative
    /// for Black, zero when empty.
    pub fn code_at(&self, square: Square) -> i8 {
        self.piece_at(square)
            .map_or(0, |(piece, color)| piece.signed_code(color))
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// The square a pawn passed over on the previous move, if it double-pushed.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Plies since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Iterates over occupied squares in index order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        Square::all().filter_map(move |square| {
            self.piece_at(square)
                .map(|(piece, color)| (square, piece, color))
        })
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            squares: self.squares,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
        }
    }

    /// Removes and returns whatever stands on `square`.
    #[inline]
    pub(crate) fn take(&mut self, square: Square) -> Option<(Piece, Color)> {
        self.squares[square.index() as usize].take()
    }

    /// Places a piece, keeping the cached king squares in step.
    #[inline]
    pub(crate) fn put(&mut self, square: Square, piece: Piece, color: Color) {
        self.squares[square.index() as usize] = Some((piece, color));
        if piece == Piece::King {
            self.kings[color.index()] = square;
        }
    }

    pub(crate) fn set_castling(&mut self, castling: CastlingRights) {
        self.castling = castling;
    }

    pub(crate) fn castling_mut(&mut self) -> &mut CastlingRights {
        &mut self.castling
    }

    pub(crate) fn set_en_passant(&mut self, en_passant: Option<Square>) {
        self.en_passant = en_passant;
    }

    pub(crate) fn set_clocks(&mut self, halfmove_clock: u32, fullmove_number: u32) {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
    }

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    /// Renders the board as eight text rows, rank 8 first.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(8 * 9);
        for rank in Rank::ALL.iter().rev() {
            for file in File::ALL {
                let c = match self.piece_at(Square::new(file, *rank)) {
                    Some((piece, color)) => piece.to_fen_char(color),
                    None => '.',
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_layout() {
        let board = Board::startpos();
        assert_eq!(board.piece_at(Square::E1), Some((Piece::King, Color::White)));
        assert_eq!(board.piece_at(Square::D8), Some((Piece::Queen, Color::Black)));
        assert_eq!(board.code_at(Square::E8), -6);
        assert_eq!(board.code_at(Square::A1), 4);
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_eq!(board.castling(), CastlingRights::ALL);
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn rook_squares_strip_rights() {
        let mut rights = CastlingRights::ALL;
        rights.remove_for_rook_square(Square::H1);
        assert!(!rights.can_castle_kingside(Color::White));
        assert!(rights.can_castle_queenside(Color::White));
        rights.remove_for_rook_square(Square::A8);
        assert!(!rights.can_castle_queenside(Color::Black));
        rights.remove_color(Color::Black);
        assert_eq!(rights.to_fen(), "Q");
        assert_eq!(CastlingRights::NONE.to_fen(), "-");
    }

    #[test]
    fn fingerprint_ignores_clocks() {
        let a = Board::startpos();
        let mut b = a;
        b.set_clocks(12, 40);
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.set_en_passant(Square::from_algebraic("e3"));
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn ascii_rendering() {
        let text = Board::startpos().to_ascii();
        assert!(text.starts_with("rnbqkbnr\npppppppp\n"));
        assert!(text.ends_with("PPPPPPPP\nRNBQKBNR\n"));
    }
}
