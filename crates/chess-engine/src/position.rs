//! A board together with the history of positions that led to it.

use crate::board::{Board, CastlingRights, Fingerprint};
use crate::fen::FenError;
use crate::mov::Move;
use crate::movegen::{generate_legal_moves, is_in_check, MoveList};
use crate::rules::{FIFTY_MOVE_PLIES, THREEFOLD_REPETITION};
use chess_core::{Color, Piece, Square};

/// Game state: the current [`Board`] plus one [`Fingerprint`] per position
/// reached, starting position included. After `n` applied moves the history
/// holds `n + 1` entries and its last entry fingerprints the current board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    history: Vec<Fingerprint>,
}

impl Position {
    /// The standard starting position with a fresh history.
    pub fn new_game() -> Self {
        Self::from_board(Board::startpos())
    }

    /// A position whose history begins at `board`.
    pub fn from_board(board: Board) -> Self {
        Position {
            history: vec![board.fingerprint()],
            board,
        }
    }

    /// Creates a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Board::from_fen(fen).map(Self::from_board)
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.board.piece_at(square)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.board.castling()
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.board.en_passant()
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.board.halfmove_clock()
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.board.fullmove_number()
    }

    /// Fingerprints of every position reached, oldest first.
    pub fn history(&self) -> &[Fingerprint] {
        &self.history
    }

    /// Number of moves applied since this position's history began.
    pub fn ply_count(&self) -> usize {
        self.history.len() - 1
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        generate_legal_moves(&self.board)
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.board.side_to_move())
    }

    /// Plays a legal move and records the resulting position.
    ///
    /// `m` must come from [`legal_moves`](Self::legal_moves) for this exact
    /// position; handing in anything else is a programming error and
    /// panics if the board cannot accommodate it.
    pub fn apply(&mut self, m: Move) {
        debug_assert!(
            self.legal_moves().contains(&m),
            "{m:?} is not legal in {}",
            self.board.to_fen()
        );
        self.board.make_move(m);
        self.history.push(self.board.fingerprint());
    }

    /// How many times the current position has occurred, this one included.
    pub fn repetition_count(&self) -> usize {
        let current = self.board.fingerprint();
        self.history.iter().filter(|fp| **fp == current).count()
    }

    /// True once the current position has occurred three times.
    pub fn is_threefold_claimable(&self) -> bool {
        self.repetition_count() >= THREEFOLD_REPETITION
    }

    /// True once 100 plies have passed without a capture or pawn move.
    pub fn is_fifty_move_claimable(&self) -> bool {
        self.board.halfmove_clock() >= FIFTY_MOVE_PLIES
    }

    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new_game()
    }
}
