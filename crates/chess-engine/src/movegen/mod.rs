//! Move generation.
//!
//! Pseudo-legal moves come from a single pass over the squares in index
//! order (a1 first); each is then played on a scratch board and kept only
//! if the mover's king is not attacked afterwards. Output order is therefore
//! deterministic for a given board.

mod attacks;
mod perft;

pub use attacks::{king_targets, knight_targets, Targets};
pub use perft::{perft, perft_divide};

use crate::board::Board;
use crate::mov::{Move, MoveKind};
use attacks::{BISHOP_DIRECTIONS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS};
use chess_core::{Color, File, Piece, Square};

/// A list of moves with fixed capacity (no heap allocation).
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of legal moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// Retains only moves for which the predicate returns true.
    pub(crate) fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the side to move.
pub fn generate_legal_moves(board: &Board) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(board, &mut moves);

    let us = board.side_to_move();
    let mut scratch = *board;
    moves.retain(|m| {
        let undo = scratch.make_move(*m);
        let safe = !is_in_check(&scratch, us);
        scratch.unmake_move(*m, undo);
        safe
    });

    moves
}

/// Returns true if `color`'s king is attacked.
#[inline]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    is_square_attacked(board, board.king_square(color), color.opposite())
}

/// Returns true if any piece of `by` attacks `square`.
///
/// Occupancy of `square` itself is irrelevant; pawns attack diagonally
/// whether or not anything stands there.
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    let holds = |sq: Square, piece: Piece| board.piece_at(sq) == Some((piece, by));

    // A pawn of `by` attacks forward-diagonally, so look one rank behind.
    for file_delta in [-1, 1] {
        if let Some(origin) = square.offset(file_delta, -by.pawn_direction()) {
            if holds(origin, Piece::Pawn) {
                return true;
            }
        }
    }

    if knight_targets(square).iter().any(|sq| holds(sq, Piece::Knight)) {
        return true;
    }
    if king_targets(square).iter().any(|sq| holds(sq, Piece::King)) {
        return true;
    }

    let slider_hits = |directions: &[(i8, i8)], piece: Piece| {
        directions.iter().any(|&(df, dr)| {
            first_piece_along(board, square, df, dr)
                .is_some_and(|(p, c)| c == by && (p == piece || p == Piece::Queen))
        })
    };
    slider_hits(&ROOK_DIRECTIONS, Piece::Rook) || slider_hits(&BISHOP_DIRECTIONS, Piece::Bishop)
}

fn first_piece_along(board: &Board, from: Square, df: i8, dr: i8) -> Option<(Piece, Color)> {
    let mut current = from;
    while let Some(next) = current.offset(df, dr) {
        if let Some(found) = board.piece_at(next) {
            return Some(found);
        }
        current = next;
    }
    None
}

fn generate_pseudo_legal(board: &Board, moves: &mut MoveList) {
    let us = board.side_to_move();
    for from in Square::all() {
        let Some((piece, color)) = board.piece_at(from) else {
            continue;
        };
        if color != us {
            continue;
        }
        match piece {
            Piece::Pawn => generate_pawn_moves(board, from, moves),
            Piece::Knight => generate_leaper_moves(board, from, piece, knight_targets(from), moves),
            Piece::Bishop => generate_slider_moves(board, from, piece, &BISHOP_DIRECTIONS, moves),
            Piece::Rook => generate_slider_moves(board, from, piece, &ROOK_DIRECTIONS, moves),
            Piece::Queen => generate_slider_moves(board, from, piece, &QUEEN_DIRECTIONS, moves),
            Piece::King => {
                generate_leaper_moves(board, from, piece, king_targets(from), moves);
                generate_castling_moves(board, from, moves);
            }
        }
    }
}

fn push_pawn_move(us: Color, from: Square, to: Square, capture: bool, moves: &mut MoveList) {
    if to.rank() == us.promotion_rank() {
        let kind = if capture {
            MoveKind::PromotionCapture
        } else {
            MoveKind::Promotion
        };
        for promotion in Piece::PROMOTIONS {
            moves.push(Move::new(Piece::Pawn, us, from, to, kind, Some(promotion)));
        }
    } else {
        let kind = if capture {
            MoveKind::Capture
        } else {
            MoveKind::Quiet
        };
        moves.push(Move::new(Piece::Pawn, us, from, to, kind, None));
    }
}

fn generate_pawn_moves(board: &Board, from: Square, moves: &mut MoveList) {
    let us = board.side_to_move();
    let dir = us.pawn_direction();

    if let Some(one) = from.offset(0, dir).filter(|sq| !board.is_occupied(*sq)) {
        push_pawn_move(us, from, one, false, moves);
        if from.rank() == us.pawn_start_rank() {
            if let Some(two) = one.offset(0, dir).filter(|sq| !board.is_occupied(*sq)) {
                moves.push(Move::new(Piece::Pawn, us, from, two, MoveKind::Quiet, None));
            }
        }
    }

    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, dir) else {
            continue;
        };
        match board.piece_at(to) {
            Some((_, color)) if color != us => push_pawn_move(us, from, to, true, moves),
            None if board.en_passant() == Some(to) => {
                let passed = Square::new(to.file(), from.rank());
                if board.piece_at(passed) == Some((Piece::Pawn, us.opposite())) {
                    moves.push(Move::new(Piece::Pawn, us, from, to, MoveKind::EnPassant, None));
                }
            }
            _ => {}
        }
    }
}

fn generate_leaper_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    targets: &Targets,
    moves: &mut MoveList,
) {
    let us = board.side_to_move();
    for to in targets.iter() {
        match board.piece_at(to) {
            None => moves.push(Move::new(piece, us, from, to, MoveKind::Quiet, None)),
            Some((_, color)) if color != us => {
                moves.push(Move::new(piece, us, from, to, MoveKind::Capture, None))
            }
            Some(_) => {}
        }
    }
}

fn generate_slider_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let us = board.side_to_move();
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            match board.piece_at(to) {
                None => {
                    moves.push(Move::new(piece, us, from, to, MoveKind::Quiet, None));
                    current = to;
                }
                Some((_, color)) => {
                    if color != us {
                        moves.push(Move::new(piece, us, from, to, MoveKind::Capture, None));
                    }
                    break;
                }
            }
        }
    }
}

/// Files that must be empty and files the king crosses, per castling side.
struct CastleLane {
    kind: MoveKind,
    rook_file: File,
    empty: &'static [File],
    king_path: &'static [File],
}

const CASTLE_LANES: [CastleLane; 2] = [
    CastleLane {
        kind: MoveKind::CastleKingside,
        rook_file: File::H,
        empty: &[File::F, File::G],
        king_path: &[File::F, File::G],
    },
    CastleLane {
        kind: MoveKind::CastleQueenside,
        rook_file: File::A,
        empty: &[File::B, File::C, File::D],
        king_path: &[File::D, File::C],
    },
];

fn generate_castling_moves(board: &Board, king_from: Square, moves: &mut MoveList) {
    let us = board.side_to_move();
    let them = us.opposite();
    let rank = us.back_rank();
    let home = Square::new(File::E, rank);

    if king_from != home || is_square_attacked(board, home, them) {
        return;
    }

    for lane in &CASTLE_LANES {
        let allowed = match lane.kind {
            MoveKind::CastleKingside => board.castling().can_castle_kingside(us),
            _ => board.castling().can_castle_queenside(us),
        };
        if !allowed {
            continue;
        }
        if board.piece_at(Square::new(lane.rook_file, rank)) != Some((Piece::Rook, us)) {
            continue;
        }
        if lane
            .empty
            .iter()
            .any(|&file| board.is_occupied(Square::new(file, rank)))
        {
            continue;
        }
        if lane
            .king_path
            .iter()
            .any(|&file| is_square_attacked(board, Square::new(file, rank), them))
        {
            continue;
        }
        let Some(&landing) = lane.king_path.last() else {
            continue;
        };
        moves.push(Move::new(
            Piece::King,
            us,
            home,
            Square::new(landing, rank),
            lane.kind,
            None,
        ));
    }
}
