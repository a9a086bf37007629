//! Applying and retracting moves on a [`Board`].
//!
//! `make_move` mutates in place and hands back an [`Undo`] record holding
//! exactly the state the move destroys; `unmake_move` consumes it to restore
//! the board bit for bit. Legality filtering and perft both lean on this pair.

use crate::board::{Board, CastlingRights};
use crate::mov::{Move, MoveKind};
use chess_core::{Color, File, Piece, Square};

/// State a move overwrites and cannot be recomputed from the move itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Undo {
    captured: Option<(Piece, Color, Square)>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// Rook origin and destination for a castling move by `color`.
pub(crate) fn castle_rook_squares(color: Color, kind: MoveKind) -> Option<(Square, Square)> {
    let rank = color.back_rank();
    match kind {
        MoveKind::CastleKingside => Some((Square::new(File::H, rank), Square::new(File::F, rank))),
        MoveKind::CastleQueenside => Some((Square::new(File::A, rank), Square::new(File::D, rank))),
        _ => None,
    }
}

impl Board {
    /// Plays `m`, which must have been generated for this board.
    ///
    /// # Panics
    ///
    /// Panics if the move would capture a king or the moving piece is not on
    /// its origin square. Either means the board invariants were broken
    /// somewhere upstream.
    pub(crate) fn make_move(&mut self, m: Move) -> Undo {
        let us = self.side_to_move();
        assert_eq!(
            self.piece_at(m.from()),
            Some((m.piece(), us)),
            "{m:?} does not match the board"
        );

        let previous_castling = self.castling();
        let previous_en_passant = self.en_passant();
        let previous_halfmove = self.halfmove_clock();
        let previous_fullmove = self.fullmove_number();

        let captured = m.capture_square().map(|square| {
            let (piece, color) = self
                .take(square)
                .unwrap_or_else(|| panic!("{m:?} captures on empty {square}"));
            assert!(piece != Piece::King, "{m:?} captures a king");
            (piece, color, square)
        });

        self.take(m.from());
        self.put(m.to(), m.promotion().unwrap_or(m.piece()), us);

        if let Some((rook_from, rook_to)) = castle_rook_squares(us, m.kind()) {
            self.take(rook_from);
            self.put(rook_to, Piece::Rook, us);
        }

        let rights = self.castling_mut();
        if m.piece() == Piece::King {
            rights.remove_color(us);
        }
        rights.remove_for_rook_square(m.from());
        rights.remove_for_rook_square(m.to());

        let en_passant = if m.is_double_push() {
            m.from().offset(0, us.pawn_direction())
        } else {
            None
        };
        self.set_en_passant(en_passant);

        let halfmove = if m.piece() == Piece::Pawn || captured.is_some() {
            0
        } else {
            previous_halfmove + 1
        };
        let fullmove = match us {
            Color::White => previous_fullmove,
            Color::Black => previous_fullmove + 1,
        };
        self.set_clocks(halfmove, fullmove);
        self.set_side_to_move(us.opposite());

        Undo {
            captured,
            castling: previous_castling,
            en_passant: previous_en_passant,
            halfmove_clock: previous_halfmove,
            fullmove_number: previous_fullmove,
        }
    }

    /// Retracts `m`, which must be the last move made with `make_move`.
    pub(crate) fn unmake_move(&mut self, m: Move, undo: Undo) {
        let us = m.color();

        if let Some((rook_from, rook_to)) = castle_rook_squares(us, m.kind()) {
            self.take(rook_to);
            self.put(rook_from, Piece::Rook, us);
        }

        self.take(m.to());
        self.put(m.from(), m.piece(), us);

        if let Some((piece, color, square)) = undo.captured {
            self.put(square, piece, color);
        }

        self.set_castling(undo.castling);
        self.set_en_passant(undo.en_passant);
        self.set_clocks(undo.halfmove_clock, undo.fullmove_number);
        self.set_side_to_move(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::generate_legal_moves;

    fn find(board: &Board, uci: &str) -> Move {
        generate_legal_moves(board)
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.to_uci() == uci)
            .unwrap_or_else(|| panic!("{uci} is not legal in {board:?}"))
    }

    fn make_and_unmake(fen: &str, uci: &str) -> Board {
        let mut board = Board::from_fen(fen).unwrap();
        let before = board;
        let m = find(&board, uci);
        let undo = board.make_move(m);
        let after = board;
        board.unmake_move(m, undo);
        assert_eq!(board, before, "unmake of {uci} did not restore {fen}");
        after
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let after = make_and_unmake(crate::fen::STARTPOS, "e2e4");
        assert_eq!(after.en_passant(), Square::from_algebraic("e3"));
        assert_eq!(after.halfmove_clock(), 0);
        assert_eq!(after.fullmove_number(), 1);
        assert_eq!(after.side_to_move(), Color::Black);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let after = make_and_unmake(fen, "e5f6");
        let f5 = Square::from_algebraic("f5").unwrap();
        let f6 = Square::from_algebraic("f6").unwrap();
        assert_eq!(after.piece_at(f5), None);
        assert_eq!(after.piece_at(f6), Some((Piece::Pawn, Color::White)));
        assert_eq!(after.en_passant(), None);
    }

    #[test]
    fn castling_moves_both_pieces_and_clears_rights() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10";
        let after = make_and_unmake(fen, "e1g1");
        assert_eq!(after.piece_at(Square::G1), Some((Piece::King, Color::White)));
        assert_eq!(after.piece_at(Square::F1), Some((Piece::Rook, Color::White)));
        assert_eq!(after.piece_at(Square::H1), None);
        assert_eq!(after.king_square(Color::White), Square::G1);
        assert_eq!(after.castling().to_fen(), "kq");
        assert_eq!(after.halfmove_clock(), 4);

        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 3 10";
        let after = make_and_unmake(fen, "e8c8");
        assert_eq!(after.piece_at(Square::D8), Some((Piece::Rook, Color::Black)));
        assert_eq!(after.piece_at(Square::A8), None);
        assert_eq!(after.castling().to_fen(), "KQ");
        assert_eq!(after.fullmove_number(), 11);
    }

    #[test]
    fn capturing_a_rook_revokes_its_right() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let after = make_and_unmake(fen, "a1a8");
        assert_eq!(after.castling().to_fen(), "Kk");
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        let fen = "1n5k/P7/8/8/8/8/8/K7 w - - 5 40";
        let after = make_and_unmake(fen, "a7b8n");
        let b8 = Square::B8;
        assert_eq!(after.piece_at(b8), Some((Piece::Knight, Color::White)));
        assert_eq!(after.halfmove_clock(), 0);
    }
}
