//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::board::{Board, CastlingRights};
use crate::movegen::is_square_attacked;
use chess_core::{Color, File, Piece, Rank, Square};
use thiserror::Error;

/// The standard starting position FEN.
pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 fields, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("{color} has {count} kings, expected exactly one")]
    InvalidKingCount { color: Color, count: usize },

    #[error("illegal position: {0}")]
    IllegalPosition(String),
}

impl Board {
    /// Parses a FEN string.
    ///
    /// The two clock fields may be omitted, in which case they default to
    /// `0 1`. Placements with a missing or extra king, pawns on a back rank,
    /// or the side not to move standing in check are rejected.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let squares = parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = parse_castling(parts[2])?;
        let en_passant = parse_en_passant(parts[3], side_to_move)?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let halfmove = parts[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            let fullmove = parts[5]
                .parse::<u32>()
                .ok()
                .filter(|&n| n >= 1)
                .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        let kings = find_kings(&squares)?;
        let board = Board::from_parts(
            squares,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            kings,
        );

        let waiting = side_to_move.opposite();
        if is_square_attacked(&board, board.king_square(waiting), side_to_move) {
            return Err(FenError::IllegalPosition(format!(
                "{waiting} is in check but it is {side_to_move} to move"
            )));
        }

        Ok(board)
    }

    /// Serializes the board as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(72);
        for (i, rank) in Rank::ALL.iter().rev().enumerate() {
            if i > 0 {
                placement.push('/');
            }
            let mut empty = 0;
            for file in File::ALL {
                match self.piece_at(Square::new(file, *rank)) {
                    Some((piece, color)) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
        }

        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let en_passant = self
            .en_passant()
            .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());

        format!(
            "{} {} {} {} {} {}",
            placement,
            side,
            self.castling().to_fen(),
            en_passant,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}

fn parse_placement(placement: &str) -> Result<[Option<(Piece, Color)>; 64], FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            rows.len()
        )));
    }

    let mut squares = [None; 64];
    for (row, text) in rows.iter().enumerate() {
        let rank = Rank::ALL[7 - row];
        let mut file = 0u8;
        for c in text.chars() {
            if let Some(run) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += run as u8;
                if file > 8 {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "rank {rank} has more than 8 squares"
                    )));
                }
            } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                let Some(square) = File::from_index(file).map(|f| Square::new(f, rank)) else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "rank {rank} has more than 8 squares"
                    )));
                };
                if piece == Piece::Pawn && (rank == Rank::R1 || rank == Rank::R8) {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "pawn on back rank square {square}"
                    )));
                }
                squares[square.index() as usize] = Some((piece, color));
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{c}'"
                )));
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {rank} has {file} squares, expected 8"
            )));
        }
    }
    Ok(squares)
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut flags = 0u8;
    for c in field.chars() {
        let flag = match c {
            'K' => CastlingRights::WHITE_KINGSIDE,
            'Q' => CastlingRights::WHITE_QUEENSIDE,
            'k' => CastlingRights::BLACK_KINGSIDE,
            'q' => CastlingRights::BLACK_QUEENSIDE,
            _ => {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{c}' in '{field}'"
                )))
            }
        };
        if flags & flag != 0 {
            return Err(FenError::InvalidCastlingRights(format!(
                "repeated '{c}' in '{field}'"
            )));
        }
        flags |= flag;
    }
    if flags == 0 {
        return Err(FenError::InvalidCastlingRights("empty field".to_string()));
    }
    Ok(CastlingRights::new(flags))
}

fn parse_en_passant(field: &str, side_to_move: Color) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let square = Square::from_algebraic(field)
        .ok_or_else(|| FenError::InvalidEnPassantSquare(field.to_string()))?;
    // The target sits behind the pawn that just moved, so on the mover's
    // third rank from the opponent's point of view.
    let expected = match side_to_move {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    };
    if square.rank() != expected {
        return Err(FenError::InvalidEnPassantSquare(field.to_string()));
    }
    Ok(Some(square))
}

fn find_kings(squares: &[Option<(Piece, Color)>; 64]) -> Result<[Square; 2], FenError> {
    let mut kings = [Square::A1; 2];
    for color in Color::BOTH {
        let found: Vec<Square> = Square::all()
            .filter(|sq| squares[sq.index() as usize] == Some((Piece::King, color)))
            .collect();
        if found.len() != 1 {
            return Err(FenError::InvalidKingCount {
                color,
                count: found.len(),
            });
        }
        kings[color.index()] = found[0];
    }
    Ok(kings)
}
