//! Standard Algebraic Notation (SAN) parsing, resolution and generation.
//!
//! A SAN token names a move only relative to a position: "Nbd2" is a move
//! exactly when one knight on the b-file can legally reach d2. Resolution
//! therefore parses the token into constraints and filters the legal-move
//! list down to the single move satisfying all of them.
//!
//! Accepted grammar, after stripping one trailing `+` or `#`:
//!
//! ```text
//! castle    := "O-O" | "O-O-O" | "0-0" | "0-0-0"
//! move      := piece? file? rank? "x"? file rank promotion?
//! piece     := "N" | "B" | "R" | "Q" | "K" | "P"
//! promotion := "="? ("N" | "B" | "R" | "Q")      lower case allowed after "="
//! ```

use crate::board::Board;
use crate::mov::{Move, MoveKind};
use crate::movegen::{generate_legal_moves, is_in_check};
use crate::position::Position;
use chess_core::{File, Piece, Rank, Square};
use thiserror::Error;
use tracing::debug;

/// Why a token could not be turned into a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("malformed move token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("no legal move matches '{0}'")]
    NoMatchingMove(String),

    #[error("'{token}' is ambiguous: {candidates} legal moves match")]
    AmbiguousMove { token: String, candidates: usize },

    #[error("'{0}' moves a pawn to the last rank without naming a promotion piece")]
    PromotionRequired(String),

    #[error("'{token}' names '{piece}', which a pawn cannot promote to")]
    InvalidPromotionPiece { token: String, piece: char },
}

/// A syntactically valid token, before it is matched against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanToken {
    Castle {
        kingside: bool,
    },
    Standard {
        piece: Piece,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<Piece>,
    },
}

fn malformed(token: &str, reason: impl Into<String>) -> ResolveError {
    ResolveError::MalformedToken {
        token: token.to_string(),
        reason: reason.into(),
    }
}

/// Parses a token without reference to any position.
pub fn parse_token(token: &str) -> Result<SanToken, ResolveError> {
    let body = token
        .strip_suffix('#')
        .or_else(|| token.strip_suffix('+'))
        .unwrap_or(token);
    if body.is_empty() {
        return Err(malformed(token, "empty"));
    }

    match body {
        "O-O" | "0-0" => return Ok(SanToken::Castle { kingside: true }),
        "O-O-O" | "0-0-0" => return Ok(SanToken::Castle { kingside: false }),
        _ => {}
    }

    let mut chars: Vec<char> = body.chars().collect();

    let piece = match chars[0] {
        c if c.is_ascii_uppercase() => {
            let piece = Piece::from_san_char(c)
                .ok_or_else(|| malformed(token, format!("unknown piece letter '{c}'")))?;
            chars.remove(0);
            piece
        }
        _ => Piece::Pawn,
    };

    let promotion = split_promotion(token, piece, &mut chars)?;

    if chars.len() < 2 {
        return Err(malformed(token, "missing destination square"));
    }
    let rank_char = chars[chars.len() - 1];
    let file_char = chars[chars.len() - 2];
    let to = match (File::from_char(file_char), Rank::from_char(rank_char)) {
        (Some(file), Some(rank)) => Square::new(file, rank),
        _ => {
            return Err(malformed(
                token,
                format!("'{file_char}{rank_char}' is not a square"),
            ))
        }
    };
    chars.truncate(chars.len() - 2);

    let capture = chars.last() == Some(&'x');
    if capture {
        chars.pop();
    }

    let (from_file, from_rank) = match chars.as_slice() {
        [] => (None, None),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => (Some(file), None),
            (_, Some(rank)) => (None, Some(rank)),
            _ => return Err(malformed(token, format!("unexpected '{c}'"))),
        },
        [f, r] => match (File::from_char(*f), Rank::from_char(*r)) {
            (Some(file), Some(rank)) => (Some(file), Some(rank)),
            _ => return Err(malformed(token, format!("unexpected '{f}{r}'"))),
        },
        _ => return Err(malformed(token, "too many characters before the destination")),
    };

    Ok(SanToken::Standard {
        piece,
        from_file,
        from_rank,
        capture,
        to,
        promotion,
    })
}

/// Removes a trailing promotion suffix from `chars` and returns the piece.
fn split_promotion(
    token: &str,
    piece: Piece,
    chars: &mut Vec<char>,
) -> Result<Option<Piece>, ResolveError> {
    let letter = if let Some(eq) = chars.iter().position(|&c| c == '=') {
        if eq + 2 != chars.len() {
            return Err(malformed(token, "'=' must be followed by exactly one letter"));
        }
        let letter = chars[eq + 1];
        chars.truncate(eq);
        letter
    } else {
        // Without '=', only an upper-case letter can follow the square;
        // a lower-case one would read as a file.
        match chars.last() {
            Some(&c) if c.is_ascii_uppercase() && chars.len() > 2 => {
                chars.pop();
                c
            }
            _ => return Ok(None),
        }
    };

    let promoted = Piece::from_san_char(letter.to_ascii_uppercase())
        .ok_or_else(|| malformed(token, format!("unknown promotion letter '{letter}'")))?;
    if !promoted.is_promotion_target() {
        return Err(ResolveError::InvalidPromotionPiece {
            token: token.to_string(),
            piece: letter,
        });
    }
    if piece != Piece::Pawn {
        return Err(malformed(token, "only pawns promote"));
    }
    Ok(Some(promoted))
}

/// Resolves a SAN token to the unique legal move it denotes.
///
/// `legal` must be the legal-move list for `board`. A token matches a move
/// when every constraint it states holds: piece, destination, origin file
/// and rank if given, promotion piece, and capture status. A capture marker
/// demands a capturing move; its absence forbids captures only for pawns,
/// whose pushes and captures are distinct by shape. Exactly one move must
/// remain.
pub fn resolve_token(token: &str, board: &Board, legal: &[Move]) -> Result<Move, ResolveError> {
    let accepts: Box<dyn Fn(&Move) -> bool> = match parse_token(token)? {
        SanToken::Castle { kingside } => {
            let kind = if kingside {
                MoveKind::CastleKingside
            } else {
                MoveKind::CastleQueenside
            };
            Box::new(move |m: &Move| m.kind() == kind)
        }
        SanToken::Standard {
            piece,
            from_file,
            from_rank,
            capture,
            to,
            promotion,
        } => {
            let us = board.side_to_move();
            if piece == Piece::Pawn && to.rank() == us.promotion_rank() && promotion.is_none() {
                return Err(ResolveError::PromotionRequired(token.to_string()));
            }
            let expected = expected_kind(piece, capture, promotion, board.is_occupied(to));
            Box::new(move |m: &Move| {
                m.piece() == piece
                    && m.color() == us
                    && m.to() == to
                    && !m.kind().is_castling()
                    && from_file.map_or(true, |f| m.from().file() == f)
                    && from_rank.map_or(true, |r| m.from().rank() == r)
                    && m.promotion() == promotion
                    && expected.map_or(true, |k| m.kind() == k)
            })
        }
    };

    let mut candidates = legal.iter().filter(|&m| accepts(m));
    match (candidates.next(), candidates.count()) {
        (None, _) => Err(ResolveError::NoMatchingMove(token.to_string())),
        (Some(&m), 0) => Ok(m),
        (Some(_), rest) => Err(ResolveError::AmbiguousMove {
            token: token.to_string(),
            candidates: rest + 1,
        }),
    }
}

/// The only move kind a token can denote, where its shape pins it down.
fn expected_kind(
    piece: Piece,
    capture: bool,
    promotion: Option<Piece>,
    destination_occupied: bool,
) -> Option<MoveKind> {
    match (piece, capture, promotion.is_some()) {
        (Piece::Pawn, true, true) => Some(MoveKind::PromotionCapture),
        (Piece::Pawn, false, true) => Some(MoveKind::Promotion),
        (Piece::Pawn, true, false) if !destination_occupied => Some(MoveKind::EnPassant),
        (_, true, _) => Some(MoveKind::Capture),
        (Piece::Pawn, false, false) => Some(MoveKind::Quiet),
        _ => None,
    }
}

/// Converts a legal move to SAN, including a `+` or `#` suffix.
///
/// `board` must be the state before the move is made. Disambiguation is
/// minimal: nothing when the move is unique, else the origin file if that
/// suffices, else the origin rank, else both.
pub fn move_to_san(board: &Board, m: Move) -> String {
    let mut san = match m.kind() {
        MoveKind::CastleKingside => "O-O".to_string(),
        MoveKind::CastleQueenside => "O-O-O".to_string(),
        _ => {
            let mut san = String::with_capacity(8);
            if m.piece() == Piece::Pawn {
                if m.kind().is_capture() {
                    san.push(m.from().file().to_char());
                }
            } else {
                san.push(m.piece().san_char());
                san.push_str(&disambiguation(board, m));
            }
            if m.kind().is_capture() {
                san.push('x');
            }
            san.push_str(&m.to().to_algebraic());
            if let Some(promotion) = m.promotion() {
                san.push('=');
                san.push(promotion.san_char());
            }
            san
        }
    };

    let mut after = *board;
    after.make_move(m);
    if is_in_check(&after, after.side_to_move()) {
        if generate_legal_moves(&after).is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    san
}

fn disambiguation(board: &Board, m: Move) -> String {
    let from = m.from();
    let rivals: Vec<Square> = generate_legal_moves(board)
        .as_slice()
        .iter()
        .filter(|o| o.piece() == m.piece() && o.to() == m.to() && o.from() != from)
        .map(|o| o.from())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != from.file()) {
        from.file().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
        from.rank().to_string()
    } else {
        from.to_algebraic()
    }
}

/// Where and why a token sequence stopped resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFailure {
    /// Zero-based index of the offending token.
    pub index: usize,
    pub token: String,
    pub error: ResolveError,
}

/// Outcome of resolving a token sequence: the position reached, the moves
/// applied to reach it, and the failure that stopped resolution early.
#[derive(Debug, Clone)]
pub struct SequenceResolution {
    pub position: Position,
    pub moves: Vec<Move>,
    pub failure: Option<SequenceFailure>,
}

impl SequenceResolution {
    /// Index of the first token that failed, if any.
    pub fn failed_at(&self) -> Option<usize> {
        self.failure.as_ref().map(|f| f.index)
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Resolves and applies tokens in order, stopping at the first one that
/// does not resolve. Moves before the failure stay applied.
pub fn resolve_sequence<S: AsRef<str>>(tokens: &[S], start: Position) -> SequenceResolution {
    let mut position = start;
    let mut moves = Vec::with_capacity(tokens.len());

    for (index, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        let legal = position.legal_moves();
        match resolve_token(token, position.board(), legal.as_slice()) {
            Ok(m) => {
                position.apply(m);
                moves.push(m);
            }
            Err(error) => {
                debug!(index, token, %error, "stopped resolving move sequence");
                return SequenceResolution {
                    position,
                    moves,
                    failure: Some(SequenceFailure {
                        index,
                        token: token.to_string(),
                        error,
                    }),
                };
            }
        }
    }

    SequenceResolution {
        position,
        moves,
        failure: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Color;

    fn resolve(fen: &str, token: &str) -> Result<Move, ResolveError> {
        let board = Board::from_fen(fen).unwrap();
        let legal = generate_legal_moves(&board);
        resolve_token(token, &board, legal.as_slice())
    }

    fn san_of(fen: &str, uci: &str) -> String {
        let board = Board::from_fen(fen).unwrap();
        let m = generate_legal_moves(&board)
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.to_uci() == uci)
            .unwrap();
        move_to_san(&board, m)
    }

    const START: &str = crate::fen::STARTPOS;

    #[test]
    fn parse_shapes() {
        assert_eq!(
            parse_token("Nbd2").unwrap(),
            SanToken::Standard {
                piece: Piece::Knight,
                from_file: Some(File::B),
                from_rank: None,
                capture: false,
                to: Square::new(File::D, Rank::R2),
                promotion: None,
            }
        );
        assert_eq!(
            parse_token("exd8=q+").unwrap(),
            SanToken::Standard {
                piece: Piece::Pawn,
                from_file: Some(File::E),
                from_rank: None,
                capture: true,
                to: Square::D8,
                promotion: Some(Piece::Queen),
            }
        );
        assert_eq!(
            parse_token("0-0-0#").unwrap(),
            SanToken::Castle { kingside: false }
        );
        assert!(matches!(
            parse_token("e8Q").unwrap(),
            SanToken::Standard {
                promotion: Some(Piece::Queen),
                ..
            }
        ));
    }

    #[test]
    fn malformed_tokens() {
        for token in [
            "", "+", "Xe4", "e9", "Nf", "Nabc3", "e8=", "e8=QQ", "Ne4=Q", "O-O-O-O", "e4!",
        ] {
            assert!(
                matches!(parse_token(token), Err(ResolveError::MalformedToken { .. })),
                "{token} should be malformed"
            );
        }
    }

    #[test]
    fn king_or_pawn_promotion_is_rejected() {
        assert_eq!(
            parse_token("e8=K"),
            Err(ResolveError::InvalidPromotionPiece {
                token: "e8=K".to_string(),
                piece: 'K'
            })
        );
        assert!(matches!(
            parse_token("e8P"),
            Err(ResolveError::InvalidPromotionPiece { piece: 'P', .. })
        ));
    }

    #[test]
    fn resolves_opening_moves() {
        let m = resolve(START, "e4").unwrap();
        assert_eq!(m.to_uci(), "e2e4");
        let m = resolve(START, "Nf3").unwrap();
        assert_eq!(m.to_uci(), "g1f3");
        assert_eq!(resolve(START, "e5"), Err(ResolveError::NoMatchingMove("e5".into())));
        assert_eq!(resolve(START, "O-O"), Err(ResolveError::NoMatchingMove("O-O".into())));
    }

    #[test]
    fn knight_disambiguation() {
        let fen = "7k/8/8/8/8/8/8/1N1K1N2 w - - 0 1";
        assert_eq!(
            resolve(fen, "Nd2"),
            Err(ResolveError::AmbiguousMove {
                token: "Nd2".into(),
                candidates: 2
            })
        );
        assert_eq!(resolve(fen, "Nbd2").unwrap().from(), Square::B1);
        assert_eq!(resolve(fen, "Nfd2").unwrap().from(), Square::F1);
        assert_eq!(
            resolve(fen, "N1d2"),
            Err(ResolveError::AmbiguousMove {
                token: "N1d2".into(),
                candidates: 2
            })
        );
    }

    #[test]
    fn three_queens_need_full_square() {
        let fen = "8/7k/8/8/8/Q7/8/Q1Q1K3 w - - 0 1";
        assert!(matches!(
            resolve(fen, "Qab2"),
            Err(ResolveError::AmbiguousMove { candidates: 2, .. })
        ));
        assert!(matches!(
            resolve(fen, "Q1b2"),
            Err(ResolveError::AmbiguousMove { candidates: 2, .. })
        ));
        assert_eq!(resolve(fen, "Qa1b2").unwrap().from(), Square::A1);
        assert_eq!(resolve(fen, "Qcb2").unwrap().from(), Square::C1);
        assert_eq!(san_of(fen, "a1b2"), "Qa1b2");
        assert_eq!(san_of(fen, "a3b2"), "Q3b2");
        assert_eq!(san_of(fen, "c1b2"), "Qcb2");
    }

    #[test]
    fn promotion_requires_a_piece() {
        let fen = "8/P7/8/8/8/8/8/4K2k w - - 0 1";
        assert_eq!(
            resolve(fen, "a8"),
            Err(ResolveError::PromotionRequired("a8".into()))
        );
        let m = resolve(fen, "a8=Q").unwrap();
        assert_eq!(m.kind(), MoveKind::Promotion);
        assert_eq!(m.promotion(), Some(Piece::Queen));
        assert_eq!(resolve(fen, "a8N").unwrap().promotion(), Some(Piece::Knight));
        assert_eq!(resolve(fen, "a8=r").unwrap().promotion(), Some(Piece::Rook));
    }

    #[test]
    fn capture_marker_must_match() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(resolve(fen, "exd5").unwrap().kind(), MoveKind::Capture);
        assert!(matches!(resolve(fen, "ed5"), Err(ResolveError::NoMatchingMove(_))));
        assert!(matches!(resolve(fen, "Nxf3"), Err(ResolveError::NoMatchingMove(_))));
        // A piece may omit the marker when it captures.
        let fen = "4k3/8/8/3p4/8/8/8/3RK3 w - - 0 1";
        assert_eq!(resolve(fen, "Rd5").unwrap().kind(), MoveKind::Capture);
        assert_eq!(resolve(fen, "Rxd5").unwrap().kind(), MoveKind::Capture);
        assert!(matches!(resolve(fen, "Rxd4"), Err(ResolveError::NoMatchingMove(_))));
    }

    #[test]
    fn en_passant_by_token() {
        let fen = "rnbqkbnr/ppp2ppp/4p3/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let m = resolve(fen, "exd6").unwrap();
        assert_eq!(m.kind(), MoveKind::EnPassant);
        assert_eq!(san_of(fen, "e5d6"), "exd6");
    }

    #[test]
    fn castling_tokens() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(resolve(fen, "O-O").unwrap().kind(), MoveKind::CastleKingside);
        assert_eq!(resolve(fen, "0-0-0").unwrap().kind(), MoveKind::CastleQueenside);
        // Kg1 is not castling.
        assert!(matches!(resolve(fen, "Kg1"), Err(ResolveError::NoMatchingMove(_))));
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn check_suffixes() {
        assert_eq!(san_of("7k/8/8/8/8/8/8/R3K3 w - - 0 1", "a1a8"), "Ra8+");
        assert_eq!(san_of("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "a1a8"), "Ra8#");
        assert_eq!(san_of(START, "g1f3"), "Nf3");
        assert_eq!(resolve("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "Ra8#").unwrap().to(), Square::A8);
    }

    #[test]
    fn sequence_stops_at_first_bad_token() {
        let tokens = ["e4", "e5", "Nf3", "Nc6", "Bb5", "Ke7", "Qz9", "d4"];
        let resolution = resolve_sequence(&tokens, Position::new_game());
        assert_eq!(resolution.failed_at(), Some(6));
        assert_eq!(resolution.moves.len(), 6);
        assert_eq!(resolution.position.ply_count(), 6);
        assert_eq!(resolution.position.side_to_move(), Color::White);
        let failure = resolution.failure.unwrap();
        assert_eq!(failure.token, "Qz9");
        assert!(matches!(failure.error, ResolveError::MalformedToken { .. }));
    }

    #[test]
    fn full_sequence_resolves() {
        let tokens: Vec<String> = "e4 e5 Bc4 Nc6 Qh5 Nf6 Qxf7#"
            .split_whitespace()
            .map(String::from)
            .collect();
        let resolution = resolve_sequence(tokens.as_slice(), Position::new_game());
        assert!(resolution.is_complete());
        assert_eq!(resolution.moves.len(), 7);
        assert!(resolution.position.legal_moves().is_empty());
    }
}
