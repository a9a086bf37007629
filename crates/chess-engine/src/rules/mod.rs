//! Game-end evaluation.
//!
//! [`evaluate`] classifies a position as ongoing or finished from the board,
//! its history and the legal-move list. The [`RuleSet`] trait bundles that
//! with generation and move application so callers can stay agnostic of the
//! concrete rules in force.

mod standard;

pub use standard::StandardChess;

use crate::board::Board;
use crate::mov::Move;
use crate::movegen::MoveList;
use crate::position::Position;
use chess_core::{Color, Piece};
use serde::{Deserialize, Serialize};

/// Plies without capture or pawn move after which either side may claim a draw.
pub const FIFTY_MOVE_PLIES: u32 = 100;
/// Plies without capture or pawn move after which the game is drawn outright.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
/// Occurrences of one position that make a draw claimable.
pub const THREEFOLD_REPETITION: usize = 3;
/// Occurrences of one position that draw the game outright.
pub const FIVEFOLD_REPETITION: usize = 5;

/// Classification of a position.
///
/// Terminal variants are mutually exclusive and reported by precedence:
/// checkmate, stalemate, insufficient material, 75-move rule, fivefold
/// repetition. A checkmate's loser is always the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing {
        claimable_fifty: bool,
        claimable_threefold: bool,
    },
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMove,
    FivefoldRepetition,
}

impl Outcome {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing { .. })
    }

    /// True if a player may claim a draw right now.
    pub const fn is_draw_claimable(self) -> bool {
        match self {
            Outcome::Ongoing {
                claimable_fifty,
                claimable_threefold,
            } => claimable_fifty || claimable_threefold,
            _ => false,
        }
    }

    /// The final result of a terminal outcome, given who is to move.
    pub const fn result(self, side_to_move: Color) -> Option<GameResult> {
        match self {
            Outcome::Ongoing { .. } => None,
            Outcome::Checkmate => Some(GameResult::win_for(side_to_move.opposite())),
            Outcome::Stalemate => Some(GameResult::Draw(DrawReason::Stalemate)),
            Outcome::InsufficientMaterial => {
                Some(GameResult::Draw(DrawReason::InsufficientMaterial))
            }
            Outcome::SeventyFiveMove => Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule)),
            Outcome::FivefoldRepetition => Some(GameResult::Draw(DrawReason::FivefoldRepetition)),
        }
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// White wins (checkmate or resignation).
    WhiteWins,
    /// Black wins (checkmate or resignation).
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

impl GameResult {
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// PGN result marker: `1-0`, `0-1` or `1/2-1/2`.
    pub const fn pgn_marker(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// Stalemate - no legal moves but not in check.
    Stalemate,
    /// Insufficient material to checkmate.
    InsufficientMaterial,
    /// 50-move rule (100 half-moves without pawn move or capture) - claimable.
    FiftyMoveRule,
    /// 75-move rule (150 half-moves) - automatic draw.
    SeventyFiveMoveRule,
    /// Threefold repetition - claimable.
    ThreefoldRepetition,
    /// Fivefold repetition - automatic draw.
    FivefoldRepetition,
    /// Draw by agreement.
    Agreement,
}

/// Classifies `position` given its legal moves.
///
/// `legal` must be the output of [`Position::legal_moves`] for this same
/// position; it is passed in so callers that already hold it do not pay for
/// generation twice.
pub fn evaluate(position: &Position, legal: &[Move]) -> Outcome {
    if legal.is_empty() {
        return if position.is_check() {
            Outcome::Checkmate
        } else {
            Outcome::Stalemate
        };
    }
    if is_insufficient_material(position.board()) {
        return Outcome::InsufficientMaterial;
    }
    if position.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
        return Outcome::SeventyFiveMove;
    }
    let repetitions = position.repetition_count();
    if repetitions >= FIVEFOLD_REPETITION {
        return Outcome::FivefoldRepetition;
    }
    Outcome::Ongoing {
        claimable_fifty: position.halfmove_clock() >= FIFTY_MOVE_PLIES,
        claimable_threefold: repetitions >= THREEFOLD_REPETITION,
    }
}

/// Returns true if neither side can possibly deliver mate.
///
/// Covers bare kings, a single minor piece, and any number of bishops all
/// standing on squares of one color. Pawns, rooks, queens, or a knight
/// alongside any other minor piece keep mate possible.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut knights = 0usize;
    let mut light_bishops = 0usize;
    let mut dark_bishops = 0usize;

    for (square, piece, _) in board.pieces() {
        match piece {
            Piece::King => {}
            Piece::Pawn | Piece::Rook | Piece::Queen => return false,
            Piece::Knight => knights += 1,
            Piece::Bishop if square.is_light() => light_bishops += 1,
            Piece::Bishop => dark_bishops += 1,
        }
    }

    let minors = knights + light_bishops + dark_bishops;
    if minors <= 1 {
        return true;
    }
    knights == 0 && (light_bishops == 0 || dark_bishops == 0)
}

/// Trait for the rules a game is played under.
///
/// The engine ships [`StandardChess`]; sessions such as
/// [`Game`](crate::Game) talk to the rules only through this trait.
pub trait RuleSet {
    /// Returns the initial position for these rules.
    fn initial_position(&self) -> Position;

    /// Generates all legal moves for the given position.
    fn legal_moves(&self, position: &Position) -> MoveList;

    /// Returns true if the given move is legal in the position.
    fn is_legal(&self, position: &Position, m: Move) -> bool {
        self.legal_moves(position).contains(&m)
    }

    /// Plays a move previously returned by [`legal_moves`](RuleSet::legal_moves).
    fn apply(&self, position: &mut Position, m: Move);

    /// Classifies the position.
    fn evaluate(&self, position: &Position, legal: &[Move]) -> Outcome;

    /// Returns true if the side to move is in check.
    fn is_check(&self, position: &Position) -> bool;

    /// Returns true if neither side has sufficient material to checkmate.
    fn is_insufficient_material(&self, board: &Board) -> bool;
}
